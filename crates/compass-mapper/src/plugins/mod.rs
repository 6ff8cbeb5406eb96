//! Built-in mapper plugins

pub mod basic;
