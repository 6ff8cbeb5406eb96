//! Compass command-line front end

pub mod cli;
pub mod commands;
