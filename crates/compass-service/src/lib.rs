//! Compass Service
//!
//! Startup loading and the enrichment entry point.
//!
//! Configuration names the control catalogs to load and, per policy engine,
//! a directory of evaluation plans. Loading builds an immutable [`Scope`]
//! and [`MapperSet`](compass_mapper::MapperSet) which a [`Service`] then
//! shares across concurrent enrichment requests.

pub mod config;
pub mod loader;
pub mod service;

pub use config::{CompassConfig, PluginConfig, DEFAULT_CONFIG_PATH};
pub use loader::{load_plans, mapper_from_dir, mapper_set_from_config, scope_from_catalog_paths};
pub use service::{enrich, Service};

pub use compass_mapper::Scope;
