//! Service configuration

use compass_core::{Error, Result};
use compass_mapper::MapperId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file read when none is given explicitly
pub const DEFAULT_CONFIG_PATH: &str = "compass.yaml";

/// Compass configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompassConfig {
    /// Control catalog files to load into scope
    #[serde(default)]
    pub catalogs: Vec<PathBuf>,

    /// Mapper plugins and their plan directories
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

/// One mapper plugin entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    /// Policy engine name the mapper is registered under
    pub id: MapperId,

    /// Directory holding the engine's evaluation plans; empty disables the entry
    #[serde(default)]
    pub evaluations_dir: PathBuf,
}

impl CompassConfig {
    /// Load configuration from file and CLI overrides
    ///
    /// An explicitly given path must exist. Without one, [`DEFAULT_CONFIG_PATH`]
    /// is read if present and defaults are used otherwise. Non-empty
    /// `catalog_overrides` replace the configured catalog list.
    pub fn load(path: Option<&Path>, catalog_overrides: &[PathBuf]) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        if !catalog_overrides.is_empty() {
            config.catalogs = catalog_overrides.to_vec();
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
