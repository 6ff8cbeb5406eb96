//! Error types for Compass

/// Result type alias using Compass's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Compass operations
///
/// Resolution misses are not errors; only startup and boundary failures
/// are represented here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Control catalog loading errors
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Evaluation plan loading errors
    #[error("evaluation plan error: {0}")]
    Plan(String),

    /// Required telemetry attributes absent from a record
    #[error("missing required attributes: {}", .0.join(", "))]
    MissingAttributes(Vec<&'static str>),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML document errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a new evaluation plan error
    pub fn plan(msg: impl Into<String>) -> Self {
        Self::Plan(msg.into())
    }
}
