//! Compass Telemetry
//!
//! Counters describing enrichment outcomes.
//!
//! Provides:
//! - Lock-free enrichment counters shared across request handlers
//! - Point-in-time snapshots with derived rates
//! - Emission through the `metrics` facade for whichever recorder is installed

pub mod metrics;

pub use crate::metrics::{describe_metrics, EnrichmentMetrics, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{EnrichmentMetrics, MetricsSnapshot};
}
