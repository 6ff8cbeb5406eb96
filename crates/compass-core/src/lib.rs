//! Compass Core
//!
//! Core types shared across Compass components.
//!
//! This crate provides:
//! - Evidence and compliance types exchanged with the enrichment service
//! - Layer 2 control catalogs and Layer 4 assessment plans (`gemara` model)
//! - Telemetry attribute keys for log record enrichment
//! - Error types and result handling

pub mod attributes;
pub mod catalog;
pub mod error;
pub mod plan;
pub mod types;

pub use catalog::{Catalog, CatalogMetadata, Control, ControlFamily, GuidelineMapping, MappingEntry};
pub use error::{Error, Result};
pub use plan::{Assessment, AssessmentPlan, AssessmentProcedure, EntryReference, EvaluationPlan};
pub use types::{
    Compliance, ComplianceStatus, ControlContext, EnrichmentRequest, EnrichmentResponse,
    EnrichmentStatus, EvaluationStatus, Evidence, Frameworks, Subject,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{Catalog, Control, ControlFamily};
    pub use crate::error::{Error, Result};
    pub use crate::plan::{AssessmentPlan, EvaluationPlan};
    pub use crate::types::{
        Compliance, ComplianceStatus, EnrichmentResponse, EnrichmentStatus, EvaluationStatus,
        Evidence,
    };
}
