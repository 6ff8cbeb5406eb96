//! Compass Mapper
//!
//! Resolution of raw policy evidence into compliance findings.
//!
//! A mapper owns the assessment plans written for one policy engine and
//! resolves evidence in two phases against the loaded control catalogs:
//! - the evidence's policy rule ID is looked up among plan procedures
//! - the procedure's control is looked up in the catalog named by the plan
//!
//! Mappers are registered in a [`MapperSet`] keyed by [`MapperId`], which
//! always carries a fallback mapper for unknown policy engines.

pub mod factory;
pub mod index;
pub mod mapper;
pub mod plugins;
pub mod scope;
pub mod status;

pub use factory::mapper_by_id;
pub use index::{ControlEntry, ControlIndex, ProcedureEntry, ProcedureIndex};
pub use mapper::{Mapper, MapperId, MapperSelection, MapperSet, PlanStore};
pub use plugins::basic::{BasicMapper, Resolution, ResolutionMiss};
pub use scope::Scope;
pub use status::{normalize, normalize_decision};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::mapper::{Mapper, MapperId, MapperSet};
    pub use crate::plugins::basic::BasicMapper;
    pub use crate::scope::Scope;
}
