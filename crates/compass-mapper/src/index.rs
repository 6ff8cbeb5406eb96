//! Lookup indexes built per resolution
//!
//! Both indexes borrow from the immutable plan store and catalog, so
//! building them allocates only the hash tables. Duplicate keys keep the
//! last occurrence.

use compass_core::{AssessmentPlan, Catalog, GuidelineMapping};
use std::collections::HashMap;

/// What a procedure ID resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureEntry<'a> {
    /// Control assessed by the owning plan
    pub control_id: &'a str,

    /// Requirement assessed by the owning assessment
    pub requirement_id: &'a str,

    /// Procedure documentation, if any
    pub documentation: Option<&'a str>,
}

/// Procedure ID to control and requirement
#[derive(Debug, Default)]
pub struct ProcedureIndex<'a> {
    entries: HashMap<&'a str, ProcedureEntry<'a>>,
}

impl<'a> ProcedureIndex<'a> {
    /// Flatten every procedure of the given plans
    pub fn build(plans: &'a [AssessmentPlan]) -> Self {
        let mut entries = HashMap::new();

        for plan in plans {
            for (assessment, procedure) in plan.procedures() {
                entries.insert(
                    procedure.id.as_str(),
                    ProcedureEntry {
                        control_id: plan.control_id(),
                        requirement_id: assessment.requirement_id(),
                        documentation: procedure.documentation.as_deref(),
                    },
                );
            }
        }

        Self { entries }
    }

    pub fn get(&self, procedure_id: &str) -> Option<&ProcedureEntry<'a>> {
        self.entries.get(procedure_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a control ID resolves to inside a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEntry<'a> {
    pub mappings: &'a [GuidelineMapping],

    /// Title of the owning control family
    pub category: &'a str,
}

impl ControlEntry<'_> {
    /// Standard names referenced by the control's mappings
    pub fn frameworks(&self) -> Vec<String> {
        self.mappings
            .iter()
            .map(|mapping| mapping.reference_id.clone())
            .collect()
    }

    /// Requirement IDs across every mapping entry
    pub fn requirements(&self) -> Vec<String> {
        self.mappings
            .iter()
            .flat_map(|mapping| mapping.entries.iter())
            .map(|entry| entry.reference_id.clone())
            .collect()
    }
}

/// Control ID to mappings and family title
#[derive(Debug, Default)]
pub struct ControlIndex<'a> {
    entries: HashMap<&'a str, ControlEntry<'a>>,
}

impl<'a> ControlIndex<'a> {
    /// Flatten every control of a catalog
    pub fn build(catalog: &'a Catalog) -> Self {
        let entries = catalog
            .controls()
            .map(|(family, control)| {
                (
                    control.id.as_str(),
                    ControlEntry {
                        mappings: &control.guideline_mappings,
                        category: &family.title,
                    },
                )
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, control_id: &str) -> Option<&ControlEntry<'a>> {
        self.entries.get(control_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
