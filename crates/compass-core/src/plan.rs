//! Layer 4 evaluation plans
//!
//! An evaluation plan document lists assessment plans. Each assessment plan
//! points at a control in a catalog and describes the requirements assessed
//! for it, together with the procedures (policy rules) that perform the
//! assessment.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// An evaluation plan document as written on disk
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PlanMetadata>,

    #[serde(default)]
    pub plans: Vec<AssessmentPlan>,
}

impl EvaluationPlan {
    /// Load an evaluation plan from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load an evaluation plan from a file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            crate::Error::plan(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Plan document metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Reference to an entry (control or requirement) in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntryReference {
    /// Catalog the entry belongs to
    #[serde(default)]
    pub reference_id: String,

    /// Identifier of the entry inside the catalog
    #[serde(default)]
    pub entry_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl EntryReference {
    pub fn new(reference_id: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            entry_id: entry_id.into(),
            remarks: None,
        }
    }
}

/// Assessment plan for a single control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentPlan {
    /// The assessed control; `reference-id` names its catalog
    pub control: EntryReference,

    #[serde(default)]
    pub assessments: Vec<Assessment>,
}

impl AssessmentPlan {
    pub fn new(catalog_id: impl Into<String>, control_id: impl Into<String>) -> Self {
        Self {
            control: EntryReference::new(catalog_id, control_id),
            assessments: Vec::new(),
        }
    }

    pub fn with_assessment(mut self, assessment: Assessment) -> Self {
        self.assessments.push(assessment);
        self
    }

    /// Catalog this plan's control belongs to
    pub fn catalog_id(&self) -> &str {
        &self.control.reference_id
    }

    /// Identifier of the assessed control
    pub fn control_id(&self) -> &str {
        &self.control.entry_id
    }

    /// Iterate every procedure with the assessment that owns it
    pub fn procedures(&self) -> impl Iterator<Item = (&Assessment, &AssessmentProcedure)> {
        self.assessments.iter().flat_map(|assessment| {
            assessment
                .procedures
                .iter()
                .map(move |procedure| (assessment, procedure))
        })
    }
}

/// Assessment of one requirement of a control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assessment {
    pub requirement: EntryReference,

    #[serde(default)]
    pub procedures: Vec<AssessmentProcedure>,
}

impl Assessment {
    pub fn new(requirement: EntryReference) -> Self {
        Self {
            requirement,
            procedures: Vec::new(),
        }
    }

    pub fn with_procedure(mut self, procedure: AssessmentProcedure) -> Self {
        self.procedures.push(procedure);
        self
    }

    /// Identifier of the assessed requirement
    pub fn requirement_id(&self) -> &str {
        &self.requirement.entry_id
    }
}

/// A procedure performing an assessment; its ID matches a policy rule ID
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentProcedure {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Remediation guidance surfaced with findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl AssessmentProcedure {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}
