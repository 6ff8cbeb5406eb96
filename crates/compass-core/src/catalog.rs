//! Layer 2 control catalogs
//!
//! A catalog groups controls into families. Each control carries guideline
//! mappings naming the external frameworks (e.g. NIST-800-53) and the
//! requirement entries within them that the control satisfies.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A control catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    /// Catalog metadata; `metadata.id` keys the catalog in a scope
    pub metadata: CatalogMetadata,

    /// Control families in declaration order
    #[serde(default)]
    pub control_families: Vec<ControlFamily>,
}

impl Catalog {
    /// Create an empty catalog with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            metadata: CatalogMetadata {
                id: id.into(),
                ..Default::default()
            },
            control_families: Vec::new(),
        }
    }

    /// Add a control family
    pub fn with_family(mut self, family: ControlFamily) -> Self {
        self.control_families.push(family);
        self
    }

    /// Catalog identifier
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Iterate every control together with the family that owns it
    pub fn controls(&self) -> impl Iterator<Item = (&ControlFamily, &Control)> {
        self.control_families
            .iter()
            .flat_map(|family| family.controls.iter().map(move |control| (family, control)))
    }

    /// Load a catalog from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a catalog from a file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            crate::Error::catalog(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Catalog metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A family of related controls; its title is reported as the category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlFamily {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub controls: Vec<Control>,
}

impl ControlFamily {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }
}

/// A single control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Control {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,

    /// Framework mappings for this control
    #[serde(default)]
    pub guideline_mappings: Vec<GuidelineMapping>,
}

impl Control {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_mapping(mut self, mapping: GuidelineMapping) -> Self {
        self.guideline_mappings.push(mapping);
        self
    }
}

/// Mapping from a control to an external framework or standard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GuidelineMapping {
    /// Framework or standard name
    pub reference_id: String,

    #[serde(default)]
    pub entries: Vec<MappingEntry>,
}

impl GuidelineMapping {
    /// Build a mapping to `framework` covering the given requirement IDs
    pub fn new<I, S>(framework: impl Into<String>, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reference_id: framework.into(),
            entries: requirements.into_iter().map(MappingEntry::new).collect(),
        }
    }
}

/// One requirement entry inside a framework mapping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MappingEntry {
    /// Requirement identifier within the framework
    pub reference_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl MappingEntry {
    pub fn new(reference_id: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            ..Default::default()
        }
    }
}
