//! Evidence and compliance types for Compass

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Control and catalog identifier reported when no mapping was found
pub const UNMAPPED: &str = "UNMAPPED";

/// Category reported when no mapping was found
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

/// Result of a policy evaluation as reported by a policy engine
///
/// The free-text decision emitted by engines is parsed into this closed set
/// when evidence is deserialized. Parsing never fails: any value outside the
/// table becomes [`EvaluationStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvaluationStatus {
    Passed,
    Failed,
    NotRun,
    NotApplicable,
    #[default]
    Unknown,
}

/// Accepted decision spellings, matched ignoring ASCII case
const DECISION_TABLE: &[(&str, EvaluationStatus)] = &[
    ("passed", EvaluationStatus::Passed),
    ("success", EvaluationStatus::Passed),
    ("failed", EvaluationStatus::Failed),
    ("failure", EvaluationStatus::Failed),
    ("not-run", EvaluationStatus::NotRun),
    ("not-applicable", EvaluationStatus::NotApplicable),
];

impl EvaluationStatus {
    /// Parse a decision string reported by a policy engine
    pub fn parse(decision: &str) -> Self {
        DECISION_TABLE
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(decision))
            .map(|(_, status)| *status)
            .unwrap_or(Self::Unknown)
    }

    /// Canonical wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NotRun => "not-run",
            Self::NotApplicable => "not-applicable",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for EvaluationStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EvaluationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EvaluationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Normalized compliance verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    #[serde(alias = "NONCOMPLIANT")]
    NonCompliant,
    NotApplicable,
    #[default]
    Unknown,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::NotApplicable => "NOT_APPLICABLE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the enrichment process itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    /// Evidence resolved to a control in a loaded catalog
    Success,
    /// No loaded plan or catalog matched the evidence
    Unmapped,
    /// The record lacked the attributes needed to attempt enrichment
    Skipped,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unmapped => "unmapped",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource or entity a policy was evaluated against
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Raw policy evaluation evidence emitted by a policy engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Evidence identifier assigned by the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the policy engine that produced the evidence
    #[serde(alias = "source")]
    pub policy_engine_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_engine_version: Option<String>,

    /// Identifier of the evaluated policy rule; matched against procedure IDs
    pub policy_rule_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_rule_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_rule_uri: Option<String>,

    /// Decision reported by the engine
    #[serde(alias = "decision", alias = "evaluationStatus")]
    pub policy_evaluation_status: EvaluationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_evaluation_message: Option<String>,

    /// When the evaluation happened (RFC3339)
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Free-form engine specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Evidence {
    /// Create evidence for a rule evaluation happening now
    pub fn new(
        policy_engine_name: impl Into<String>,
        policy_rule_id: impl Into<String>,
        status: EvaluationStatus,
    ) -> Self {
        Self {
            id: None,
            policy_engine_name: policy_engine_name.into(),
            policy_engine_version: None,
            policy_rule_id: policy_rule_id.into(),
            policy_rule_name: None,
            policy_rule_uri: None,
            policy_evaluation_status: status,
            policy_evaluation_message: None,
            timestamp: Utc::now(),
            subject: None,
            details: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.policy_evaluation_message = Some(message.into());
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Parse a single evidence record from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Control context resolved for a piece of evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlContext {
    /// Assessment requirement identifier (not the raw control ID)
    pub id: String,

    /// Catalog the control was found in
    pub catalog_id: String,

    /// Title of the control family owning the control
    pub category: String,

    /// Remediation guidance from the matching procedure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_description: Option<String>,
}

/// Frameworks and requirements impacted by a control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frameworks {
    /// Requirement identifiers from every guideline mapping entry
    #[serde(default)]
    pub requirements: Vec<String>,

    /// Standards referenced by the control's guideline mappings
    #[serde(default)]
    pub frameworks: Vec<String>,
}

/// Compliance finding produced for one piece of evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compliance {
    pub status: ComplianceStatus,
    pub control: ControlContext,
    pub frameworks: Frameworks,
    pub enrichment_status: EnrichmentStatus,
}

impl Compliance {
    /// Sentinel returned when evidence could not be mapped to any control
    pub fn unmapped() -> Self {
        Self {
            status: ComplianceStatus::Unknown,
            control: ControlContext {
                id: UNMAPPED.to_string(),
                catalog_id: UNMAPPED.to_string(),
                category: UNCATEGORIZED.to_string(),
                remediation_description: None,
            },
            frameworks: Frameworks::default(),
            enrichment_status: EnrichmentStatus::Unmapped,
        }
    }

    /// Whether enrichment found a control for the evidence
    pub fn is_mapped(&self) -> bool {
        self.enrichment_status == EnrichmentStatus::Success
    }
}

/// Request body for evidence enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub evidence: Evidence,
}

/// Response body for evidence enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResponse {
    pub compliance: Compliance,
}
