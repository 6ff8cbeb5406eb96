//! Telemetry attribute contract
//!
//! Log pipelines carry evidence as flat attributes on a log record and expect
//! the compliance finding back under the `compliance.*` namespace.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::types::{Compliance, EnrichmentStatus, EvaluationStatus, Evidence};
use crate::{Error, Result};

/// Unique identifier for the policy rule being evaluated or enforced
pub const POLICY_RULE_ID: &str = "policy.rule.id";
/// Human-readable name of the policy rule
pub const POLICY_RULE_NAME: &str = "policy.rule.name";
/// Source control URL and version of the policy-as-code file
pub const POLICY_RULE_URI: &str = "policy.rule.uri";
/// Name of the policy engine that performed the evaluation
pub const POLICY_ENGINE_NAME: &str = "policy.engine.name";
pub const POLICY_ENGINE_VERSION: &str = "policy.engine.version";
/// Result of the policy evaluation
pub const POLICY_EVALUATION_RESULT: &str = "policy.evaluation.result";
/// Additional context about the policy evaluation result
pub const POLICY_EVALUATION_MESSAGE: &str = "policy.evaluation.message";
pub const POLICY_TARGET_ID: &str = "policy.target.id";
pub const POLICY_TARGET_NAME: &str = "policy.target.name";
pub const POLICY_TARGET_TYPE: &str = "policy.target.type";
pub const POLICY_TARGET_ENVIRONMENT: &str = "policy.target.environment";

/// Compliance verdict
pub const COMPLIANCE_STATUS: &str = "compliance.status";
/// Requirement identifier of the assessed control
pub const COMPLIANCE_CONTROL_ID: &str = "compliance.control.id";
pub const COMPLIANCE_CONTROL_CATALOG_ID: &str = "compliance.control.catalog.id";
/// Family the control belongs to
pub const COMPLIANCE_CONTROL_CATEGORY: &str = "compliance.control.category";
pub const COMPLIANCE_REMEDIATION_DESCRIPTION: &str = "compliance.remediation.description";
/// Requirement identifiers from the impacted frameworks
pub const COMPLIANCE_REQUIREMENTS: &str = "compliance.requirements";
/// Regulatory or industry standards impacted
pub const COMPLIANCE_FRAMEWORKS: &str = "compliance.frameworks";
/// Outcome of the enrichment itself: success, unmapped or skipped
pub const COMPLIANCE_ENRICHMENT_STATUS: &str = "compliance.enrichment.status";

/// Value attached to a log record attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Str(String),
    StrList(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::StrList(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

/// Build evidence from the flat attributes of a log record
///
/// `policy.rule.id`, `policy.engine.name` and `policy.evaluation.result` are
/// required; the error lists every one that is absent.
pub fn evidence_from_attributes(
    attrs: &HashMap<String, String>,
    timestamp: DateTime<Utc>,
) -> Result<Evidence> {
    let missing: Vec<&'static str> = [POLICY_RULE_ID, POLICY_ENGINE_NAME, POLICY_EVALUATION_RESULT]
        .into_iter()
        .filter(|key| !attrs.contains_key(*key))
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingAttributes(missing));
    }

    let get = |key: &str| attrs.get(key).cloned();
    let status = EvaluationStatus::parse(&attrs[POLICY_EVALUATION_RESULT]);

    let mut evidence = Evidence::new(
        attrs[POLICY_ENGINE_NAME].clone(),
        attrs[POLICY_RULE_ID].clone(),
        status,
    )
    .with_timestamp(timestamp);

    evidence.policy_engine_version = get(POLICY_ENGINE_VERSION);
    evidence.policy_rule_name = get(POLICY_RULE_NAME);
    evidence.policy_rule_uri = get(POLICY_RULE_URI);
    if let Some(message) = get(POLICY_EVALUATION_MESSAGE) {
        evidence = evidence.with_message(message);
    }

    let subject = crate::types::Subject {
        id: get(POLICY_TARGET_ID),
        name: get(POLICY_TARGET_NAME),
        kind: get(POLICY_TARGET_TYPE),
        environment: get(POLICY_TARGET_ENVIRONMENT),
    };
    if subject != crate::types::Subject::default() {
        evidence = evidence.with_subject(subject);
    }

    Ok(evidence)
}

/// Attributes to attach to a log record for a compliance finding
///
/// The enrichment status is always present. The remaining compliance
/// attributes are only emitted for successful enrichment.
pub fn compliance_attributes(compliance: &Compliance) -> Vec<(&'static str, AttributeValue)> {
    let mut attrs = vec![(
        COMPLIANCE_ENRICHMENT_STATUS,
        AttributeValue::from(compliance.enrichment_status.as_str()),
    )];

    if compliance.enrichment_status != EnrichmentStatus::Success {
        return attrs;
    }

    attrs.push((COMPLIANCE_STATUS, compliance.status.as_str().into()));
    attrs.push((COMPLIANCE_CONTROL_ID, compliance.control.id.clone().into()));
    attrs.push((
        COMPLIANCE_CONTROL_CATALOG_ID,
        compliance.control.catalog_id.clone().into(),
    ));
    attrs.push((
        COMPLIANCE_CONTROL_CATEGORY,
        compliance.control.category.clone().into(),
    ));
    attrs.push((
        COMPLIANCE_REQUIREMENTS,
        compliance.frameworks.requirements.clone().into(),
    ));
    attrs.push((
        COMPLIANCE_FRAMEWORKS,
        compliance.frameworks.frameworks.clone().into(),
    ));

    if let Some(ref remediation) = compliance.control.remediation_description {
        attrs.push((COMPLIANCE_REMEDIATION_DESCRIPTION, remediation.clone().into()));
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComplianceStatus, ControlContext, Frameworks};

    fn record(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_evidence_from_complete_attributes() {
        let attrs = record(&[
            (POLICY_RULE_ID, "deny-privileged"),
            (POLICY_ENGINE_NAME, "kyverno"),
            (POLICY_EVALUATION_RESULT, "Failed"),
            (POLICY_TARGET_NAME, "web-1"),
        ]);

        let evidence = evidence_from_attributes(&attrs, Utc::now()).unwrap();
        assert_eq!(evidence.policy_rule_id, "deny-privileged");
        assert_eq!(evidence.policy_engine_name, "kyverno");
        assert_eq!(evidence.policy_evaluation_status, EvaluationStatus::Failed);
        assert_eq!(
            evidence.subject.and_then(|s| s.name).as_deref(),
            Some("web-1")
        );
    }

    #[test]
    fn test_optional_attributes_fill_message_and_subject() {
        let attrs = record(&[
            (POLICY_RULE_ID, "require-labels"),
            (POLICY_ENGINE_NAME, "kyverno"),
            (POLICY_EVALUATION_RESULT, "Passed"),
            (POLICY_EVALUATION_MESSAGE, "all labels present"),
            (POLICY_TARGET_ID, "pod/web-1"),
            (POLICY_TARGET_TYPE, "Pod"),
            (POLICY_TARGET_ENVIRONMENT, "prod"),
        ]);

        let evidence = evidence_from_attributes(&attrs, Utc::now()).unwrap();
        assert_eq!(
            evidence.policy_evaluation_message.as_deref(),
            Some("all labels present")
        );
        let subject = evidence.subject.unwrap();
        assert_eq!(subject.id.as_deref(), Some("pod/web-1"));
        assert_eq!(subject.kind.as_deref(), Some("Pod"));
        assert_eq!(subject.environment.as_deref(), Some("prod"));
        assert_eq!(subject.name, None);
    }

    #[test]
    fn test_subject_absent_without_target_attributes() {
        let attrs = record(&[
            (POLICY_RULE_ID, "r1"),
            (POLICY_ENGINE_NAME, "opa"),
            (POLICY_EVALUATION_RESULT, "Failed"),
        ]);

        let evidence = evidence_from_attributes(&attrs, Utc::now()).unwrap();
        assert!(evidence.subject.is_none());
        assert!(evidence.policy_evaluation_message.is_none());
    }

    #[test]
    fn test_missing_attributes_are_all_reported() {
        let attrs = record(&[(POLICY_ENGINE_NAME, "opa")]);

        match evidence_from_attributes(&attrs, Utc::now()) {
            Err(Error::MissingAttributes(missing)) => {
                assert_eq!(missing, vec![POLICY_RULE_ID, POLICY_EVALUATION_RESULT]);
            }
            other => panic!("expected missing attributes, got {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_compliance_only_sets_status() {
        let attrs = compliance_attributes(&Compliance::unmapped());
        assert_eq!(
            attrs,
            vec![(COMPLIANCE_ENRICHMENT_STATUS, AttributeValue::from("unmapped"))]
        );
    }

    #[test]
    fn test_mapped_compliance_attributes() {
        let compliance = Compliance {
            status: ComplianceStatus::Compliant,
            control: ControlContext {
                id: "AC-1-REQ".to_string(),
                catalog_id: "cat-1".to_string(),
                category: "Access Control".to_string(),
                remediation_description: Some("Rotate keys".to_string()),
            },
            frameworks: Frameworks {
                requirements: vec!["AC-1".to_string()],
                frameworks: vec!["NIST-800-53".to_string()],
            },
            enrichment_status: EnrichmentStatus::Success,
        };

        let attrs: HashMap<&str, AttributeValue> =
            compliance_attributes(&compliance).into_iter().collect();

        assert_eq!(attrs[COMPLIANCE_STATUS].as_str(), Some("COMPLIANT"));
        assert_eq!(attrs[COMPLIANCE_CONTROL_ID].as_str(), Some("AC-1-REQ"));
        assert_eq!(
            attrs[COMPLIANCE_FRAMEWORKS],
            AttributeValue::StrList(vec!["NIST-800-53".to_string()])
        );
        assert_eq!(
            attrs[COMPLIANCE_REMEDIATION_DESCRIPTION].as_str(),
            Some("Rotate keys")
        );
        assert_eq!(attrs.len(), 8);
    }
}
