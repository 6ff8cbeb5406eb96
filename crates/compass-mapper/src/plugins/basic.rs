//! Basic mapper
//!
//! Resolves evidence by matching its policy rule ID against the procedure
//! IDs of loaded assessment plans, then looking up the plan's control in the
//! catalog the plan references. Catalogs are tried in lexicographic order
//! and the first full match wins.

use compass_core::{AssessmentPlan, Compliance, ControlContext, EnrichmentStatus, Evidence, Frameworks};
use tracing::debug;

use crate::index::{ControlIndex, ProcedureIndex};
use crate::mapper::{Mapper, MapperId, PlanStore};
use crate::{status, Scope};

/// ID of the basic mapper when not registered under an engine name
pub const ID: &str = "basic";

/// Why one catalog did not produce a match
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionMiss {
    #[error("catalog {catalog_id} not found")]
    CatalogNotFound { catalog_id: String },

    #[error("policy rule {policy_rule_id} not found in plans for catalog {catalog_id}")]
    PolicyRuleNotFound {
        catalog_id: String,
        policy_rule_id: String,
    },

    #[error("control data for {control_id} not found in catalog {catalog_id}")]
    ControlNotFound {
        catalog_id: String,
        control_id: String,
    },
}

/// Compliance finding together with the misses seen while resolving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub compliance: Compliance,

    /// One entry per catalog tried before the result, in order
    pub misses: Vec<ResolutionMiss>,
}

/// Mapper matching evidence to plan procedures by policy rule ID
#[derive(Debug, Clone)]
pub struct BasicMapper {
    id: MapperId,
    plans: PlanStore,
}

impl BasicMapper {
    /// Create a basic mapper with no plans
    pub fn new() -> Self {
        Self::with_id(ID)
    }

    /// Create a basic mapper registered under the given ID
    pub fn with_id(id: impl Into<MapperId>) -> Self {
        Self {
            id: id.into(),
            plans: PlanStore::new(),
        }
    }

    /// Resolve evidence, keeping the diagnostic trail
    pub fn resolve(&self, evidence: &Evidence, scope: &Scope) -> Resolution {
        let verdict = status::normalize(evidence.policy_evaluation_status);
        let mut misses = Vec::new();

        for (catalog_id, plans) in &self.plans {
            let catalog = match scope.get(catalog_id) {
                Some(catalog) => catalog,
                None => {
                    misses.push(ResolutionMiss::CatalogNotFound {
                        catalog_id: catalog_id.clone(),
                    });
                    continue;
                }
            };

            let procedures = ProcedureIndex::build(plans);
            let procedure = match procedures.get(&evidence.policy_rule_id) {
                Some(procedure) => procedure,
                None => {
                    misses.push(ResolutionMiss::PolicyRuleNotFound {
                        catalog_id: catalog_id.clone(),
                        policy_rule_id: evidence.policy_rule_id.clone(),
                    });
                    continue;
                }
            };

            let controls = ControlIndex::build(catalog);
            let control = match controls.get(procedure.control_id) {
                Some(control) => control,
                None => {
                    misses.push(ResolutionMiss::ControlNotFound {
                        catalog_id: catalog_id.clone(),
                        control_id: procedure.control_id.to_string(),
                    });
                    continue;
                }
            };

            let compliance = Compliance {
                status: verdict,
                control: ControlContext {
                    id: procedure.requirement_id.to_string(),
                    catalog_id: catalog_id.clone(),
                    category: control.category.to_string(),
                    remediation_description: procedure
                        .documentation
                        .filter(|doc| !doc.is_empty())
                        .map(str::to_string),
                },
                frameworks: Frameworks {
                    requirements: control.requirements(),
                    frameworks: control.frameworks(),
                },
                enrichment_status: EnrichmentStatus::Success,
            };

            return Resolution { compliance, misses };
        }

        Resolution {
            compliance: Compliance::unmapped(),
            misses,
        }
    }
}

impl Default for BasicMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for BasicMapper {
    fn plugin_name(&self) -> &MapperId {
        &self.id
    }

    fn add_evaluation_plan(&mut self, catalog_id: &str, plans: Vec<AssessmentPlan>) {
        self.plans
            .entry(catalog_id.to_string())
            .or_default()
            .extend(plans);
    }

    fn plans(&self) -> &PlanStore {
        &self.plans
    }

    fn map(&self, evidence: &Evidence, scope: &Scope) -> Compliance {
        let resolution = self.resolve(evidence, scope);

        for miss in &resolution.misses {
            debug!(
                mapper = %self.id,
                policy_rule_id = %evidence.policy_rule_id,
                reason = %miss,
                "Resolution miss"
            );
        }

        if !resolution.compliance.is_mapped() {
            debug!(
                mapper = %self.id,
                policy_rule_id = %evidence.policy_rule_id,
                catalogs = self.plans.len(),
                "Evidence unmapped"
            );
        }

        resolution.compliance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::{
        Assessment, AssessmentProcedure, Catalog, ComplianceStatus, Control, ControlFamily,
        EntryReference, EvaluationStatus, GuidelineMapping,
    };

    fn test_plan(catalog_id: &str, control_id: &str) -> AssessmentPlan {
        AssessmentPlan::new(catalog_id, control_id).with_assessment(
            Assessment::new(EntryReference::new(catalog_id, "AC-1-REQ")).with_procedure(
                AssessmentProcedure::new("AC-1").with_documentation("Test procedure"),
            ),
        )
    }

    fn test_catalog(catalog_id: &str) -> Catalog {
        Catalog::new(catalog_id).with_family(
            ControlFamily::new("Access Control").with_control(
                Control::new("AC-1").with_mapping(GuidelineMapping::new("NIST-800-53", ["AC-1"])),
            ),
        )
    }

    fn evidence(status: EvaluationStatus) -> Evidence {
        Evidence::new("test-policy-engine", "AC-1", status)
    }

    #[test]
    fn test_new_basic_mapper() {
        let mapper = BasicMapper::new();
        assert_eq!(mapper.plugin_name().as_str(), ID);
        assert!(mapper.plans().is_empty());
    }

    #[test]
    fn test_map_with_plans() {
        let cases = [
            (EvaluationStatus::Passed, ComplianceStatus::Compliant),
            (EvaluationStatus::Failed, ComplianceStatus::NonCompliant),
            (EvaluationStatus::NotRun, ComplianceStatus::NotApplicable),
            (EvaluationStatus::NotApplicable, ComplianceStatus::NotApplicable),
            (EvaluationStatus::Unknown, ComplianceStatus::Unknown),
        ];

        for (status, expected) in cases {
            let mut mapper = BasicMapper::new();
            mapper.add_evaluation_plan("test-catalog", vec![test_plan("test-catalog", "AC-1")]);
            let scope: Scope = [test_catalog("test-catalog")].into_iter().collect();

            let compliance = mapper.map(&evidence(status), &scope);

            assert_eq!(compliance.status, expected);
            assert_eq!(compliance.enrichment_status, EnrichmentStatus::Success);
            assert_eq!(compliance.control.id, "AC-1-REQ");
            assert_eq!(compliance.control.category, "Access Control");
            assert_eq!(compliance.control.catalog_id, "test-catalog");
            assert_eq!(
                compliance.control.remediation_description.as_deref(),
                Some("Test procedure")
            );
        }
    }

    #[test]
    fn test_map_unmapped_without_plans() {
        let mapper = BasicMapper::new();
        let resolution = mapper.resolve(&evidence(EvaluationStatus::Failed), &Scope::new());

        assert_eq!(resolution.compliance, Compliance::unmapped());
        assert!(resolution.misses.is_empty());
    }

    #[test]
    fn test_misses_are_recorded_per_catalog() {
        let mut mapper = BasicMapper::new();
        mapper.add_evaluation_plan("a-missing", vec![test_plan("a-missing", "AC-1")]);
        mapper.add_evaluation_plan("b-no-control", vec![test_plan("b-no-control", "AC-9")]);
        mapper.add_evaluation_plan("c-match", vec![test_plan("c-match", "AC-1")]);
        mapper.add_evaluation_plan("d-unreached", vec![test_plan("d-unreached", "AC-1")]);

        let scope: Scope = [
            test_catalog("b-no-control"),
            test_catalog("c-match"),
            test_catalog("d-unreached"),
        ]
        .into_iter()
        .collect();

        let resolution = mapper.resolve(&evidence(EvaluationStatus::Passed), &scope);

        assert!(resolution.compliance.is_mapped());
        assert_eq!(resolution.compliance.control.catalog_id, "c-match");
        assert_eq!(
            resolution.misses,
            vec![
                ResolutionMiss::CatalogNotFound {
                    catalog_id: "a-missing".to_string()
                },
                ResolutionMiss::ControlNotFound {
                    catalog_id: "b-no-control".to_string(),
                    control_id: "AC-9".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_policy_rule_not_found() {
        let mut mapper = BasicMapper::new();
        mapper.add_evaluation_plan("cat", vec![test_plan("cat", "AC-1")]);
        let scope: Scope = [test_catalog("cat")].into_iter().collect();

        let mut other = evidence(EvaluationStatus::Passed);
        other.policy_rule_id = "other".to_string();
        let resolution = mapper.resolve(&other, &scope);

        assert_eq!(resolution.compliance.status, ComplianceStatus::Unknown);
        assert_eq!(
            resolution.misses,
            vec![ResolutionMiss::PolicyRuleNotFound {
                catalog_id: "cat".to_string(),
                policy_rule_id: "other".to_string()
            }]
        );
        assert_eq!(
            resolution.misses[0].to_string(),
            "policy rule other not found in plans for catalog cat"
        );
    }

    #[test]
    fn test_empty_documentation_is_omitted() {
        let mut mapper = BasicMapper::new();
        let plan = AssessmentPlan::new("cat", "AC-1").with_assessment(
            Assessment::new(EntryReference::new("cat", "AC-1-REQ"))
                .with_procedure(AssessmentProcedure::new("AC-1").with_documentation("")),
        );
        mapper.add_evaluation_plan("cat", vec![plan]);
        let scope: Scope = [test_catalog("cat")].into_iter().collect();

        let compliance = mapper.map(&evidence(EvaluationStatus::Passed), &scope);
        assert!(compliance.is_mapped());
        assert!(compliance.control.remediation_description.is_none());
    }

    #[test]
    fn test_add_evaluation_plan_appends() {
        let mut mapper = BasicMapper::new();
        mapper.add_evaluation_plan(
            "test-catalog",
            vec![AssessmentPlan::new("test-catalog", "AC-1")],
        );
        mapper.add_evaluation_plan(
            "test-catalog",
            vec![AssessmentPlan::new("test-catalog", "AC-2")],
        );

        assert_eq!(mapper.plans().len(), 1);
        let plans = &mapper.plans()["test-catalog"];
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].catalog_id(), "test-catalog");
        assert_eq!(plans[0].control_id(), "AC-1");
        assert_eq!(plans[1].control_id(), "AC-2");
    }
}
