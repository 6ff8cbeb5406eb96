use compass_core::{ComplianceStatus, EnrichmentStatus, EvaluationStatus, Evidence};
use compass_mapper::{normalize, normalize_decision, BasicMapper, Mapper, Scope};
use proptest::prelude::*;

fn known_decision() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("passed"),
        Just("success"),
        Just("failed"),
        Just("failure"),
        Just("not-run"),
        Just("not-applicable"),
    ]
}

/// Flip the ASCII case of characters selected by the mask
fn recase(decision: &str, mask: &[bool]) -> String {
    decision
        .chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn decisions_match_ignoring_case(
        decision in known_decision(),
        mask in proptest::collection::vec(any::<bool>(), 1..16),
    ) {
        let recased = recase(decision, &mask);
        prop_assert_eq!(normalize_decision(&recased), normalize_decision(decision));
        prop_assert_ne!(normalize_decision(&recased), ComplianceStatus::Unknown);
    }

    #[test]
    fn unrecognized_decisions_are_unknown(decision in "[a-z ]{0,24}") {
        let lowered = decision.to_ascii_lowercase();
        prop_assume!(![
            "passed", "success", "failed", "failure", "not-run", "not-applicable",
        ].contains(&lowered.as_str()));

        prop_assert_eq!(normalize_decision(&decision), ComplianceStatus::Unknown);
    }

    #[test]
    fn padded_decisions_are_not_trimmed(decision in known_decision(), pad in " {1,3}") {
        let padded = format!("{pad}{decision}");
        prop_assert_eq!(normalize_decision(&padded), ComplianceStatus::Unknown);
    }

    #[test]
    fn mapper_without_plans_always_unmapped(
        rule in "[A-Za-z0-9-]{1,16}",
        decision in "[a-z-]{0,16}",
    ) {
        let mapper = BasicMapper::new();
        let evidence = Evidence::new("engine", rule, EvaluationStatus::parse(&decision));

        let compliance = mapper.map(&evidence, &Scope::new());
        prop_assert_eq!(compliance.enrichment_status, EnrichmentStatus::Unmapped);
        prop_assert_eq!(compliance.status, ComplianceStatus::Unknown);
    }
}

#[test]
fn normalize_is_total_over_variants() {
    let statuses = [
        EvaluationStatus::Passed,
        EvaluationStatus::Failed,
        EvaluationStatus::NotRun,
        EvaluationStatus::NotApplicable,
        EvaluationStatus::Unknown,
    ];

    for status in statuses {
        assert_eq!(normalize(status), normalize_decision(status.as_str()));
    }
}
