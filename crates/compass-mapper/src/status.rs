//! Evaluation status normalization

use compass_core::{ComplianceStatus, EvaluationStatus};

/// Map a policy engine's evaluation result to a compliance verdict
pub fn normalize(status: EvaluationStatus) -> ComplianceStatus {
    match status {
        EvaluationStatus::Passed => ComplianceStatus::Compliant,
        EvaluationStatus::Failed => ComplianceStatus::NonCompliant,
        EvaluationStatus::NotRun | EvaluationStatus::NotApplicable => {
            ComplianceStatus::NotApplicable
        }
        EvaluationStatus::Unknown => ComplianceStatus::Unknown,
    }
}

/// Map a raw decision string straight to a compliance verdict
pub fn normalize_decision(decision: &str) -> ComplianceStatus {
    normalize(EvaluationStatus::parse(decision))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_table() {
        let cases = [
            ("passed", ComplianceStatus::Compliant),
            ("success", ComplianceStatus::Compliant),
            ("failed", ComplianceStatus::NonCompliant),
            ("failure", ComplianceStatus::NonCompliant),
            ("not-run", ComplianceStatus::NotApplicable),
            ("not-applicable", ComplianceStatus::NotApplicable),
            ("error", ComplianceStatus::Unknown),
            ("", ComplianceStatus::Unknown),
        ];

        for (decision, expected) in cases {
            assert_eq!(normalize_decision(decision), expected, "{decision}");
        }
    }
}
