use crate::scoring::domain::{DimensionDefinition, DimensionResult, QuestionScore};

pub(super) const TOLERANCE: f64 = 1e-9;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn question(
    id: &str,
    dimension: &str,
    severity: f64,
    coverage: f64,
    is_answered: bool,
) -> QuestionScore {
    QuestionScore {
        id: id.to_string(),
        text: format!("Question {id}"),
        dimension_key: Some(dimension.to_string()),
        severity,
        coverage,
        is_answered,
        persona: Some("CTO".to_string()),
    }
}

pub(super) fn unassigned_question(id: &str, severity: f64) -> QuestionScore {
    QuestionScore {
        dimension_key: None,
        ..question(id, "", severity, 0.0, false)
    }
}

pub(super) fn dimension(key: &str, name: &str, weight: f64) -> DimensionDefinition {
    DimensionDefinition {
        key: key.to_string(),
        display_name: name.to_string(),
        weight,
    }
}

pub(super) fn dimension_result(key: &str, name: &str, weight: f64) -> DimensionResult {
    DimensionResult {
        key: key.to_string(),
        display_name: name.to_string(),
        weight,
        residual: 0.0,
        question_count: 0,
        answered_count: 0,
        coverage_average: 0.0,
    }
}

pub(super) fn architecture_and_devops() -> Vec<DimensionDefinition> {
    vec![
        dimension("arch_sec", "Architecture & Security", 0.15),
        dimension("devops_iac", "DevOps & Infrastructure as Code", 0.12),
    ]
}
