use super::common::*;
use crate::scoring::{
    calculate_dimension_residual, calculate_dimension_results, calculate_portfolio_residual,
    calculate_readiness_score, meets_readiness_threshold_score, DimensionResult, QuestionScore,
};

#[test]
fn residual_is_zero_when_everything_is_covered() {
    let questions = vec![
        question("q1", "arch_sec", 0.9, 1.0, true),
        question("q2", "arch_sec", 0.3, 1.0, true),
    ];

    assert_eq!(calculate_dimension_residual(&questions), 0.0);
}

#[test]
fn residual_approaches_one_when_nothing_is_covered() {
    let questions = vec![
        question("q1", "arch_sec", 0.9, 0.0, false),
        question("q2", "arch_sec", 0.3, 0.0, false),
    ];

    let residual = calculate_dimension_residual(&questions);
    assert!(residual > 0.99 && residual < 1.0, "got {residual}");
}

#[test]
fn empty_and_zero_severity_sets_measure_no_risk() {
    let none: Vec<QuestionScore> = Vec::new();
    assert!(calculate_dimension_residual(&none).abs() < 0.0001);

    let zero_severity = vec![
        question("q1", "arch_sec", 0.0, 0.0, false),
        question("q2", "arch_sec", 0.0, 0.4, true),
    ];
    assert_eq!(calculate_dimension_residual(&zero_severity), 0.0);
}

#[test]
fn residual_matches_worked_example() {
    let questions = vec![
        question("q1", "arch_sec", 0.8, 0.5, true),
        question("q2", "arch_sec", 0.6, 0.75, true),
    ];

    let residual = calculate_dimension_residual(&questions);
    assert_close(residual, 0.55 / 1.4001);
    assert!((residual - 0.3928).abs() < 0.0001);
}

#[test]
fn portfolio_residual_weights_dimensions() {
    let mut security = dimension_result("arch_sec", "Architecture & Security", 0.15);
    security.residual = 0.2;
    let mut devops = dimension_result("devops_iac", "DevOps", 0.12);
    devops.residual = 0.1;

    let residual = calculate_portfolio_residual(&[security, devops]);
    assert_close(residual, 0.042);
    assert!((calculate_readiness_score(residual) - 95.8).abs() < 1e-9);
}

#[test]
fn portfolio_residual_of_nothing_is_exactly_zero() {
    let empty: Vec<DimensionResult> = Vec::new();
    assert_eq!(calculate_portfolio_residual(&empty), 0.0);
}

#[test]
fn readiness_score_is_linear_and_unclamped() {
    assert_eq!(calculate_readiness_score(0.0), 100.0);
    assert_eq!(calculate_readiness_score(1.0), 0.0);
    assert!((calculate_readiness_score(0.088) - 91.2).abs() < 0.1);
    assert!(calculate_readiness_score(1.5) < 0.0);
    assert!(calculate_readiness_score(-0.2) > 100.0);
}

#[test]
fn threshold_is_inclusive_at_ninety_five() {
    assert!(meets_readiness_threshold_score(95.0));
    assert!(meets_readiness_threshold_score(100.0));
    assert!(!meets_readiness_threshold_score(94.999));
}

#[test]
fn dimension_results_follow_input_order_and_count_answers() {
    let dimensions = architecture_and_devops();
    let questions = vec![
        question("q1", "devops_iac", 0.5, 1.0, true),
        question("q2", "arch_sec", 0.8, 0.5, true),
        question("q3", "arch_sec", 0.6, 0.0, false),
        unassigned_question("q4", 0.9),
    ];

    let results = calculate_dimension_results(&dimensions, &questions);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].key, "arch_sec");
    assert_eq!(results[0].question_count, 2);
    assert_eq!(results[0].answered_count, 1);
    assert_close(results[0].coverage_average, 0.25);
    assert_close(results[0].residual, (0.8 * 0.5 + 0.6) / (1.4 + 0.0001));

    assert_eq!(results[1].key, "devops_iac");
    assert_eq!(results[1].question_count, 1);
    assert_eq!(results[1].residual, 0.0);
}

#[test]
fn dimension_without_questions_reports_zero_residual() {
    let dimensions = vec![dimension("finance", "Finance & Cost Management", 0.1)];
    let questions = vec![question("q1", "arch_sec", 0.8, 0.0, false)];

    let results = calculate_dimension_results(&dimensions, &questions);

    assert_eq!(results[0].residual, 0.0);
    assert_eq!(results[0].question_count, 0);
    assert_eq!(results[0].answered_count, 0);
    assert_eq!(results[0].coverage_average, 0.0);
    assert_eq!(results[0].weight, 0.1);
}
