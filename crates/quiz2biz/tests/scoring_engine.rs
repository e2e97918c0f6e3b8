use quiz2biz::catalog::{active_definitions, standard_dimensions};
use quiz2biz::scoring::{
    calculate_dimension_residual, calculate_portfolio_residual, calculate_readiness_score,
    DimensionResult, QuestionScore, ResidualColor, ScoringEngine, SeverityBucket, TARGET_SCORE,
};

fn question(id: &str, dimension: &str, severity: f64, coverage: f64) -> QuestionScore {
    QuestionScore {
        id: id.to_string(),
        text: format!("Question {id}"),
        dimension_key: Some(dimension.to_string()),
        severity,
        coverage,
        is_answered: coverage > 0.0,
        persona: None,
    }
}

fn result(key: &str, weight: f64, residual: f64) -> DimensionResult {
    DimensionResult {
        key: key.to_string(),
        display_name: key.to_string(),
        weight,
        residual,
        question_count: 1,
        answered_count: 1,
        coverage_average: 0.0,
    }
}

#[test]
fn architecture_scenario_matches_published_residual() {
    let questions = vec![
        question("q-arch-001", "arch_sec", 0.8, 0.5),
        question("q-arch-002", "arch_sec", 0.6, 0.75),
    ];

    let residual = calculate_dimension_residual(&questions);

    assert!((residual - 0.55 / 1.4001).abs() < 1e-12);
    assert!((residual - 0.3928).abs() < 0.0001);
}

#[test]
fn portfolio_scenario_scores_ninety_five_point_eight() {
    let results = vec![result("arch_sec", 0.15, 0.2), result("devops_iac", 0.12, 0.1)];

    let residual = calculate_portfolio_residual(&results);
    let score = calculate_readiness_score(residual);

    assert!((residual - 0.042).abs() < 1e-12);
    assert!((score - 95.8).abs() < 1e-9);
    assert!(score >= TARGET_SCORE);
}

#[test]
fn residual_colour_boundaries() {
    assert_eq!(ResidualColor::classify(0.05), ResidualColor::Green);
    assert_eq!(ResidualColor::classify(0.050001), ResidualColor::Amber);
    assert_eq!(ResidualColor::classify(0.15), ResidualColor::Amber);
    assert_eq!(ResidualColor::classify(0.150001), ResidualColor::Red);
}

#[test]
fn standard_catalog_with_unauthored_dimensions_scores_only_authored_risk() {
    let dimensions = active_definitions(&standard_dimensions());
    let questions = vec![
        question("q-arch-001", "arch_sec", 0.95, 0.0),
        question("q-fin-001", "finance", 0.7, 0.5),
    ];

    let assessment = ScoringEngine::default().assess(&dimensions, &questions);

    let expected = 0.15 * (0.95 / 0.9501) + 0.10 * (0.35 / 0.7001);
    assert!((assessment.portfolio_residual - expected).abs() < 1e-12);
    assert_eq!(assessment.dimension_results.len(), 11);
    assert_eq!(
        assessment
            .dimension_results
            .iter()
            .filter(|dimension| dimension.question_count == 0)
            .count(),
        9
    );

    let critical = assessment
        .heatmap_cells
        .iter()
        .find(|cell| cell.severity_bucket == SeverityBucket::Critical)
        .expect("critical architecture cell");
    assert_eq!(critical.dimension, "arch_sec");
    assert_eq!(critical.color, ResidualColor::Red);
    assert_eq!(assessment.heatmap_summary().critical_gap_count, 1);

    assert_eq!(assessment.next_actions[0].question_id, "q-arch-001");
    assert!(assessment.next_actions[0]
        .rationale
        .starts_with("Answering this Architecture & Security question"));
}

#[test]
fn assessment_serializes_with_snake_case_fields() {
    let dimensions = active_definitions(&standard_dimensions());
    let questions = vec![question("q-arch-001", "arch_sec", 0.95, 0.0)];

    let assessment = ScoringEngine::new(1).assess(&dimensions, &questions);
    let payload = serde_json::to_value(&assessment).expect("serializes");

    assert_eq!(payload["meets_threshold"], serde_json::json!(false));
    assert_eq!(
        payload["heatmap_cells"][0]["severity_bucket"],
        serde_json::json!("critical")
    );
    assert_eq!(payload["next_actions"].as_array().map(Vec::len), Some(1));
}
