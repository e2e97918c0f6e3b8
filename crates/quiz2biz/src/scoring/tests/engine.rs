use super::common::*;
use crate::scoring::{round_to, ScoringEngine, DEFAULT_NEXT_ACTION_LIMIT};

#[test]
fn default_engine_uses_ten_next_actions() {
    assert_eq!(
        ScoringEngine::default().next_action_limit(),
        DEFAULT_NEXT_ACTION_LIMIT
    );
}

#[test]
fn assessment_chains_every_scoring_step() {
    let dimensions = architecture_and_devops();
    let questions = vec![
        question("q-arch-001", "arch_sec", 0.95, 0.5, true),
        question("q-arch-002", "arch_sec", 0.4, 0.0, false),
        question("q-devops-001", "devops_iac", 0.7, 1.0, true),
    ];

    let assessment = ScoringEngine::new(2).assess(&dimensions, &questions);

    let arch_residual = (0.95 * 0.5 + 0.4) / (1.35 + 0.0001);
    assert_close(assessment.portfolio_residual, 0.15 * arch_residual);
    assert_close(assessment.score, 100.0 * (1.0 - 0.15 * arch_residual));
    assert!(!assessment.meets_threshold);
    assert_eq!(assessment.dimension_results.len(), 2);
    assert_eq!(assessment.heatmap_cells.len(), 3);
    assert_eq!(assessment.next_actions.len(), 2);
    assert_eq!(assessment.next_actions[0].question_id, "q-arch-001");
    assert_eq!(assessment.heatmap_summary().total_cells, 3);
}

#[test]
fn fully_covered_portfolio_meets_threshold() {
    let dimensions = architecture_and_devops();
    let questions = vec![
        question("q1", "arch_sec", 0.9, 1.0, true),
        question("q2", "devops_iac", 0.6, 1.0, true),
    ];

    let assessment = ScoringEngine::default().assess(&dimensions, &questions);

    assert_eq!(assessment.score, 100.0);
    assert!(assessment.meets_threshold);
    assert!(assessment.next_actions.is_empty());
}

#[test]
fn empty_inputs_score_a_perfect_hundred() {
    let assessment = ScoringEngine::default().assess(&[], &[]);

    assert_eq!(assessment.portfolio_residual, 0.0);
    assert_eq!(assessment.score, 100.0);
    assert!(assessment.heatmap_cells.is_empty());
    assert!(assessment.next_actions.is_empty());
}

#[test]
fn assessment_is_deterministic() {
    let dimensions = architecture_and_devops();
    let questions = vec![
        question("q1", "arch_sec", 0.7, 0.3, true),
        question("q2", "devops_iac", 0.2, 0.0, false),
    ];
    let engine = ScoringEngine::default();

    assert_eq!(
        engine.assess(&dimensions, &questions),
        engine.assess(&dimensions, &questions)
    );
}

#[test]
fn rounding_helper_rounds_half_away_from_zero() {
    assert_eq!(round_to(95.805, 1), 95.8);
    assert_eq!(round_to(0.392_829, 4), 0.3928);
    assert_eq!(round_to(-1.25, 1), -1.3);
}
