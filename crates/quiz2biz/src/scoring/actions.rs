use std::collections::HashMap;

use super::domain::{DimensionResult, NextAction, PrioritizedQuestion, QuestionScore};
use super::residual::EPSILON;
use super::round_to;

pub const DEFAULT_NEXT_QUESTION_LIMIT: usize = 5;

fn severity_totals(questions: &[QuestionScore]) -> HashMap<&str, f64> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for question in questions {
        if let Some(key) = question.dimension_key.as_deref() {
            *totals.entry(key).or_insert(0.0) += question.severity;
        }
    }
    totals
}

/// Ranks every question short of full coverage by the score lift of covering it.
///
/// `Δ = 100 × w_d × s_i / (Σ s_j + ε)` over the question's dimension. Questions whose
/// dimension is not in `dimensions` cannot be scored and are skipped. Ties keep input order.
pub fn calculate_next_actions(
    dimensions: &[DimensionResult],
    questions: &[QuestionScore],
    limit: usize,
) -> Vec<NextAction> {
    let severity_totals = severity_totals(questions);

    let mut actions: Vec<NextAction> = questions
        .iter()
        .filter(|question| !question.is_answered || question.coverage < 1.0)
        .filter_map(|question| {
            let key = question.dimension_key.as_deref()?;
            let dimension = dimensions.iter().find(|dimension| dimension.key == key)?;
            let total_severity = severity_totals.get(key).copied().unwrap_or(0.0);
            let delta_score =
                100.0 * dimension.weight * (question.severity / (total_severity + EPSILON));

            Some(NextAction {
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                dimension_key: dimension.key.clone(),
                dimension_name: dimension.display_name.clone(),
                delta_score,
                current_coverage: question.coverage,
                severity: question.severity,
                persona: question.persona.clone(),
                rationale: action_rationale(question, dimension, delta_score),
            })
        })
        .collect();

    actions.sort_by(|a, b| b.delta_score.total_cmp(&a.delta_score));
    actions.truncate(limit);
    actions
}

fn action_rationale(question: &QuestionScore, dimension: &DimensionResult, delta: f64) -> String {
    let delta = (delta * 10.0).round() / 10.0;

    if !question.is_answered {
        return format!(
            "Answering this {} question could increase your score by ~{} points.",
            dimension.display_name, delta
        );
    }

    if question.coverage < 0.5 {
        let coverage_percent = (question.coverage * 100.0).round();
        return format!(
            "This question has {}% coverage. Adding evidence could increase your score by ~{} points.",
            coverage_percent, delta
        );
    }

    format!(
        "Verifying evidence for this {} question could contribute ~{} points.",
        dimension.display_name, delta
    )
}

/// Ranks every question below full coverage by its coverage-adjusted lift.
///
/// `lift = 100 × w_d × s_i × (1 − c_i) / (Σ s_j + ε)`, rounded to two decimals before
/// ranking. A dimension missing from `dimensions` weighs 0. Ties keep input order and ranks
/// start at 1.
pub fn prioritize_questions(
    dimensions: &[DimensionResult],
    questions: &[QuestionScore],
    limit: usize,
) -> Vec<PrioritizedQuestion> {
    let severity_totals = severity_totals(questions);

    let mut ranked: Vec<PrioritizedQuestion> = questions
        .iter()
        .filter(|question| question.coverage < 1.0)
        .filter_map(|question| {
            let key = question.dimension_key.as_deref()?;
            let dimension = dimensions.iter().find(|dimension| dimension.key == key);
            let weight = dimension.map(|dimension| dimension.weight).unwrap_or(0.0);
            let dimension_name = dimension
                .map(|dimension| dimension.display_name.clone())
                .unwrap_or_else(|| key.to_string());
            let total_severity = severity_totals.get(key).copied().unwrap_or(0.0);
            let lift = 100.0 * weight * question.severity * (1.0 - question.coverage)
                / (total_severity + EPSILON);

            Some(PrioritizedQuestion {
                rank: 0,
                question_id: question.id.clone(),
                text: question.text.clone(),
                dimension_key: key.to_string(),
                rationale: question_rationale(&dimension_name, question.coverage, lift),
                dimension_name,
                severity: question.severity,
                current_coverage: question.coverage,
                expected_score_lift: round_to(lift, 2),
                persona: question.persona.clone(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.expected_score_lift.total_cmp(&a.expected_score_lift));
    ranked.truncate(limit);
    for (index, question) in ranked.iter_mut().enumerate() {
        question.rank = index + 1;
    }
    ranked
}

/// `min(100, current + Σ lift)` over the listed questions, rounded to two decimals.
pub fn max_potential_score(current_score: f64, questions: &[PrioritizedQuestion]) -> f64 {
    let total_lift: f64 = questions
        .iter()
        .map(|question| question.expected_score_lift)
        .sum();
    round_to((current_score + total_lift).min(100.0), 2)
}

fn question_rationale(dimension_name: &str, coverage: f64, lift: f64) -> String {
    if coverage == 0.0 {
        return format!(
            "Answering this {} question could improve your score by up to {:.1} points. This question has no coverage yet.",
            dimension_name, lift
        );
    }

    format!(
        "Improving coverage on this {} question from {:.0}% to 100% could add {:.1} points to your readiness score.",
        dimension_name,
        coverage * 100.0,
        lift
    )
}
