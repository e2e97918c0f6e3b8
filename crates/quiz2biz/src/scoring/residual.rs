use super::domain::{DimensionDefinition, DimensionResult, QuestionScore};

/// Keeps residual ratios defined when a question set carries no severity.
pub const EPSILON: f64 = 0.0001;

/// Readiness score at or above which a session is considered ready.
pub const TARGET_SCORE: f64 = 95.0;

/// `Σ(s_i × (1 − c_i)) / (Σ s_i + ε)`.
///
/// An empty or zero-severity set measures no risk and yields 0.
pub fn calculate_dimension_residual<'a, I>(questions: I) -> f64
where
    I: IntoIterator<Item = &'a QuestionScore>,
{
    let (weighted_uncovered, total_severity) = questions
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(uncovered, severity), question| {
            (
                uncovered + question.residual_contribution(),
                severity + question.severity,
            )
        });

    weighted_uncovered / (total_severity + EPSILON)
}

/// `Σ(w_d × r_d)`. Weights are used as given; keeping them summed to 1 is up to the caller.
pub fn calculate_portfolio_residual(dimensions: &[DimensionResult]) -> f64 {
    dimensions
        .iter()
        .map(DimensionResult::weighted_contribution)
        .sum()
}

/// `100 × (1 − residual)`, extrapolated linearly outside `[0, 1]`.
pub fn calculate_readiness_score(portfolio_residual: f64) -> f64 {
    100.0 * (1.0 - portfolio_residual)
}

pub fn meets_readiness_threshold_score(score: f64) -> bool {
    score >= TARGET_SCORE
}

/// One result per dimension, in input order.
///
/// A dimension without questions reports residual 0 and zero counts.
pub fn calculate_dimension_results(
    dimensions: &[DimensionDefinition],
    questions: &[QuestionScore],
) -> Vec<DimensionResult> {
    dimensions
        .iter()
        .map(|dimension| {
            let members: Vec<&QuestionScore> = questions
                .iter()
                .filter(|question| question.belongs_to(&dimension.key))
                .collect();

            if members.is_empty() {
                return DimensionResult {
                    key: dimension.key.clone(),
                    display_name: dimension.display_name.clone(),
                    weight: dimension.weight,
                    residual: 0.0,
                    question_count: 0,
                    answered_count: 0,
                    coverage_average: 0.0,
                };
            }

            let residual = calculate_dimension_residual(members.iter().copied());
            let answered_count = members.iter().filter(|question| question.is_answered).count();
            let coverage_sum: f64 = members.iter().map(|question| question.coverage).sum();

            DimensionResult {
                key: dimension.key.clone(),
                display_name: dimension.display_name.clone(),
                weight: dimension.weight,
                residual,
                question_count: members.len(),
                answered_count,
                coverage_average: coverage_sum / members.len() as f64,
            }
        })
        .collect()
}
