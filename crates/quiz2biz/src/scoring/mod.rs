//! Weighted residual-risk readiness scoring.
//!
//! Every function here is pure and total: degenerate input (no questions, zero severity)
//! maps to a defined number through the epsilon guard, and range validation is left to
//! callers via [`QuestionScore::validate`].

mod actions;
pub mod domain;
pub mod export;
pub mod heatmap;
mod residual;

#[cfg(test)]
mod tests;

pub use actions::{
    calculate_next_actions, max_potential_score, prioritize_questions, DEFAULT_NEXT_QUESTION_LIMIT,
};
pub use domain::{
    CoverageLevel, DimensionDefinition, DimensionResult, HeatmapCell, NextAction,
    PrioritizedQuestion, QuestionScore, ResidualColor, ScoringInputError, SeverityBucket,
    UnknownSeverityBucket, DEFAULT_SEVERITY,
};
pub use export::{heatmap_to_csv, heatmap_to_markdown, HeatmapExportError};
pub use heatmap::{
    drilldown, filter_cells, generate_heatmap_cells, DrilldownQuestion, HeatmapDrilldown,
    HeatmapSummary,
};
pub use residual::{
    calculate_dimension_residual, calculate_dimension_results, calculate_portfolio_residual,
    calculate_readiness_score, meets_readiness_threshold_score, EPSILON, TARGET_SCORE,
};

use serde::{Deserialize, Serialize};

pub const DEFAULT_NEXT_ACTION_LIMIT: usize = 10;

/// Stateless evaluator chaining the scoring steps for one question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    next_action_limit: usize,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(DEFAULT_NEXT_ACTION_LIMIT)
    }
}

impl ScoringEngine {
    pub fn new(next_action_limit: usize) -> Self {
        Self { next_action_limit }
    }

    pub fn next_action_limit(&self) -> usize {
        self.next_action_limit
    }

    pub fn assess(
        &self,
        dimensions: &[DimensionDefinition],
        questions: &[QuestionScore],
    ) -> ReadinessAssessment {
        let dimension_results = calculate_dimension_results(dimensions, questions);
        let portfolio_residual = calculate_portfolio_residual(&dimension_results);
        let score = calculate_readiness_score(portfolio_residual);
        let heatmap_cells = generate_heatmap_cells(&dimension_results, questions);
        let next_actions =
            calculate_next_actions(&dimension_results, questions, self.next_action_limit);

        ReadinessAssessment {
            score,
            portfolio_residual,
            meets_threshold: meets_readiness_threshold_score(score),
            dimension_results,
            heatmap_cells,
            next_actions,
        }
    }
}

/// Unrounded output of one [`ScoringEngine::assess`] pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub score: f64,
    pub portfolio_residual: f64,
    pub meets_threshold: bool,
    pub dimension_results: Vec<DimensionResult>,
    pub heatmap_cells: Vec<HeatmapCell>,
    pub next_actions: Vec<NextAction>,
}

impl ReadinessAssessment {
    pub fn heatmap_summary(&self) -> HeatmapSummary {
        HeatmapSummary::from_cells(&self.heatmap_cells)
    }
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
