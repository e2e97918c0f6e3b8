use serde::{Deserialize, Serialize};

use super::domain::{DimensionResult, HeatmapCell, QuestionScore, ResidualColor, SeverityBucket};
use super::residual::calculate_dimension_residual;
use super::round_to;

/// Cells in dimension order, then low to critical. Empty combinations are omitted.
pub fn generate_heatmap_cells(
    dimensions: &[DimensionResult],
    questions: &[QuestionScore],
) -> Vec<HeatmapCell> {
    let mut cells = Vec::new();

    for dimension in dimensions {
        let members: Vec<&QuestionScore> = questions
            .iter()
            .filter(|question| question.belongs_to(&dimension.key))
            .collect();

        for bucket in SeverityBucket::ordered() {
            if let Some(cell) = build_cell(dimension, bucket, &members) {
                cells.push(cell);
            }
        }
    }

    cells
}

fn build_cell(
    dimension: &DimensionResult,
    bucket: SeverityBucket,
    members: &[&QuestionScore],
) -> Option<HeatmapCell> {
    let in_bucket: Vec<&QuestionScore> = members
        .iter()
        .copied()
        .filter(|question| bucket.contains(question.severity))
        .collect();

    if in_bucket.is_empty() {
        return None;
    }

    let residual = calculate_dimension_residual(in_bucket.iter().copied());

    Some(HeatmapCell {
        dimension: dimension.key.clone(),
        dimension_name: dimension.display_name.clone(),
        severity_bucket: bucket,
        residual,
        color: ResidualColor::classify(residual),
        question_count: in_bucket.len(),
    })
}

/// Colour tallies over a set of heatmap cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSummary {
    pub total_cells: usize,
    pub green_cells: usize,
    pub amber_cells: usize,
    pub red_cells: usize,
    /// Red cells in the critical bucket.
    pub critical_gap_count: usize,
    /// Sum of all cell residuals, rounded to two decimals.
    pub overall_risk_score: f64,
}

impl HeatmapSummary {
    pub fn from_cells(cells: &[HeatmapCell]) -> Self {
        let mut summary = cells.iter().fold(Self::default(), |mut summary, cell| {
            summary.total_cells += 1;
            summary.overall_risk_score += cell.residual;
            match cell.color {
                ResidualColor::Green => summary.green_cells += 1,
                ResidualColor::Amber => summary.amber_cells += 1,
                ResidualColor::Red => {
                    summary.red_cells += 1;
                    if cell.severity_bucket == SeverityBucket::Critical {
                        summary.critical_gap_count += 1;
                    }
                }
            }
            summary
        });
        summary.overall_risk_score = round_to(summary.overall_risk_score, 2);
        summary
    }
}

/// A blank dimension filter matches every cell.
pub fn filter_cells(
    cells: &[HeatmapCell],
    dimension: Option<&str>,
    bucket: Option<SeverityBucket>,
) -> Vec<HeatmapCell> {
    let dimension = dimension.map(str::trim).filter(|key| !key.is_empty());

    cells
        .iter()
        .filter(|cell| {
            dimension
                .map(|key| cell.dimension.eq_ignore_ascii_case(key))
                .unwrap_or(true)
        })
        .filter(|cell| bucket.map(|b| cell.severity_bucket == b).unwrap_or(true))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrilldownQuestion {
    pub question_id: String,
    pub text: String,
    pub severity: f64,
    pub current_coverage: f64,
    pub residual_contribution: f64,
}

/// A single heatmap cell together with the questions that produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapDrilldown {
    pub cell: HeatmapCell,
    pub contributing_questions: Vec<DrilldownQuestion>,
    pub potential_improvement: f64,
}

/// Returns `None` when the dimension is unknown or the bucket holds no questions.
pub fn drilldown(
    dimensions: &[DimensionResult],
    questions: &[QuestionScore],
    dimension_key: &str,
    bucket: SeverityBucket,
) -> Option<HeatmapDrilldown> {
    let dimension = dimensions
        .iter()
        .find(|dimension| dimension.key.eq_ignore_ascii_case(dimension_key.trim()))?;

    let members: Vec<&QuestionScore> = questions
        .iter()
        .filter(|question| question.belongs_to(&dimension.key))
        .collect();
    let cell = build_cell(dimension, bucket, &members)?;

    let contributing_questions: Vec<DrilldownQuestion> = members
        .into_iter()
        .filter(|question| bucket.contains(question.severity))
        .map(|question| DrilldownQuestion {
            question_id: question.id.clone(),
            text: question.text.clone(),
            severity: question.severity,
            current_coverage: question.coverage,
            residual_contribution: question.residual_contribution(),
        })
        .collect();

    let potential_improvement = contributing_questions
        .iter()
        .map(|question| question.residual_contribution)
        .sum();

    Some(HeatmapDrilldown {
        cell,
        contributing_questions,
        potential_improvement,
    })
}
