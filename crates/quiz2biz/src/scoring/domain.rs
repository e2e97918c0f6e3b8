use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity assumed for questions whose catalog entry leaves it unset.
pub const DEFAULT_SEVERITY: f64 = 0.5;

/// Per-question projection of the catalog and the session's response state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub id: String,
    pub text: String,
    pub dimension_key: Option<String>,
    pub severity: f64,
    pub coverage: f64,
    pub is_answered: bool,
    pub persona: Option<String>,
}

impl QuestionScore {
    /// Range check for callers; the engine itself never rejects input.
    pub fn validate(&self) -> Result<(), ScoringInputError> {
        if !is_unit_interval(self.severity) {
            return Err(ScoringInputError::SeverityOutOfRange {
                question_id: self.id.clone(),
                value: self.severity,
            });
        }

        if !is_unit_interval(self.coverage) {
            return Err(ScoringInputError::CoverageOutOfRange {
                question_id: self.id.clone(),
                value: self.coverage,
            });
        }

        Ok(())
    }

    pub(crate) fn belongs_to(&self, dimension_key: &str) -> bool {
        self.dimension_key.as_deref() == Some(dimension_key)
    }

    /// Severity-weighted share of this question that is still uncovered.
    pub fn residual_contribution(&self) -> f64 {
        self.severity * (1.0 - self.coverage)
    }
}

fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Input rejected by [`QuestionScore::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringInputError {
    #[error("question {question_id} has severity {value} outside [0, 1]")]
    SeverityOutOfRange { question_id: String, value: f64 },
    #[error("question {question_id} has coverage {value} outside [0, 1]")]
    CoverageOutOfRange { question_id: String, value: f64 },
}

/// Dimension identity and portfolio weight supplied by the dimension catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDefinition {
    pub key: String,
    pub display_name: String,
    pub weight: f64,
}

/// Residual risk aggregated over one dimension's questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub key: String,
    pub display_name: String,
    pub weight: f64,
    pub residual: f64,
    pub question_count: usize,
    pub answered_count: usize,
    pub coverage_average: f64,
}

impl DimensionResult {
    pub fn color(&self) -> ResidualColor {
        ResidualColor::classify(self.residual)
    }

    /// This dimension's share of the portfolio residual.
    pub fn weighted_contribution(&self) -> f64 {
        self.weight * self.residual
    }
}

/// Fixed severity ranges used to slice each dimension in the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBucket {
    pub const fn ordered() -> [Self; 4] {
        [Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Lower and upper bound; every range is half-open except `Critical`, which includes 1.0.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Low => (0.0, 0.25),
            Self::Medium => (0.25, 0.5),
            Self::High => (0.5, 0.75),
            Self::Critical => (0.75, 1.0),
        }
    }

    pub fn contains(self, severity: f64) -> bool {
        let (min, max) = self.bounds();
        match self {
            Self::Critical => severity >= min && severity <= max,
            _ => severity >= min && severity < max,
        }
    }

    pub fn for_severity(severity: f64) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|bucket| bucket.contains(severity))
    }
}

impl fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity bucket '{0}' (expected low, medium, high or critical)")]
pub struct UnknownSeverityBucket(pub String);

impl FromStr for SeverityBucket {
    type Err = UnknownSeverityBucket;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownSeverityBucket(value.to_string())),
        }
    }
}

/// Traffic-light classification of a residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualColor {
    Green,
    Amber,
    Red,
}

impl ResidualColor {
    pub const GREEN_MAX: f64 = 0.05;
    pub const AMBER_MAX: f64 = 0.15;

    /// Both bands are inclusive at their upper edge: 0.05 is green, 0.15 is amber.
    pub fn classify(residual: f64) -> Self {
        if residual <= Self::GREEN_MAX {
            Self::Green
        } else if residual <= Self::AMBER_MAX {
            Self::Amber
        } else {
            Self::Red
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }

    pub const fn hex(self) -> &'static str {
        match self {
            Self::Green => "#28A745",
            Self::Amber => "#FFC107",
            Self::Red => "#DC3545",
        }
    }
}

/// Residual for one (dimension, severity bucket) pair that holds at least one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub dimension: String,
    pub dimension_name: String,
    pub severity_bucket: SeverityBucket,
    pub residual: f64,
    pub color: ResidualColor,
    pub question_count: usize,
}

/// Ranked recommendation: the score lift available from fully covering one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub question_id: String,
    pub question_text: String,
    pub dimension_key: String,
    pub dimension_name: String,
    pub delta_score: f64,
    pub current_coverage: f64,
    pub severity: f64,
    pub persona: Option<String>,
    pub rationale: String,
}

/// Question ranked by the lift still available from its current coverage up to full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedQuestion {
    pub rank: usize,
    pub question_id: String,
    pub text: String,
    pub dimension_key: String,
    pub dimension_name: String,
    pub severity: f64,
    pub current_coverage: f64,
    pub expected_score_lift: f64,
    pub persona: Option<String>,
    pub rationale: String,
}

/// Five-step evidence scale used when coverage is entered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageLevel {
    None,
    Partial,
    Half,
    Substantial,
    Full,
}

impl CoverageLevel {
    pub const fn value(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Partial => 0.25,
            Self::Half => 0.5,
            Self::Substantial => 0.75,
            Self::Full => 1.0,
        }
    }

    /// Snaps a decimal coverage to the nearest level.
    pub fn from_decimal(value: f64) -> Self {
        if value < 0.125 {
            Self::None
        } else if value < 0.375 {
            Self::Partial
        } else if value < 0.625 {
            Self::Half
        } else if value < 0.875 {
            Self::Substantial
        } else {
            Self::Full
        }
    }
}
