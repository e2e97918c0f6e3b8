use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{CoverageLevel, DimensionDefinition};

/// Identifier wrapper for questionnaire sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionnaireId(pub String);

/// Session row as far as scoring is concerned: ownership plus the last persisted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub questionnaire_id: QuestionnaireId,
    pub readiness_score: Option<f64>,
    pub last_score_calculation: Option<DateTime<Utc>>,
}

/// Dimension catalog row. Inactive rows are ignored by scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionCatalogEntry {
    pub key: String,
    pub display_name: String,
    pub weight: f64,
    pub order_index: u32,
    pub is_active: bool,
}

impl DimensionCatalogEntry {
    pub fn definition(&self) -> DimensionDefinition {
        DimensionDefinition {
            key: self.key.clone(),
            display_name: self.display_name.clone(),
            weight: self.weight,
        }
    }
}

/// Question as stored in the questionnaire; severity may be unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub section_id: String,
    pub text: String,
    pub dimension_key: Option<String>,
    pub severity: Option<f64>,
    pub persona: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub question_id: String,
    pub coverage: Option<f64>,
}

/// What-if coverage for one question. `coverage_level` wins over `coverage` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageOverride {
    pub question_id: String,
    #[serde(default)]
    pub coverage_level: Option<CoverageLevel>,
    #[serde(default)]
    pub coverage: Option<f64>,
}

/// Direction of the score relative to the previously persisted calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrend {
    First,
    Up,
    Down,
    Stable,
}

impl ScoreTrend {
    /// Movements within this many points either way count as stable.
    pub const TOLERANCE: f64 = 0.5;

    pub fn between(previous: Option<f64>, current: f64) -> Self {
        match previous {
            None => Self::First,
            Some(previous) if current > previous + Self::TOLERANCE => Self::Up,
            Some(previous) if current < previous - Self::TOLERANCE => Self::Down,
            Some(_) => Self::Stable,
        }
    }
}
