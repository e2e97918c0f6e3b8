use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{
    CoverageOverride, DimensionCatalogEntry, QuestionRecord, ScoreTrend, SessionId,
    SessionRecord, UserId,
};
use super::repository::{ReadinessRepository, RepositoryError};
use crate::config::ScoringConfig;
use crate::scoring::{
    drilldown, filter_cells, heatmap_to_csv, heatmap_to_markdown, max_potential_score,
    prioritize_questions, round_to, CoverageLevel, DimensionDefinition, DimensionResult,
    HeatmapCell, HeatmapDrilldown, HeatmapExportError, HeatmapSummary, NextAction,
    PrioritizedQuestion, QuestionScore, ReadinessAssessment, ScoringEngine, SeverityBucket,
    DEFAULT_NEXT_QUESTION_LIMIT, DEFAULT_SEVERITY, TARGET_SCORE,
};

/// Service loading session state from the repository and running it through the engine.
pub struct ReadinessService<R> {
    repository: Arc<R>,
    engine: ScoringEngine,
    next_question_limit: usize,
}

/// Everything the engine needs for one session, loaded in a single pass.
struct SessionSnapshot {
    session: SessionRecord,
    dimensions: Vec<DimensionDefinition>,
    questions: Vec<QuestionRecord>,
    coverage: HashMap<String, Option<f64>>,
    section_count: usize,
}

impl SessionSnapshot {
    fn question_scores(&self, overrides: &HashMap<String, f64>) -> Vec<QuestionScore> {
        self.questions
            .iter()
            .map(|question| {
                let response = self.coverage.get(&question.id);
                let (coverage, is_answered) = match overrides.get(&question.id) {
                    Some(coverage) => (*coverage, true),
                    None => (
                        response.copied().flatten().unwrap_or(0.0),
                        response.is_some(),
                    ),
                };

                QuestionScore {
                    id: question.id.clone(),
                    text: question.text.clone(),
                    dimension_key: question.dimension_key.clone(),
                    severity: question.severity.unwrap_or(DEFAULT_SEVERITY),
                    coverage,
                    is_answered,
                    persona: question.persona.clone(),
                }
            })
            .collect()
    }

    fn progress(&self) -> ReadinessProgress {
        let total_questions = self.questions.len();
        let answered: Vec<&QuestionRecord> = self
            .questions
            .iter()
            .filter(|question| self.coverage.contains_key(&question.id))
            .collect();
        let answered_sections: HashSet<&str> = answered
            .iter()
            .map(|question| question.section_id.as_str())
            .collect();

        let percentage = if total_questions > 0 {
            (answered.len() as f64 / total_questions as f64 * 100.0).round() as u32
        } else {
            0
        };

        ReadinessProgress {
            total_questions,
            answered_questions: answered.len(),
            percentage,
            sections_remaining: self.section_count.saturating_sub(answered_sections.len()),
        }
    }
}

impl<R> ReadinessService<R>
where
    R: ReadinessRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ScoringConfig) -> Self {
        Self {
            repository,
            engine: ScoringEngine::new(config.next_action_limit),
            next_question_limit: config.next_question_limit,
        }
    }

    pub fn with_engine(repository: Arc<R>, engine: ScoringEngine) -> Self {
        Self {
            repository,
            engine,
            next_question_limit: DEFAULT_NEXT_QUESTION_LIMIT,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Scores the session, persists the raw score, and returns the rounded view.
    pub fn calculate_readiness(
        &self,
        session_id: &SessionId,
    ) -> Result<ReadinessResponse, ReadinessServiceError> {
        let started = Instant::now();
        let snapshot = self.load(session_id)?;
        let questions = snapshot.question_scores(&HashMap::new());
        let assessment = self.assess(&snapshot, &questions);
        let calculated_at = Utc::now();

        self.repository
            .record_score(session_id, assessment.score, calculated_at)?;

        info!(
            session_id = %session_id,
            score = assessment.score,
            elapsed_ms = (started.elapsed().as_millis() as u64),
            "readiness score calculated"
        );

        Ok(ReadinessResponse::build(&snapshot, assessment, calculated_at))
    }

    /// Loads the session and checks that `user_id` owns it.
    pub fn authorize(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<SessionRecord, ReadinessServiceError> {
        let session = self
            .repository
            .fetch_session(session_id)?
            .ok_or_else(|| ReadinessServiceError::NotFound(session_id.clone()))?;

        if &session.user_id != user_id {
            return Err(ReadinessServiceError::Forbidden(session_id.clone()));
        }

        Ok(session)
    }

    pub fn next_action(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<NextAction>, ReadinessServiceError> {
        let (_, assessment) = self.evaluate(session_id, &HashMap::new())?;
        Ok(assessment.next_actions.into_iter().next())
    }

    /// Questions ranked by coverage-adjusted lift. `limit` falls back to the configured size.
    pub fn next_questions(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> Result<NextQuestionsResponse, ReadinessServiceError> {
        let snapshot = self.load(session_id)?;
        let questions = snapshot.question_scores(&HashMap::new());
        let assessment = self.assess(&snapshot, &questions);

        let ranked = prioritize_questions(
            &assessment.dimension_results,
            &questions,
            limit.unwrap_or(self.next_question_limit),
        );
        let current_score = round_to(assessment.score, 2);

        Ok(NextQuestionsResponse {
            session_id: session_id.clone(),
            current_score,
            max_potential_score: max_potential_score(current_score, &ranked),
            questions: ranked,
        })
    }

    pub fn readiness_check(
        &self,
        session_id: &SessionId,
    ) -> Result<ThresholdCheck, ReadinessServiceError> {
        let (_, assessment) = self.evaluate(session_id, &HashMap::new())?;
        Ok(ThresholdCheck {
            meets_threshold: assessment.meets_threshold,
            score: round_to(assessment.score, 2),
            threshold: TARGET_SCORE,
        })
    }

    /// What-if scoring with coverage overrides. Nothing is persisted.
    pub fn simulate(
        &self,
        session_id: &SessionId,
        overrides: &[CoverageOverride],
    ) -> Result<ReadinessResponse, ReadinessServiceError> {
        let overrides = resolve_overrides(overrides)?;
        let (snapshot, assessment) = self.evaluate(session_id, &overrides)?;

        debug!(
            session_id = %session_id,
            overrides = overrides.len(),
            score = assessment.score,
            "simulated readiness score"
        );

        Ok(ReadinessResponse::build(&snapshot, assessment, Utc::now()))
    }

    pub fn heatmap(&self, session_id: &SessionId) -> Result<HeatmapReport, ReadinessServiceError> {
        let (snapshot, assessment) = self.evaluate(session_id, &HashMap::new())?;
        let summary = assessment.heatmap_summary();

        Ok(HeatmapReport {
            session_id: session_id.clone(),
            dimensions: snapshot
                .dimensions
                .iter()
                .map(|dimension| dimension.key.clone())
                .collect(),
            severity_buckets: SeverityBucket::ordered().to_vec(),
            cells: assessment.heatmap_cells,
            summary,
            generated_at: Utc::now(),
        })
    }

    pub fn heatmap_summary(
        &self,
        session_id: &SessionId,
    ) -> Result<HeatmapSummary, ReadinessServiceError> {
        let (_, assessment) = self.evaluate(session_id, &HashMap::new())?;
        Ok(assessment.heatmap_summary())
    }

    pub fn heatmap_cells(
        &self,
        session_id: &SessionId,
        dimension: Option<&str>,
        bucket: Option<SeverityBucket>,
    ) -> Result<Vec<HeatmapCell>, ReadinessServiceError> {
        let (_, assessment) = self.evaluate(session_id, &HashMap::new())?;
        Ok(filter_cells(&assessment.heatmap_cells, dimension, bucket))
    }

    pub fn drilldown(
        &self,
        session_id: &SessionId,
        dimension_key: &str,
        bucket: SeverityBucket,
    ) -> Result<HeatmapDrilldown, ReadinessServiceError> {
        let snapshot = self.load(session_id)?;
        let questions = snapshot.question_scores(&HashMap::new());
        let assessment = self.assess(&snapshot, &questions);

        drilldown(
            &assessment.dimension_results,
            &questions,
            dimension_key,
            bucket,
        )
        .ok_or_else(|| ReadinessServiceError::CellNotFound {
            dimension: dimension_key.to_string(),
            bucket,
        })
    }

    pub fn export_heatmap(
        &self,
        session_id: &SessionId,
        format: HeatmapFormat,
    ) -> Result<String, ReadinessServiceError> {
        let (_, assessment) = self.evaluate(session_id, &HashMap::new())?;

        let body = match format {
            HeatmapFormat::Csv => {
                heatmap_to_csv(&assessment.dimension_results, &assessment.heatmap_cells)?
            }
            HeatmapFormat::Markdown => heatmap_to_markdown(
                &session_id.0,
                &assessment.dimension_results,
                &assessment.heatmap_cells,
                Utc::now(),
            ),
        };

        Ok(body)
    }

    /// Scores each session in turn. Failures are logged and left out of the result.
    pub fn calculate_batch(&self, session_ids: &[SessionId]) -> Vec<ReadinessResponse> {
        session_ids
            .iter()
            .filter_map(|session_id| match self.calculate_readiness(session_id) {
                Ok(response) => Some(response),
                Err(error) => {
                    warn!(session_id = %session_id, %error, "skipping session in batch scoring");
                    None
                }
            })
            .collect()
    }

    fn evaluate(
        &self,
        session_id: &SessionId,
        overrides: &HashMap<String, f64>,
    ) -> Result<(SessionSnapshot, ReadinessAssessment), ReadinessServiceError> {
        let snapshot = self.load(session_id)?;
        let questions = snapshot.question_scores(overrides);
        let assessment = self.assess(&snapshot, &questions);
        Ok((snapshot, assessment))
    }

    fn assess(
        &self,
        snapshot: &SessionSnapshot,
        questions: &[QuestionScore],
    ) -> ReadinessAssessment {
        let assessment = self.engine.assess(&snapshot.dimensions, questions);

        for dimension in assessment
            .dimension_results
            .iter()
            .filter(|dimension| dimension.question_count == 0)
        {
            debug!(
                session_id = %snapshot.session.id,
                dimension = %dimension.key,
                "dimension has no questions; contributing zero residual"
            );
        }

        assessment
    }

    fn load(&self, session_id: &SessionId) -> Result<SessionSnapshot, ReadinessServiceError> {
        let session = self
            .repository
            .fetch_session(session_id)?
            .ok_or_else(|| ReadinessServiceError::NotFound(session_id.clone()))?;

        let mut catalog: Vec<DimensionCatalogEntry> = self
            .repository
            .dimension_catalog()?
            .into_iter()
            .filter(|entry| entry.is_active)
            .collect();
        catalog.sort_by_key(|entry| entry.order_index);

        let questions = self
            .repository
            .questionnaire_questions(&session.questionnaire_id)?;
        let section_count = self.repository.section_count(&session.questionnaire_id)?;

        let mut coverage = HashMap::new();
        for response in self.repository.session_responses(session_id)? {
            coverage
                .entry(response.question_id)
                .or_insert(response.coverage);
        }

        Ok(SessionSnapshot {
            session,
            dimensions: catalog
                .iter()
                .map(DimensionCatalogEntry::definition)
                .collect(),
            questions,
            coverage,
            section_count,
        })
    }
}

fn resolve_overrides(
    overrides: &[CoverageOverride],
) -> Result<HashMap<String, f64>, ReadinessServiceError> {
    overrides
        .iter()
        .map(|entry| {
            let level = match (entry.coverage_level, entry.coverage) {
                (Some(level), _) => level,
                (None, Some(value)) if value.is_finite() && (0.0..=1.0).contains(&value) => {
                    CoverageLevel::from_decimal(value)
                }
                (None, Some(value)) => {
                    return Err(ReadinessServiceError::InvalidOverride {
                        question_id: entry.question_id.clone(),
                        reason: format!("coverage {value} outside [0, 1]"),
                    })
                }
                (None, None) => {
                    return Err(ReadinessServiceError::InvalidOverride {
                        question_id: entry.question_id.clone(),
                        reason: "coverage_level or coverage is required".to_string(),
                    })
                }
            };
            Ok((entry.question_id.clone(), level.value()))
        })
        .collect()
}

/// Question and section completion for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessProgress {
    pub total_questions: usize,
    pub answered_questions: usize,
    pub percentage: u32,
    pub sections_remaining: usize,
}

/// Rounded readiness view returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub session_id: SessionId,
    pub score: f64,
    pub target_score: f64,
    pub portfolio_residual: f64,
    pub trend: ScoreTrend,
    pub residuals_by_dimension: Vec<DimensionResult>,
    pub heatmap_cells: Vec<HeatmapCell>,
    pub next_actions: Vec<NextAction>,
    pub progress: ReadinessProgress,
    pub is_complete: bool,
    pub meets_threshold: bool,
    pub calculated_at: DateTime<Utc>,
}

impl ReadinessResponse {
    fn build(
        snapshot: &SessionSnapshot,
        assessment: ReadinessAssessment,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        let progress = snapshot.progress();

        Self {
            session_id: snapshot.session.id.clone(),
            score: round_to(assessment.score, 2),
            target_score: TARGET_SCORE,
            portfolio_residual: round_to(assessment.portfolio_residual, 4),
            trend: ScoreTrend::between(snapshot.session.readiness_score, assessment.score),
            residuals_by_dimension: assessment.dimension_results,
            heatmap_cells: assessment.heatmap_cells,
            next_actions: assessment.next_actions,
            progress,
            is_complete: progress.answered_questions == progress.total_questions,
            meets_threshold: assessment.meets_threshold,
            calculated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextQuestionsResponse {
    pub session_id: SessionId,
    pub current_score: f64,
    pub questions: Vec<PrioritizedQuestion>,
    pub max_potential_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub meets_threshold: bool,
    pub score: f64,
    pub threshold: f64,
}

/// Full heatmap for a session with its axes and colour tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapReport {
    pub session_id: SessionId,
    pub cells: Vec<HeatmapCell>,
    pub dimensions: Vec<String>,
    pub severity_buckets: Vec<SeverityBucket>,
    pub summary: HeatmapSummary,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatmapFormat {
    Csv,
    Markdown,
}

impl HeatmapFormat {
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Markdown => "text/markdown",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }
}

/// Error raised by the readiness service.
#[derive(Debug, thiserror::Error)]
pub enum ReadinessServiceError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session {0} belongs to another user")]
    Forbidden(SessionId),
    #[error("invalid coverage override for question {question_id}: {reason}")]
    InvalidOverride { question_id: String, reason: String },
    #[error("no heatmap cell for dimension {dimension} at {bucket} severity")]
    CellNotFound {
        dimension: String,
        bucket: SeverityBucket,
    },
    #[error(transparent)]
    Export(#[from] HeatmapExportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
