use chrono::{DateTime, Utc};

use super::domain::{
    DimensionCatalogEntry, QuestionRecord, QuestionnaireId, ResponseRecord, SessionId,
    SessionRecord,
};

/// Storage abstraction so the readiness service can be exercised in isolation.
pub trait ReadinessRepository: Send + Sync {
    fn fetch_session(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError>;
    /// Every catalog row, active or not, in storage order.
    fn dimension_catalog(&self) -> Result<Vec<DimensionCatalogEntry>, RepositoryError>;
    fn questionnaire_questions(
        &self,
        questionnaire: &QuestionnaireId,
    ) -> Result<Vec<QuestionRecord>, RepositoryError>;
    fn section_count(&self, questionnaire: &QuestionnaireId) -> Result<usize, RepositoryError>;
    fn session_responses(&self, id: &SessionId) -> Result<Vec<ResponseRecord>, RepositoryError>;
    /// Overwrites the stored score unconditionally.
    fn record_score(
        &self,
        id: &SessionId,
        score: f64,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
