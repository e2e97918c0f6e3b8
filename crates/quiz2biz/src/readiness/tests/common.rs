use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::readiness::domain::{
    DimensionCatalogEntry, QuestionRecord, QuestionnaireId, ResponseRecord, SessionId,
    SessionRecord, UserId,
};
use crate::readiness::repository::{ReadinessRepository, RepositoryError};
use crate::readiness::{readiness_router, ReadinessService};

pub(super) const OWNER: &str = "user-1";
pub(super) const SESSION: &str = "session-1";

/// Unrounded score of the seeded session.
pub(super) const SEEDED_SCORE: f64 = 82.108_420_827_083_79;

pub(super) fn session_id() -> SessionId {
    SessionId(SESSION.to_string())
}

pub(super) fn owner() -> UserId {
    UserId(OWNER.to_string())
}

fn catalog_entry(key: &str, name: &str, weight: f64, order_index: u32) -> DimensionCatalogEntry {
    DimensionCatalogEntry {
        key: key.to_string(),
        display_name: name.to_string(),
        weight,
        order_index,
        is_active: true,
    }
}

fn question(id: &str, section: &str, dimension: &str, severity: Option<f64>) -> QuestionRecord {
    QuestionRecord {
        id: id.to_string(),
        section_id: section.to_string(),
        text: format!("Question {id}"),
        dimension_key: Some(dimension.to_string()),
        severity,
        persona: Some("CTO".to_string()),
    }
}

fn response(question_id: &str, coverage: Option<f64>) -> ResponseRecord {
    ResponseRecord {
        question_id: question_id.to_string(),
        coverage,
    }
}

pub(super) struct MemoryRepository {
    sessions: Mutex<HashMap<SessionId, SessionRecord>>,
    catalog: Vec<DimensionCatalogEntry>,
    questions: Vec<QuestionRecord>,
    section_count: usize,
    responses: HashMap<SessionId, Vec<ResponseRecord>>,
}

impl MemoryRepository {
    /// Three sections, four questions, three responses, and one inactive dimension.
    pub(super) fn seeded() -> Self {
        let mut inactive = catalog_entry("legacy", "Legacy", 0.5, 0);
        inactive.is_active = false;

        let catalog = vec![
            catalog_entry("finance", "Finance & Cost Management", 0.10, 3),
            catalog_entry("devops_iac", "DevOps & Infrastructure as Code", 0.12, 2),
            inactive,
            catalog_entry("arch_sec", "Architecture & Security", 0.15, 1),
        ];

        let questions = vec![
            question("q1", "s1", "arch_sec", Some(0.8)),
            question("q2", "s1", "arch_sec", Some(0.6)),
            question("q3", "s2", "devops_iac", None),
            question("q4", "s2", "devops_iac", Some(0.9)),
        ];

        let mut responses = HashMap::new();
        responses.insert(
            session_id(),
            vec![
                response("q1", Some(0.5)),
                response("q2", Some(0.75)),
                response("q3", None),
                response("q1", Some(1.0)),
            ],
        );

        let mut sessions = HashMap::new();
        sessions.insert(
            session_id(),
            SessionRecord {
                id: session_id(),
                user_id: owner(),
                questionnaire_id: QuestionnaireId("qn-1".to_string()),
                readiness_score: None,
                last_score_calculation: None,
            },
        );

        Self {
            sessions: Mutex::new(sessions),
            catalog,
            questions,
            section_count: 3,
            responses,
        }
    }

    pub(super) fn stored(&self, id: &SessionId) -> Option<SessionRecord> {
        self.sessions
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn set_score(&self, id: &SessionId, score: f64) {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if let Some(session) = guard.get_mut(id) {
            session.readiness_score = Some(score);
        }
    }
}

impl ReadinessRepository for MemoryRepository {
    fn fetch_session(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn dimension_catalog(&self) -> Result<Vec<DimensionCatalogEntry>, RepositoryError> {
        Ok(self.catalog.clone())
    }

    fn questionnaire_questions(
        &self,
        _questionnaire: &QuestionnaireId,
    ) -> Result<Vec<QuestionRecord>, RepositoryError> {
        Ok(self.questions.clone())
    }

    fn section_count(&self, _questionnaire: &QuestionnaireId) -> Result<usize, RepositoryError> {
        Ok(self.section_count)
    }

    fn session_responses(&self, id: &SessionId) -> Result<Vec<ResponseRecord>, RepositoryError> {
        Ok(self.responses.get(id).cloned().unwrap_or_default())
    }

    fn record_score(
        &self,
        id: &SessionId,
        score: f64,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        session.readiness_score = Some(score);
        session.last_score_calculation = Some(calculated_at);
        Ok(())
    }
}

/// Serves sessions but fails every write.
pub(super) struct ReadOnlyRepository(pub(super) MemoryRepository);

impl ReadinessRepository for ReadOnlyRepository {
    fn fetch_session(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        self.0.fetch_session(id)
    }

    fn dimension_catalog(&self) -> Result<Vec<DimensionCatalogEntry>, RepositoryError> {
        self.0.dimension_catalog()
    }

    fn questionnaire_questions(
        &self,
        questionnaire: &QuestionnaireId,
    ) -> Result<Vec<QuestionRecord>, RepositoryError> {
        self.0.questionnaire_questions(questionnaire)
    }

    fn section_count(&self, questionnaire: &QuestionnaireId) -> Result<usize, RepositoryError> {
        self.0.section_count(questionnaire)
    }

    fn session_responses(&self, id: &SessionId) -> Result<Vec<ResponseRecord>, RepositoryError> {
        self.0.session_responses(id)
    }

    fn record_score(
        &self,
        _id: &SessionId,
        _score: f64,
        _calculated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ReadinessRepository for UnavailableRepository {
    fn fetch_session(&self, _id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn dimension_catalog(&self) -> Result<Vec<DimensionCatalogEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn questionnaire_questions(
        &self,
        _questionnaire: &QuestionnaireId,
    ) -> Result<Vec<QuestionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn section_count(&self, _questionnaire: &QuestionnaireId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn session_responses(&self, _id: &SessionId) -> Result<Vec<ResponseRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_score(
        &self,
        _id: &SessionId,
        _score: f64,
        _calculated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (ReadinessService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::seeded());
    let service = ReadinessService::new(repository.clone(), ScoringConfig::default());
    (service, repository)
}

pub(super) fn router_with_service<R>(service: ReadinessService<R>) -> axum::Router
where
    R: ReadinessRepository + 'static,
{
    readiness_router(Arc::new(service))
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
