use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use quiz2biz::catalog::standard_dimensions;
use quiz2biz::readiness::{
    DimensionCatalogEntry, QuestionRecord, QuestionnaireId, ReadinessRepository, RepositoryError,
    ResponseRecord, SessionId, SessionRecord, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

pub(crate) const DEMO_SESSION_ID: &str = "session-demo";
pub(crate) const DEMO_USER_ID: &str = "user-demo";
const DEMO_QUESTIONNAIRE_ID: &str = "questionnaire-readiness-v1";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Default)]
struct Store {
    sessions: HashMap<SessionId, SessionRecord>,
    catalog: Vec<DimensionCatalogEntry>,
    questions: HashMap<QuestionnaireId, Vec<QuestionRecord>>,
    responses: HashMap<SessionId, Vec<ResponseRecord>>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReadinessRepository {
    store: Arc<RwLock<Store>>,
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

impl InMemoryReadinessRepository {
    /// Standard catalog plus one partially answered demo session.
    pub(crate) fn seeded() -> Self {
        let questionnaire = QuestionnaireId(DEMO_QUESTIONNAIRE_ID.to_string());
        let session_id = SessionId(DEMO_SESSION_ID.to_string());

        let mut store = Store {
            catalog: standard_dimensions(),
            ..Store::default()
        };
        store
            .questions
            .insert(questionnaire.clone(), demo_questions());
        store.responses.insert(session_id.clone(), demo_responses());
        store.sessions.insert(
            session_id.clone(),
            SessionRecord {
                id: session_id,
                user_id: UserId(DEMO_USER_ID.to_string()),
                questionnaire_id: questionnaire,
                readiness_score: None,
                last_score_calculation: None,
            },
        );

        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

impl ReadinessRepository for InMemoryReadinessRepository {
    fn fetch_session(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let guard = self.store.read().map_err(|_| poisoned())?;
        Ok(guard.sessions.get(id).cloned())
    }

    fn dimension_catalog(&self) -> Result<Vec<DimensionCatalogEntry>, RepositoryError> {
        let guard = self.store.read().map_err(|_| poisoned())?;
        Ok(guard.catalog.clone())
    }

    fn questionnaire_questions(
        &self,
        questionnaire: &QuestionnaireId,
    ) -> Result<Vec<QuestionRecord>, RepositoryError> {
        let guard = self.store.read().map_err(|_| poisoned())?;
        Ok(guard
            .questions
            .get(questionnaire)
            .cloned()
            .unwrap_or_default())
    }

    fn section_count(&self, questionnaire: &QuestionnaireId) -> Result<usize, RepositoryError> {
        let guard = self.store.read().map_err(|_| poisoned())?;
        let mut sections: Vec<&str> = guard
            .questions
            .get(questionnaire)
            .map(|questions| {
                questions
                    .iter()
                    .map(|question| question.section_id.as_str())
                    .collect()
            })
            .unwrap_or_default();
        sections.sort_unstable();
        sections.dedup();
        Ok(sections.len())
    }

    fn session_responses(&self, id: &SessionId) -> Result<Vec<ResponseRecord>, RepositoryError> {
        let guard = self.store.read().map_err(|_| poisoned())?;
        Ok(guard.responses.get(id).cloned().unwrap_or_default())
    }

    fn record_score(
        &self,
        id: &SessionId,
        score: f64,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.store.write().map_err(|_| poisoned())?;
        let session = guard.sessions.get_mut(id).ok_or(RepositoryError::NotFound)?;
        session.readiness_score = Some(score);
        session.last_score_calculation = Some(calculated_at);
        Ok(())
    }
}

fn demo_questions() -> Vec<QuestionRecord> {
    [
        ("q-arch-001", "security", "arch_sec", "Does your system architecture implement defense-in-depth security controls?", 0.95, "CTO"),
        ("q-arch-002", "security", "arch_sec", "Is all data encrypted at rest and in transit?", 0.90, "CTO"),
        ("q-arch-003", "security", "arch_sec", "Do you have a documented threat model for your application?", 0.85, "CTO"),
        ("q-devops-001", "delivery", "devops_iac", "Do you have automated CI/CD pipelines for all environments?", 0.85, "CTO"),
        ("q-devops-002", "delivery", "devops_iac", "Is your infrastructure defined as code (IaC)?", 0.80, "CTO"),
        ("q-quality-001", "delivery", "quality_test", "What is your current unit test coverage?", 0.80, "CTO"),
        ("q-quality-004", "delivery", "quality_test", "Is accessibility testing part of your quality process?", 0.65, "BA"),
        ("q-finance-001", "business", "finance", "Do you have a documented project budget with tracking?", 0.80, "CFO"),
        ("q-finance-002", "business", "finance", "Have you calculated the total cost of ownership (TCO)?", 0.75, "CFO"),
        ("q-strategy-001", "business", "strategy", "Is there a clear product vision and roadmap?", 0.75, "CEO"),
        ("q-req-001", "business", "requirements", "Are user stories documented with acceptance criteria?", 0.78, "BA"),
        ("q-data-001", "operations", "data_ai", "Is your data architecture documented?", 0.75, "CTO"),
        ("q-privacy-001", "governance", "privacy_legal", "Is your application GDPR/privacy compliant?", 0.90, "POLICY"),
        ("q-ops-001", "operations", "service_ops", "Do you have monitoring and alerting in place?", 0.85, "CTO"),
        ("q-compliance-002", "governance", "compliance_policy", "Do you have audit logging for compliance?", 0.82, "POLICY"),
        ("q-people-001", "governance", "people_change", "Is there a training plan for the team?", 0.65, "CEO"),
    ]
    .into_iter()
    .map(|(id, section, dimension, text, severity, persona)| QuestionRecord {
        id: id.to_string(),
        section_id: section.to_string(),
        text: text.to_string(),
        dimension_key: Some(dimension.to_string()),
        severity: Some(severity),
        persona: Some(persona.to_string()),
    })
    .collect()
}

fn demo_responses() -> Vec<ResponseRecord> {
    [
        ("q-arch-001", Some(0.5)),
        ("q-arch-002", Some(1.0)),
        ("q-devops-001", Some(0.75)),
        ("q-devops-002", Some(0.25)),
        ("q-quality-001", Some(0.5)),
        ("q-finance-001", Some(1.0)),
        ("q-strategy-001", Some(0.75)),
        ("q-req-001", None),
        ("q-ops-001", Some(1.0)),
    ]
    .into_iter()
    .map(|(question_id, coverage)| ResponseRecord {
        question_id: question_id.to_string(),
        coverage,
    })
    .collect()
}
