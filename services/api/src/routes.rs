use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use quiz2biz::error::AppError;
use quiz2biz::readiness::{readiness_router, ReadinessRepository, ReadinessService};
use quiz2biz::scoring::{
    round_to, DimensionDefinition, QuestionScore, ReadinessAssessment, ScoringEngine,
    DEFAULT_NEXT_ACTION_LIMIT, DEFAULT_SEVERITY,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Question as accepted by the stateless endpoint; only `id` is required.
#[derive(Debug, Deserialize)]
pub(crate) struct AssessQuestion {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) dimension_key: Option<String>,
    #[serde(default)]
    pub(crate) severity: Option<f64>,
    #[serde(default)]
    pub(crate) coverage: Option<f64>,
    #[serde(default)]
    pub(crate) is_answered: bool,
    #[serde(default)]
    pub(crate) persona: Option<String>,
}

impl From<AssessQuestion> for QuestionScore {
    fn from(value: AssessQuestion) -> Self {
        QuestionScore {
            id: value.id,
            text: value.text,
            dimension_key: value.dimension_key,
            severity: value.severity.unwrap_or(DEFAULT_SEVERITY),
            coverage: value.coverage.unwrap_or(0.0),
            is_answered: value.is_answered,
            persona: value.persona,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessRequest {
    pub(crate) dimensions: Vec<DimensionDefinition>,
    #[serde(default)]
    pub(crate) questions: Vec<AssessQuestion>,
    #[serde(default)]
    pub(crate) next_action_limit: Option<usize>,
}

pub(crate) fn with_readiness_routes<R>(service: Arc<ReadinessService<R>>) -> axum::Router
where
    R: ReadinessRepository + 'static,
{
    readiness_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/scoring/assess",
            axum::routing::post(assess_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Scores an ad-hoc question set without touching storage.
pub(crate) async fn assess_endpoint(
    Json(payload): Json<AssessRequest>,
) -> Result<Json<ReadinessAssessment>, AppError> {
    let AssessRequest {
        dimensions,
        questions,
        next_action_limit,
    } = payload;

    let questions: Vec<QuestionScore> = questions.into_iter().map(QuestionScore::from).collect();
    for question in &questions {
        question.validate()?;
    }

    let engine = ScoringEngine::new(next_action_limit.unwrap_or(DEFAULT_NEXT_ACTION_LIMIT));
    let mut assessment = engine.assess(&dimensions, &questions);
    assessment.score = round_to(assessment.score, 2);

    Ok(Json(assessment))
}
