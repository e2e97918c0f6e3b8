use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CoverageOverride, SessionId, UserId};
use super::repository::{ReadinessRepository, RepositoryError};
use super::service::{HeatmapFormat, ReadinessService, ReadinessServiceError};
use crate::scoring::SeverityBucket;

/// Header carrying the authenticated requester's id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Router builder exposing the readiness and heatmap endpoints.
pub fn readiness_router<R>(service: Arc<ReadinessService<R>>) -> Router
where
    R: ReadinessRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/sessions/:session_id/readiness",
            get(readiness_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/next-action",
            get(next_action_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/next-questions",
            get(next_questions_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/readiness-check",
            get(readiness_check_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/simulate",
            post(simulate_handler::<R>),
        )
        .route("/api/v1/heatmap/:session_id", get(heatmap_handler::<R>))
        .route(
            "/api/v1/heatmap/:session_id/summary",
            get(heatmap_summary_handler::<R>),
        )
        .route(
            "/api/v1/heatmap/:session_id/cells",
            get(heatmap_cells_handler::<R>),
        )
        .route(
            "/api/v1/heatmap/:session_id/drilldown/:dimension_key/:severity_bucket",
            get(drilldown_handler::<R>),
        )
        .route(
            "/api/v1/heatmap/:session_id/export/csv",
            get(export_csv_handler::<R>),
        )
        .route(
            "/api/v1/heatmap/:session_id/export/markdown",
            get(export_markdown_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulationRequest {
    #[serde(default)]
    pub overrides: Vec<CoverageOverride>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuestionsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CellQuery {
    pub dimension: Option<String>,
    pub severity: Option<String>,
}

fn requester(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
}

/// Resolves the requester and confirms they own the session.
fn authorized_session<R>(
    service: &ReadinessService<R>,
    headers: &HeaderMap,
    session_id: String,
) -> Result<SessionId, Response>
where
    R: ReadinessRepository + 'static,
{
    let user_id = requester(headers).ok_or_else(|| {
        let payload = json!({
            "error": format!("missing {USER_ID_HEADER} header"),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
    })?;

    let session_id = SessionId(session_id);
    service
        .authorize(&session_id, &user_id)
        .map_err(error_response)?;
    Ok(session_id)
}

/// HTTP status for a service error; shared with [`crate::AppError`].
pub(crate) fn status_for(error: &ReadinessServiceError) -> StatusCode {
    match error {
        ReadinessServiceError::NotFound(_)
        | ReadinessServiceError::CellNotFound { .. }
        | ReadinessServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReadinessServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ReadinessServiceError::InvalidOverride { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ReadinessServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ReadinessServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: ReadinessServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

fn unprocessable(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn json_or_error<T>(result: Result<T, ReadinessServiceError>) -> Response
where
    T: serde::Serialize,
{
    match result {
        Ok(value) => (StatusCode::OK, axum::Json(value)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn readiness_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.calculate_readiness(&session_id)),
        Err(response) => response,
    }
}

pub(crate) async fn next_action_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.next_action(&session_id)),
        Err(response) => response,
    }
}

pub(crate) async fn next_questions_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    Query(query): Query<NextQuestionsQuery>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.next_questions(&session_id, query.limit)),
        Err(response) => response,
    }
}

pub(crate) async fn readiness_check_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.readiness_check(&session_id)),
        Err(response) => response,
    }
}

pub(crate) async fn simulate_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SimulationRequest>,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.simulate(&session_id, &request.overrides)),
        Err(response) => response,
    }
}

pub(crate) async fn heatmap_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.heatmap(&session_id)),
        Err(response) => response,
    }
}

pub(crate) async fn heatmap_summary_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => json_or_error(service.heatmap_summary(&session_id)),
        Err(response) => response,
    }
}

pub(crate) async fn heatmap_cells_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    Query(query): Query<CellQuery>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    let session_id = match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => session_id,
        Err(response) => return response,
    };

    let severity = query
        .severity
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let bucket = match severity.map(str::parse::<SeverityBucket>) {
        Some(Ok(bucket)) => Some(bucket),
        Some(Err(error)) => return unprocessable(error.to_string()),
        None => None,
    };

    json_or_error(service.heatmap_cells(&session_id, query.dimension.as_deref(), bucket))
}

pub(crate) async fn drilldown_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path((session_id, dimension_key, severity_bucket)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    let session_id = match authorized_session(&service, &headers, session_id) {
        Ok(session_id) => session_id,
        Err(response) => return response,
    };

    match severity_bucket.parse::<SeverityBucket>() {
        Ok(bucket) => json_or_error(service.drilldown(&session_id, &dimension_key, bucket)),
        Err(error) => unprocessable(error.to_string()),
    }
}

pub(crate) async fn export_csv_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    export_response(&service, &headers, session_id, HeatmapFormat::Csv)
}

pub(crate) async fn export_markdown_handler<R>(
    State(service): State<Arc<ReadinessService<R>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    export_response(&service, &headers, session_id, HeatmapFormat::Markdown)
}

fn export_response<R>(
    service: &ReadinessService<R>,
    headers: &HeaderMap,
    session_id: String,
    format: HeatmapFormat,
) -> Response
where
    R: ReadinessRepository + 'static,
{
    let session_id = match authorized_session(service, headers, session_id) {
        Ok(session_id) => session_id,
        Err(response) => return response,
    };

    match service.export_heatmap(&session_id, format) {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"heatmap-{}.{}\"",
                session_id,
                format.extension()
            );
            let headers = [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ];
            (StatusCode::OK, headers, body).into_response()
        }
        Err(error) => error_response(error),
    }
}
