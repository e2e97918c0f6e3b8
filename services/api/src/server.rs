use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReadinessRepository};
use crate::routes::with_readiness_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use quiz2biz::config::AppConfig;
use quiz2biz::error::AppError;
use quiz2biz::readiness::ReadinessService;
use quiz2biz::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryReadinessRepository::seeded());
    let readiness_service = Arc::new(ReadinessService::new(repository, config.scoring));

    let app = with_readiness_routes(readiness_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        %addr,
        next_action_limit = config.scoring.next_action_limit,
        next_question_limit = config.scoring.next_question_limit,
        "readiness scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
