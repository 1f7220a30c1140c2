use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBadgeStore};
use crate::routes::with_progression_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use giller_progression::config::AppConfig;
use giller_progression::error::AppError;
use giller_progression::progression::ProgressionService;
use giller_progression::telemetry;
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

    let policy = config.progression.policy()?;
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryBadgeStore::default());
    let progression_service = Arc::new(ProgressionService::with_standard_catalog(
        store,
        policy,
        config.progression.ledger,
    ));

    let app = with_progression_routes(progression_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_commit_attempts = config.progression.ledger.max_commit_attempts,
        "giller progression service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
