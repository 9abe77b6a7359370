use crate::cli::ServeArgs;
use crate::infra::{
    seed_students, AppState, InMemoryAuditLog, InMemoryDriveRepository, InMemoryProfileStore,
};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement_match::config::{AppConfig, ScoringConfig};
use placement_match::error::AppError;
use placement_match::matching::{
    DisabledScoringService, HttpScoringClient, PlacementMatchingService, ScoringService,
};
use placement_match::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let drives = Arc::new(InMemoryDriveRepository::default());
    let profiles = Arc::new(InMemoryProfileStore::seeded(seed_students()));
    let audit = Arc::new(InMemoryAuditLog::default());
    let matching_service = Arc::new(PlacementMatchingService::new(
        drives,
        profiles,
        audit,
        scoring_backend(&config.scoring),
        &config.scoring,
    ));

    let app = with_matching_routes(matching_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        scoring_url = %config.scoring.service_url,
        rerank_policy = ?config.scoring.rerank_policy,
        "placement matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// HTTP scoring client, or a disabled backend when the client cannot be built.
pub(crate) fn scoring_backend(config: &ScoringConfig) -> Arc<dyn ScoringService> {
    match HttpScoringClient::new(&config.service_url, config.timeout) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            warn!(error = %err, "scoring client unavailable; ranking will use local fallback");
            Arc::new(DisabledScoringService)
        }
    }
}
