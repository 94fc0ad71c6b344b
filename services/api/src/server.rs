use crate::cli::ServeArgs;
use crate::infra::{open_directory, open_store, AppState};
use crate::routes::with_scout_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use candidate_scout::config::AppConfig;
use candidate_scout::error::AppError;
use candidate_scout::telemetry;
use candidate_scout::workflows::candidates::{
    CandidateDirectory, CandidateScoutService, KeyValueSlot,
};
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

    let directory = open_directory(&config.directory)?;
    let store = open_store(&config.storage);
    let service = Arc::new(CandidateScoutService::new(
        directory,
        store,
        config.triage,
    )?);

    let app = scout_app(service, app_state).await.layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.storage.data_dir.display(),
        "candidate scout ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Load the first candidate, then mount the scout routes.
pub(crate) async fn scout_app<D, S>(
    service: Arc<CandidateScoutService<D, S>>,
    app_state: AppState,
) -> axum::Router
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    let triage = service.activate().await;
    info!(status = triage.status, "triage session activated");

    with_scout_routes(service).layer(Extension(app_state))
}
