use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPopulationRepository};
use crate::routes::with_population_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use va_ratings::config::AppConfig;
use va_ratings::disability::population::VeteranPopulationService;
use va_ratings::error::AppError;
use va_ratings::telemetry;

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

    let repository = Arc::new(InMemoryPopulationRepository::default());
    let population_service = Arc::new(VeteranPopulationService::new(
        repository,
        config.population.settings(),
    ));

    let app = with_population_routes(population_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        seed = config.population.seed,
        batch_size = config.population.batch_size,
        "va ratings service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
