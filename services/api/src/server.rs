use crate::cli::ServeArgs;
use crate::infra::{seed_demo_roster, AppState};
use crate::routes::with_registration_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use volunteer_hub::config::AppConfig;
use volunteer_hub::error::AppError;
use volunteer_hub::registration::{MemoryStore, RegistrationService};
use volunteer_hub::telemetry;

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

    let store = Arc::new(MemoryStore::new());
    if args.seed_demo_data {
        let today = Local::now().date_naive();
        seed_demo_roster(&store, today);
        info!(%today, "demo roster seeded");
    }
    let registration_service = Arc::new(RegistrationService::new(
        store.clone(),
        store.clone(),
        store,
    ));

    let app = with_registration_routes(registration_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "volunteer hub api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
