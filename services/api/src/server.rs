use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionStore};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cardio_risk::assessment::{scorer_from_config, AssessmentService, ReportExporter};
use cardio_risk::config::AppConfig;
use cardio_risk::error::AppError;
use cardio_risk::telemetry;
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

    let scorer = scorer_from_config(&config)?;
    let exporter = Arc::new(ReportExporter::from_config(&config.recommendation)?);
    let sessions = Arc::new(InMemorySessionStore::default());
    let assessment_service = Arc::new(AssessmentService::new(sessions, scorer, exporter));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        strategy = config.scoring.label(),
        recommendations = config.recommendation.endpoint.is_some(),
        %addr,
        "cardio risk service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
