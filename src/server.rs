//! # Server Configuration
//!
//! This module contains the server setup for the report scheduler's admin
//! API: shared state, router assembly, and the serve loop with graceful
//! shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::queue::TaskQueue;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub queue: Arc<TaskQueue>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: DatabaseConnection, queue: Arc<TaskQueue>) -> Self {
        Self {
            db,
            queue,
            http: reqwest::Client::new(),
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/datasources",
            get(handlers::datasources::list_datasources)
                .post(handlers::datasources::create_datasource),
        )
        .route(
            "/datasources/{id}",
            get(handlers::datasources::get_datasource)
                .put(handlers::datasources::update_datasource)
                .delete(handlers::datasources::delete_datasource),
        )
        .route(
            "/datasources/{id}/validate",
            post(handlers::datasources::validate_datasource),
        )
        .route(
            "/reports",
            get(handlers::reports::list_reports).post(handlers::reports::create_report),
        )
        .route(
            "/reports/{id}",
            get(handlers::reports::get_report)
                .put(handlers::reports::update_report)
                .delete(handlers::reports::delete_report),
        )
        .route(
            "/schedules",
            get(handlers::schedules::list_schedules).post(handlers::schedules::create_schedule),
        )
        .route(
            "/schedules/{id}",
            get(handlers::schedules::get_schedule)
                .put(handlers::schedules::update_schedule)
                .delete(handlers::schedules::delete_schedule),
        )
        .route(
            "/schedules/{id}/trigger",
            post(handlers::schedules::trigger_schedule),
        )
        .route("/history", get(handlers::history::list_history))
        .route(
            "/history/{log_id}/resend",
            post(handlers::history::resend_history_log),
        );

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Serve the app until the shutdown token fires, then drain gracefully.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::datasources::list_datasources,
        crate::handlers::datasources::create_datasource,
        crate::handlers::datasources::get_datasource,
        crate::handlers::datasources::update_datasource,
        crate::handlers::datasources::delete_datasource,
        crate::handlers::datasources::validate_datasource,
        crate::handlers::reports::list_reports,
        crate::handlers::reports::create_report,
        crate::handlers::reports::get_report,
        crate::handlers::reports::update_report,
        crate::handlers::reports::delete_report,
        crate::handlers::schedules::list_schedules,
        crate::handlers::schedules::create_schedule,
        crate::handlers::schedules::get_schedule,
        crate::handlers::schedules::update_schedule,
        crate::handlers::schedules::delete_schedule,
        crate::handlers::schedules::trigger_schedule,
        crate::handlers::history::list_history,
        crate::handlers::history::resend_history_log,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::ReportElement,
            crate::models::ReportElementKind,
            crate::models::Recipients,
            crate::error::ApiError,
            crate::handlers::types::DataSourceDto,
            crate::handlers::types::DataSourceRequestDto,
            crate::handlers::types::ReportDefinitionDto,
            crate::handlers::types::ReportDefinitionRequestDto,
            crate::handlers::types::ScheduleDto,
            crate::handlers::types::ScheduleRequestDto,
            crate::handlers::types::HistoryLogDto,
            crate::handlers::types::TriggerResponseDto,
            crate::handlers::types::MessageResponseDto,
        )
    ),
    info(
        title = "Report Scheduler API",
        description = "Admin API for datasources, report definitions, schedules, and execution history",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
