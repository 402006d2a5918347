//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, logging};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Gateway authenticates during the handshake
        .route("/gateway", get(ws_handler))
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(logging::track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                String::new(),
            )
        }
    }
}

/// API v1 routes (all protected)
///
/// `GET /applications/{id}` and `GET /applications/{id}/messages` take
/// `?order=newest_first|oldest_first`; newest first when omitted.
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(application_routes())
        .route(
            "/jobs/{job_id}/applications",
            get(handlers::application::list_for_job),
        )
        .route(
            "/interviews/{interview_id}",
            patch(handlers::interview::update_interview),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", post(handlers::application::apply))
        .route("/applications/mine", get(handlers::application::list_mine))
        .route(
            "/applications/received",
            get(handlers::application::list_received),
        )
        .route("/applications/{id}", get(handlers::application::get_application))
        .route(
            "/applications/{id}/status",
            patch(handlers::application::set_status),
        )
        .route(
            "/applications/{id}/interview",
            post(handlers::interview::schedule),
        )
        .route(
            "/applications/{id}/messages",
            get(handlers::message::list_thread).post(handlers::message::send_message),
        )
        .route(
            "/applications/{id}/messages/read",
            post(handlers::message::mark_read),
        )
}
