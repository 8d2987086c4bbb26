//! Health, metrics and status handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use atmosphere::LedgerStatus;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub airports: usize,
    pub catalog_stale: bool,
    pub available_workers: usize,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub pool_size: usize,
    pub available_workers: usize,
    pub shutting_down: bool,
    pub tasks: LedgerStatus,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check (catalog loaded, dispatcher accepting work)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let service = state.dispatcher.service();
    let airports = service.airport_count().await;

    let response = ReadyResponse {
        ready: airports > 0 && !state.dispatcher.is_shut_down(),
        airports,
        catalog_stale: service.is_stale().await,
        available_workers: state.dispatcher.available_workers(),
    };

    let status = if response.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response)).into_response()
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

/// GET /status - Active and recently finished tasks
pub async fn status_handler(Extension(state): Extension<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        pool_size: state.config.pool_size,
        available_workers: state.dispatcher.available_workers(),
        shutting_down: state.dispatcher.is_shut_down(),
        tasks: state.dispatcher.ledger().status().await,
    })
}
