//! `/query` handlers: read-only access for weather consumers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
};

use crate::handlers::common::json_result;
use crate::state::AppState;

/// GET /query/ping - Health and usage statistics
pub async fn ping_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    json_result(state.dispatcher.ping().await)
}

/// GET /query/weather/:iata - Records of one airport
pub async fn weather_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(iata): Path<String>,
) -> Response {
    json_result(state.dispatcher.weather(&iata, None).await)
}

/// GET /query/weather/:iata/:radius - Records within `radius` km of an airport
pub async fn weather_radius_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((iata, radius)): Path<(String, String)>,
) -> Response {
    json_result(state.dispatcher.weather(&iata, Some(radius.as_str())).await)
}
