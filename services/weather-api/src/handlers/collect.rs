//! `/collect` handlers: ingestion of observations and catalog maintenance.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use atmosphere::ObservationPoint;
use weather_common::WeatherError;

use crate::handlers::common::{error_response, json_result};
use crate::state::AppState;

/// GET /collect/ping - Liveness of the collection surface
pub async fn ping_handler() -> Json<&'static str> {
    Json("ready")
}

/// POST /collect/weather/:iata/:point_type - Store one observation point
///
/// The body is the point as JSON, e.g.
/// `{"mean": 22.0, "first": 10, "second": 20, "third": 30, "count": 10}`.
pub async fn update_weather_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((iata, point_type)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let point: ObservationPoint = match serde_json::from_slice(&body) {
        Ok(point) => point,
        Err(e) => return error_response(&WeatherError::invalid_parameter("body", e.to_string())),
    };

    match state
        .dispatcher
        .update_weather(&iata, &point_type, point)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /collect/airports - All known airport codes
pub async fn list_airports_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    json_result(state.dispatcher.list_airport_codes().await)
}

/// GET /collect/airport/:iata - Airport metadata
pub async fn get_airport_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(iata): Path<String>,
) -> Response {
    match state.dispatcher.get_airport(&iata).await {
        Ok(Some(airport)) => Json(airport).into_response(),
        Ok(None) => error_response(&WeatherError::AirportNotFound(iata)),
        Err(e) => error_response(&e),
    }
}

/// POST /collect/airport/:iata/:lat/:long - Add or move an airport
pub async fn add_airport_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((iata, latitude, longitude)): Path<(String, String, String)>,
) -> Response {
    json_result(
        state
            .dispatcher
            .add_airport(&iata, &latitude, &longitude)
            .await,
    )
}

/// DELETE /collect/airport/:iata - Remove an airport
pub async fn delete_airport_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(iata): Path<String>,
) -> Response {
    json_result(state.dispatcher.delete_airport(&iata).await)
}

/// GET /collect/exit - Stop accepting work and shut the server down
pub async fn exit_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    info!("Shutdown requested over HTTP");
    state.dispatcher.shutdown();
    (StatusCode::OK, Json("shutting down")).into_response()
}
