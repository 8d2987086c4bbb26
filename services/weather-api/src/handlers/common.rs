//! Shared response helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use weather_common::{WeatherError, WeatherResult};

/// Problem body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
}

impl From<&WeatherError> for ErrorBody {
    fn from(err: &WeatherError) -> Self {
        Self {
            type_: err.error_code().to_string(),
            title: err.to_string(),
            status: err.http_status_code(),
        }
    }
}

pub fn error_response(err: &WeatherError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(error = %err, code = err.error_code(), "Request failed");
    } else {
        tracing::debug!(error = %err, code = err.error_code(), "Request rejected");
    }

    (status, Json(ErrorBody::from(err))).into_response()
}

/// Render a task result as JSON.
pub fn json_result<T: Serialize>(result: WeatherResult<T>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => error_response(&e),
    }
}
