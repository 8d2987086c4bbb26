//! Error types for the airport weather services.

use thiserror::Error;

/// Result type alias using WeatherError.
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Primary error type for weather store operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    // === Lookup Errors ===
    #[error("Airport not found: {0}")]
    AirportNotFound(String),

    #[error("Index {index} out of range for {len} airports")]
    IndexOutOfRange { index: i64, len: usize },

    // === Validation Errors ===
    #[error("Unknown point type: {0}")]
    UnknownPointType(String),

    #[error("{kind} mean {mean} outside accepted range {range}")]
    ValidationFailure {
        kind: String,
        mean: f64,
        range: String,
    },

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Catalog Errors ===
    #[error("Catalog I/O failure: {0}")]
    Io(String),

    // === Dispatch Errors ===
    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Task did not complete within {0} ms")]
    TaskTimeout(u64),

    #[error("Task cancelled: service is shutting down")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl WeatherError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            WeatherError::AirportNotFound(_) => "AirportNotFound",
            WeatherError::IndexOutOfRange { .. } => "IndexOutOfRange",
            WeatherError::UnknownPointType(_) => "UnknownPointType",
            WeatherError::ValidationFailure { .. } => "ValidationFailure",
            WeatherError::InvalidRadius(_) => "InvalidRadius",
            WeatherError::InvalidParameter { .. } => "InvalidParameterValue",
            WeatherError::Io(_) => "IOFailure",
            WeatherError::TaskFailed(_) => "TaskFailed",
            WeatherError::TaskTimeout(_) => "TaskTimeout",
            WeatherError::Cancelled => "Cancelled",
            WeatherError::Internal(_) => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WeatherError::UnknownPointType(_)
            | WeatherError::ValidationFailure { .. }
            | WeatherError::InvalidRadius(_)
            | WeatherError::InvalidParameter { .. } => 400,

            WeatherError::AirportNotFound(_) | WeatherError::IndexOutOfRange { .. } => 404,

            WeatherError::Cancelled => 503,
            WeatherError::TaskTimeout(_) => 504,

            _ => 500,
        }
    }

    /// Shorthand for an invalid parameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        WeatherError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for WeatherError {
    fn from(err: std::io::Error) -> Self {
        WeatherError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Internal(format!("JSON error: {}", err))
    }
}
