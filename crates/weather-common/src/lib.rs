//! Common types and utilities shared across the airport weather services.

pub mod airport;
pub mod error;

pub use airport::AirportRecord;
pub use error::{WeatherError, WeatherResult};
