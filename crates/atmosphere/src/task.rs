//! Units of work run by the dispatcher.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use weather_common::{AirportRecord, WeatherResult};

use crate::frequency::HealthSnapshot;
use crate::observation::ObservationPoint;
use crate::record::AtmosphericRecord;
use crate::service::AtmosphereService;

/// One inbound operation with its plain parameters.
#[derive(Debug, Clone)]
pub enum Task {
    QueryWeather {
        iata: String,
        radius: Option<String>,
    },
    UpdateWeather {
        iata: String,
        point_type: String,
        point: ObservationPoint,
    },
    AddAirport {
        iata: String,
        latitude: String,
        longitude: String,
    },
    RemoveAirport {
        iata: String,
    },
    ListAirports,
    GetAirport {
        iata: String,
    },
    HealthCheck,
    Reset,
}

/// Typed result of a finished task.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Weather(Vec<AtmosphericRecord>),
    Updated,
    Airport(AirportRecord),
    MaybeAirport(Option<AirportRecord>),
    Codes(BTreeSet<String>),
    Health(HealthSnapshot),
    Reset { airports: usize },
}

/// Task lifecycle: `Submitted -> Running -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Submitted,
    Running,
    Completed,
    Failed,
}

impl Task {
    /// Stable name used in logs, metrics and the ledger.
    pub fn operation(&self) -> &'static str {
        match self {
            Task::QueryWeather { .. } => "query-weather",
            Task::UpdateWeather { .. } => "update-weather",
            Task::AddAirport { .. } => "add-airport",
            Task::RemoveAirport { .. } => "remove-airport",
            Task::ListAirports => "list-airports",
            Task::GetAirport { .. } => "get-airport",
            Task::HealthCheck => "health-check",
            Task::Reset => "reset",
        }
    }

    pub async fn execute(self, service: &AtmosphereService) -> WeatherResult<TaskOutput> {
        let output = match self {
            Task::QueryWeather { iata, radius } => {
                TaskOutput::Weather(service.weather(&iata, radius.as_deref()).await?)
            }
            Task::UpdateWeather {
                iata,
                point_type,
                point,
            } => {
                service.update_weather(&iata, &point_type, point).await?;
                TaskOutput::Updated
            }
            Task::AddAirport {
                iata,
                latitude,
                longitude,
            } => TaskOutput::Airport(service.add_airport(&iata, &latitude, &longitude).await?),
            Task::RemoveAirport { iata } => {
                TaskOutput::Airport(service.delete_airport(&iata).await?)
            }
            Task::ListAirports => TaskOutput::Codes(service.airport_codes().await),
            Task::GetAirport { iata } => TaskOutput::MaybeAirport(service.airport(&iata).await),
            Task::HealthCheck => TaskOutput::Health(service.ping().await),
            Task::Reset => TaskOutput::Reset {
                airports: service.reset().await,
            },
        };
        Ok(output)
    }
}
