//! The catalog source seam.

use async_trait::async_trait;
use tokio::sync::Mutex;

use weather_common::{AirportRecord, WeatherResult};

/// Where the airport catalog lives between process restarts.
#[async_trait]
pub trait AirportSource: Send + Sync {
    /// Read the full, ordered airport list.
    async fn load(&self) -> WeatherResult<Vec<AirportRecord>>;

    /// Replace the stored airport list.
    async fn persist(&self, airports: &[AirportRecord]) -> WeatherResult<()>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

/// In-memory catalog source.
#[derive(Debug, Default)]
pub struct MemorySource {
    airports: Mutex<Vec<AirportRecord>>,
}

impl MemorySource {
    pub fn new(airports: Vec<AirportRecord>) -> Self {
        Self {
            airports: Mutex::new(airports),
        }
    }

    /// Snapshot of what has been persisted so far.
    pub async fn contents(&self) -> Vec<AirportRecord> {
        self.airports.lock().await.clone()
    }
}

#[async_trait]
impl AirportSource for MemorySource {
    async fn load(&self) -> WeatherResult<Vec<AirportRecord>> {
        Ok(self.airports.lock().await.clone())
    }

    async fn persist(&self, airports: &[AirportRecord]) -> WeatherResult<()> {
        *self.airports.lock().await = airports.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
