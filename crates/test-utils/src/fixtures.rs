//! Common airport fixtures for weather store tests.
//!
//! Coordinates come from the bundled `airports.dat` catalog the service ships
//! with: Boston plus the four New York area airports.

use weather_common::AirportRecord;

/// Codes of the default catalog, in catalog order.
pub const DEFAULT_CODES: [&str; 5] = ["BOS", "EWR", "JFK", "LGA", "MMU"];

/// General Edward Lawrence Logan Intl, Boston.
pub fn bos() -> AirportRecord {
    AirportRecord {
        name: "General Edward Lawrence Logan Intl".to_string(),
        city: "Boston".to_string(),
        country: "United States".to_string(),
        icao: "KBOS".to_string(),
        altitude: 19.0,
        timezone: -5.0,
        dst: "A".to_string(),
        ..AirportRecord::new("BOS", 42.364347, -71.005181)
    }
}

/// Newark Liberty Intl.
pub fn ewr() -> AirportRecord {
    AirportRecord {
        name: "Newark Liberty Intl".to_string(),
        city: "Newark".to_string(),
        country: "United States".to_string(),
        icao: "KEWR".to_string(),
        altitude: 18.0,
        timezone: -5.0,
        dst: "A".to_string(),
        ..AirportRecord::new("EWR", 40.6925, -74.168667)
    }
}

/// John F Kennedy Intl, New York.
pub fn jfk() -> AirportRecord {
    AirportRecord {
        name: "John F Kennedy Intl".to_string(),
        city: "New York".to_string(),
        country: "United States".to_string(),
        icao: "KJFK".to_string(),
        altitude: 13.0,
        timezone: -5.0,
        dst: "A".to_string(),
        ..AirportRecord::new("JFK", 40.639751, -73.778925)
    }
}

/// La Guardia, New York.
pub fn lga() -> AirportRecord {
    AirportRecord {
        name: "La Guardia".to_string(),
        city: "New York".to_string(),
        country: "United States".to_string(),
        icao: "KLGA".to_string(),
        altitude: 22.0,
        timezone: -5.0,
        dst: "A".to_string(),
        ..AirportRecord::new("LGA", 40.777245, -73.872608)
    }
}

/// Morristown Municipal Airport.
pub fn mmu() -> AirportRecord {
    AirportRecord {
        name: "Morristown Municipal Airport".to_string(),
        city: "Morristown".to_string(),
        country: "United States".to_string(),
        icao: "KMMU".to_string(),
        altitude: 187.0,
        timezone: -5.0,
        dst: "A".to_string(),
        ..AirportRecord::new("MMU", 40.79935, -74.4148747)
    }
}

/// The default five airport catalog, in catalog order.
pub fn default_airports() -> Vec<AirportRecord> {
    vec![bos(), ewr(), jfk(), lga(), mmu()]
}

/// Distances from JFK under the service's distance formula, in km.
pub mod distances {
    pub const JFK_EWR: f64 = 43.076764;
    pub const JFK_LGA: f64 = 18.440506;
    pub const JFK_MMU: f64 = 72.205256;
    pub const JFK_BOS: f64 = 202.955983;
    /// Textbook haversine JFK to EWR, for contrast.
    pub const JFK_EWR_TRUE: f64 = 33.400813;
}
