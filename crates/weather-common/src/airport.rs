//! Airport metadata as held by the airport catalog.

use serde::{Deserialize, Serialize};

/// Basic airport information.
///
/// The IATA code is the primary key; every other column exists so that a
/// catalog can be written back to its source without losing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    /// Three letter IATA code.
    pub iata: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    /// Four letter ICAO code.
    #[serde(default)]
    pub icao: String,
    /// Altitude in feet.
    #[serde(default)]
    pub altitude: f64,
    /// Offset from UTC in hours.
    #[serde(default)]
    pub timezone: f32,
    /// One letter DST code: E (Europe), A (US/Canada), S (South America),
    /// O (Australia), Z (New Zealand), N (None) or U (Unknown).
    #[serde(default = "default_dst")]
    pub dst: String,
}

fn default_dst() -> String {
    "U".to_string()
}

impl Default for AirportRecord {
    fn default() -> Self {
        Self {
            iata: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            name: String::new(),
            city: String::new(),
            country: String::new(),
            icao: String::new(),
            altitude: 0.0,
            timezone: 0.0,
            dst: default_dst(),
        }
    }
}

impl AirportRecord {
    /// Create a record carrying only the code and position.
    pub fn new(iata: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            iata: iata.into(),
            latitude,
            longitude,
            ..Default::default()
        }
    }

    /// Whether this is the empty placeholder record (no code assigned).
    pub fn is_placeholder(&self) -> bool {
        self.iata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_defaults() {
        let bos = AirportRecord::new("BOS", 42.364347, -71.005181);
        assert_eq!(bos.iata, "BOS");
        assert_eq!(bos.dst, "U");
        assert!(bos.name.is_empty());
        assert!(!bos.is_placeholder());
    }

    #[test]
    fn test_default_is_placeholder() {
        assert!(AirportRecord::default().is_placeholder());
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"iata":"FOR","latitude":3.7736,"longitude":38.5286}"#;
        let record: AirportRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, AirportRecord::new("FOR", 3.7736, 38.5286));
    }
}
