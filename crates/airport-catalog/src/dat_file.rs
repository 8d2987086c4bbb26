//! `airports.dat` flat file catalog.
//!
//! One airport per line, eleven comma separated columns, values optionally
//! wrapped in double quotes:
//!
//! ```text
//! 1,"General Edward Lawrence Logan Intl","Boston","United States","BOS","KBOS",42.364347,-71.005181,19,-5,"A"
//! ```
//!
//! Columns: pk, name, city, country, IATA, ICAO, latitude, longitude,
//! altitude (ft), timezone (h), DST code.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use weather_common::{AirportRecord, WeatherError, WeatherResult};

use crate::source::AirportSource;

/// Number of columns in a valid catalog line.
pub const COLUMN_COUNT: usize = 11;

/// Parse catalog text into an ordered airport list.
///
/// Lines with the wrong column count or unparseable numbers are skipped. When
/// a code appears twice the later line's values win but the airport keeps the
/// position of its first appearance.
pub fn parse_catalog(content: &str) -> Vec<AirportRecord> {
    let mut airports: Vec<AirportRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let Some(record) = parse_line(line) else {
            debug!(line = line_no + 1, "Skipping malformed catalog line");
            continue;
        };

        match positions.get(&record.iata) {
            Some(&pos) => airports[pos] = record,
            None => {
                positions.insert(record.iata.clone(), airports.len());
                airports.push(record);
            }
        }
    }

    airports
}

fn parse_line(line: &str) -> Option<AirportRecord> {
    let unquoted = line.replace('"', "");
    let cols: Vec<&str> = unquoted.split(',').collect();
    if cols.len() != COLUMN_COUNT {
        return None;
    }

    // Column 0 is the primary key; positions are reassigned on write.
    cols[0].trim().parse::<i64>().ok()?;

    Some(AirportRecord {
        name: cols[1].to_string(),
        city: cols[2].to_string(),
        country: cols[3].to_string(),
        iata: cols[4].trim().to_string(),
        icao: cols[5].trim().to_string(),
        latitude: cols[6].trim().parse().ok()?,
        longitude: cols[7].trim().parse().ok()?,
        altitude: cols[8].trim().parse().ok()?,
        timezone: cols[9].trim().parse().ok()?,
        dst: cols[10].trim().to_string(),
    })
}

/// Render one airport as a catalog line with the given primary key.
///
/// Text columns have commas, quotes and control characters replaced by
/// spaces; the format has no escaping for them.
pub fn format_line(pk: usize, airport: &AirportRecord) -> String {
    format!(
        "{},\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"",
        pk,
        column_text(&airport.name),
        column_text(&airport.city),
        column_text(&airport.country),
        column_text(&airport.iata),
        column_text(&airport.icao),
        airport.latitude,
        airport.longitude,
        airport.altitude,
        airport.timezone,
        column_text(&airport.dst)
    )
}

fn column_text(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == ',' || c == '"' || c.is_control() { ' ' } else { c })
        .collect()
}

/// Catalog stored in an `airports.dat` file.
#[derive(Debug, Clone)]
pub struct DatFileSource {
    path: PathBuf,
}

impl DatFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AirportSource for DatFileSource {
    async fn load(&self) -> WeatherResult<Vec<AirportRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            WeatherError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let airports = parse_catalog(&content);
        debug!(
            path = %self.path.display(),
            airports = airports.len(),
            "Read airport catalog"
        );
        Ok(airports)
    }

    async fn persist(&self, airports: &[AirportRecord]) -> WeatherResult<()> {
        let content = airports
            .iter()
            .enumerate()
            .map(|(i, a)| format_line(i + 1, a))
            .collect::<Vec<_>>()
            .join("\n");

        // Write next to the target and rename so readers never see a partial file.
        let tmp = self.path.with_extension("dat.tmp");
        let write = async {
            tokio::fs::write(&tmp, content).await?;
            tokio::fs::rename(&tmp, &self.path).await
        };

        write.await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to persist airport catalog");
            WeatherError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), airports = airports.len(), "Persisted airport catalog");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOS_LINE: &str = r#"1,"General Edward Lawrence Logan Intl","Boston","United States","BOS","KBOS",42.364347,-71.005181,19,-5,"A""#;

    #[test]
    fn test_parse_quoted_line() {
        let airports = parse_catalog(BOS_LINE);
        assert_eq!(airports.len(), 1);

        let bos = &airports[0];
        assert_eq!(bos.iata, "BOS");
        assert_eq!(bos.icao, "KBOS");
        assert_eq!(bos.city, "Boston");
        assert_eq!(bos.latitude, 42.364347);
        assert_eq!(bos.longitude, -71.005181);
        assert_eq!(bos.altitude, 19.0);
        assert_eq!(bos.timezone, -5.0);
        assert_eq!(bos.dst, "A");
    }

    #[test]
    fn test_parse_skips_wrong_column_count() {
        let content = format!(
            "{}\n2,\"Too\",\"Few\",\"Columns\"\n3,\"Name, With Comma\",\"X\",\"Y\",\"ZZZ\",\"KZZZ\",1,2,3,4,\"U\"",
            BOS_LINE
        );
        let airports = parse_catalog(&content);
        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].iata, "BOS");
    }

    #[test]
    fn test_parse_skips_bad_numbers() {
        let content = r#"1,"A","B","C","AAA","KAAA",north,2,3,4,"U""#;
        assert!(parse_catalog(content).is_empty());
    }

    #[test]
    fn test_duplicate_code_keeps_first_position_last_values() {
        let content = "\
1,\"Logan\",\"Boston\",\"US\",\"BOS\",\"KBOS\",42.0,-71.0,19,-5,\"A\"
2,\"JFK\",\"New York\",\"US\",\"JFK\",\"KJFK\",40.6,-73.7,13,-5,\"A\"
3,\"Logan Renamed\",\"Boston\",\"US\",\"BOS\",\"KBOS\",42.5,-71.5,19,-5,\"A\"";

        let airports = parse_catalog(content);
        assert_eq!(airports.len(), 2);
        assert_eq!(airports[0].iata, "BOS");
        assert_eq!(airports[0].name, "Logan Renamed");
        assert_eq!(airports[0].latitude, 42.5);
        assert_eq!(airports[1].iata, "JFK");
    }

    #[test]
    fn test_format_line_parses_back() {
        let airport = AirportRecord {
            name: "Fortaleza".to_string(),
            ..AirportRecord::new("FOR", 3.7736, 38.5286)
        };
        let line = format_line(7, &airport);
        assert!(line.starts_with("7,\"Fortaleza\""));
        assert_eq!(parse_catalog(&line), vec![airport]);
    }

    #[test]
    fn test_format_line_keeps_column_count() {
        let airport = AirportRecord {
            name: "Pinto Martins, \"Fortaleza\"".to_string(),
            city: "Forta\nleza".to_string(),
            ..AirportRecord::new("FOR", -3.776283, -38.532556)
        };

        let parsed = parse_catalog(&format_line(1, &airport));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].iata, "FOR");
        assert_eq!(parsed[0].name, "Pinto Martins   Fortaleza ");
        assert_eq!(parsed[0].city, "Forta leza");
        assert_eq!(parsed[0].latitude, -3.776283);
    }
}
