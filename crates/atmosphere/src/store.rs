//! The observation store: airports and their atmospheric records, keyed by
//! IATA code, in catalog order.
//!
//! An airport and its record are stored as one [`Station`], so adding or
//! removing an airport always adds or removes its observations with it.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;

use weather_common::{AirportRecord, WeatherError, WeatherResult};

use crate::observation::{ObservationPoint, PointKind};
use crate::record::AtmosphericRecord;

/// An airport paired with its observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub airport: AirportRecord,
    pub record: AtmosphericRecord,
}

impl Station {
    fn empty(airport: AirportRecord) -> Self {
        Self {
            airport,
            record: AtmosphericRecord::default(),
        }
    }
}

/// Ordered, code-keyed collection of stations.
#[derive(Debug, Default)]
pub struct ObservationStore {
    stations: Vec<Station>,
    positions: HashMap<String, usize>,
    /// Set after the catalog source was written; the in-memory catalog must
    /// be reloaded before it is trusted again.
    stale: bool,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store with an empty record per airport.
    ///
    /// A repeated code keeps its first position and takes the later values.
    pub fn from_airports(airports: Vec<AirportRecord>) -> Self {
        let mut store = Self::new();
        for airport in airports {
            store.upsert_airport(airport);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Record at a catalog position.
    pub fn get(&self, index: i64) -> WeatherResult<&AtmosphericRecord> {
        self.station_at(index).map(|s| &s.record)
    }

    /// Station at a catalog position.
    pub fn station_at(&self, index: i64) -> WeatherResult<&Station> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.stations.get(i))
            .ok_or(WeatherError::IndexOutOfRange {
                index,
                len: self.stations.len(),
            })
    }

    pub fn position(&self, iata: &str) -> Option<usize> {
        self.positions.get(iata).copied()
    }

    /// Position of `iata`, falling back to an ASCII case-insensitive match.
    pub fn position_ignore_case(&self, iata: &str) -> Option<usize> {
        self.position(iata).or_else(|| {
            self.stations
                .iter()
                .position(|s| s.airport.iata.eq_ignore_ascii_case(iata))
        })
    }

    pub fn find(&self, iata: &str) -> Option<&AirportRecord> {
        self.station(iata).map(|s| &s.airport)
    }

    pub fn station(&self, iata: &str) -> Option<&Station> {
        self.position(iata).map(|i| &self.stations[i])
    }

    /// Record for an airport code.
    pub fn record(&self, iata: &str) -> WeatherResult<&AtmosphericRecord> {
        self.station(iata)
            .map(|s| &s.record)
            .ok_or_else(|| WeatherError::AirportNotFound(iata.to_string()))
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Airport metadata in catalog order.
    pub fn airports(&self) -> Vec<AirportRecord> {
        self.stations.iter().map(|s| s.airport.clone()).collect()
    }

    pub fn codes(&self) -> BTreeSet<String> {
        self.positions.keys().cloned().collect()
    }

    /// Validate and apply an observation using the current wall clock.
    pub fn update(
        &mut self,
        iata: &str,
        kind: PointKind,
        point: ObservationPoint,
    ) -> WeatherResult<()> {
        self.update_at(iata, kind, point, Utc::now().timestamp_millis())
    }

    /// Validate and apply an observation stamped with `now_ms`.
    ///
    /// A rejected point leaves the record untouched.
    pub fn update_at(
        &mut self,
        iata: &str,
        kind: PointKind,
        point: ObservationPoint,
        now_ms: i64,
    ) -> WeatherResult<()> {
        let pos = self
            .position(iata)
            .ok_or_else(|| WeatherError::AirportNotFound(iata.to_string()))?;
        kind.validate(&point)?;
        self.stations[pos].record.set(kind, point, now_ms);
        Ok(())
    }

    /// Validate and apply an observation to the record at a catalog position.
    pub fn update_index(
        &mut self,
        index: i64,
        kind: PointKind,
        point: ObservationPoint,
        now_ms: i64,
    ) -> WeatherResult<()> {
        let len = self.stations.len();
        let station = usize::try_from(index)
            .ok()
            .and_then(|i| self.stations.get_mut(i))
            .ok_or(WeatherError::IndexOutOfRange { index, len })?;
        kind.validate(&point)?;
        station.record.set(kind, point, now_ms);
        Ok(())
    }

    /// Insert a new airport at the end, or update an existing airport's
    /// metadata in place keeping its observations.
    pub fn upsert_airport(&mut self, airport: AirportRecord) -> AirportRecord {
        match self.position(&airport.iata) {
            Some(pos) => self.stations[pos].airport = airport.clone(),
            None => {
                self.positions
                    .insert(airport.iata.clone(), self.stations.len());
                self.stations.push(Station::empty(airport.clone()));
            }
        }
        airport
    }

    /// Remove an airport together with its record.
    pub fn remove_airport(&mut self, iata: &str) -> Option<Station> {
        let pos = self.positions.remove(iata)?;
        let removed = self.stations.remove(pos);
        for station in &self.stations[pos..] {
            if let Some(p) = self.positions.get_mut(&station.airport.iata) {
                *p -= 1;
            }
        }
        Some(removed)
    }

    /// Swap in a freshly loaded catalog.
    ///
    /// Airports still present keep their observations, new airports start
    /// empty, and airports missing from `airports` are dropped. Clears the
    /// staleness flag.
    pub fn replace_catalog(&mut self, airports: Vec<AirportRecord>) {
        let mut previous: HashMap<String, AtmosphericRecord> = self
            .stations
            .drain(..)
            .map(|s| (s.airport.iata, s.record))
            .collect();
        self.positions.clear();

        for airport in airports {
            let record = previous.remove(&airport.iata);
            let airport = self.upsert_airport(airport);
            if let (Some(record), Some(pos)) = (record, self.position(&airport.iata)) {
                self.stations[pos].record = record;
            }
        }

        self.stale = false;
    }

    /// Drop every airport and record.
    pub fn clear(&mut self) {
        self.stations.clear();
        self.positions.clear();
        self.stale = false;
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of records holding at least one observation.
    pub fn data_count(&self) -> usize {
        self.stations.iter().filter(|s| s.record.has_data()).count()
    }

    /// Number of records with data updated within `window_ms` of `now_ms`.
    pub fn recent_count(&self, now_ms: i64, window_ms: i64) -> usize {
        self.stations
            .iter()
            .filter(|s| s.record.is_recent(now_ms, window_ms))
            .count()
    }
}
