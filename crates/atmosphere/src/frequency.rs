//! Request instrumentation: how often each airport and each radius is asked
//! for, and the health snapshot built from it.
//!
//! Both maps grow without bound for the life of the process and are only
//! emptied by a full reset.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::store::ObservationStore;

/// Histogram length used before any radius has been seen.
const DEFAULT_MAX_RADIUS: usize = 1000;

/// Visit counters per airport.
///
/// Codes that do not resolve to a catalog airport are counted together under
/// a single `None` key.
#[derive(Debug, Default, Clone)]
pub struct RequestFrequency {
    visits: HashMap<Option<String>, u64>,
}

impl RequestFrequency {
    pub fn record(&mut self, iata: Option<&str>) {
        *self.visits.entry(iata.map(str::to_string)).or_insert(0) += 1;
    }

    pub fn visits(&self, iata: Option<&str>) -> u64 {
        self.visits
            .get(&iata.map(str::to_string))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct keys, the unknown-airport key included.
    pub fn entries(&self) -> usize {
        self.visits.len()
    }

    /// Visits divided by the number of distinct airports visited (not by the
    /// total number of visits). 0 before anything was recorded.
    pub fn fraction(&self, iata: &str) -> f64 {
        if self.visits.is_empty() {
            return 0.0;
        }
        self.visits(Some(iata)) as f64 / self.visits.len() as f64
    }

    pub fn clear(&mut self) {
        self.visits.clear();
    }
}

/// Requested radii.
///
/// NOTE: recording a radius only guarantees the radius has an entry; an
/// existing counter is never incremented, so every counter stays 0 and the
/// histogram reports which buckets exist rather than how often they were hit.
/// Clients of the health endpoint rely on this shape.
#[derive(Debug, Default, Clone)]
pub struct RadiusFrequency {
    // Keyed by the radius' bit pattern; -0.0 is folded into 0.0.
    counts: HashMap<u64, u64>,
}

impl RadiusFrequency {
    pub fn record(&mut self, radius: f64) {
        self.counts.entry(key(radius)).or_insert(0);
    }

    pub fn contains(&self, radius: f64) -> bool {
        self.counts.contains_key(&key(radius))
    }

    pub fn count(&self, radius: f64) -> Option<u64> {
        self.counts.get(&key(radius)).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn max_radius(&self) -> Option<f64> {
        self.counts
            .keys()
            .map(|bits| f64::from_bits(*bits))
            .max_by(f64::total_cmp)
    }

    /// Histogram of length `trunc(max radius) + 1` (1001 when empty); each
    /// radius adds its counter to bucket `trunc(radius) % 10`.
    pub fn histogram(&self) -> Vec<u64> {
        let len = self
            .max_radius()
            .map(|max| max as usize)
            .unwrap_or(DEFAULT_MAX_RADIUS)
            + 1;

        let mut hist = vec![0u64; len];
        for (bits, count) in &self.counts {
            let bucket = f64::from_bits(*bits) as usize % 10;
            hist[bucket] += count;
        }
        hist
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

fn key(radius: f64) -> u64 {
    if radius == 0.0 {
        0.0_f64.to_bits()
    } else {
        radius.to_bits()
    }
}

/// Health and usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Records holding any observation.
    pub data_count: usize,
    /// Records holding any observation updated within the freshness window.
    pub datasize: usize,
    /// Per-airport share of queries, for every catalog airport.
    pub iata_freq: BTreeMap<String, f64>,
    pub radius_freq: Vec<u64>,
}

/// Both frequency maps together.
#[derive(Debug, Default)]
pub struct Instrumentation {
    pub requests: RequestFrequency,
    pub radii: RadiusFrequency,
}

impl Instrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one weather query.
    pub fn record(&mut self, store: &ObservationStore, iata: &str, radius: f64) {
        let resolved = store.find(iata).map(|a| a.iata.as_str());
        self.requests.record(resolved);
        self.radii.record(radius);
    }

    pub fn snapshot(
        &self,
        store: &ObservationStore,
        now_ms: i64,
        window_ms: i64,
    ) -> HealthSnapshot {
        let iata_freq = store
            .stations()
            .map(|s| {
                let code = s.airport.iata.clone();
                let frac = self.requests.fraction(&code);
                (code, frac)
            })
            .collect();

        HealthSnapshot {
            data_count: store.data_count(),
            datasize: store.recent_count(now_ms, window_ms),
            iata_freq,
            radius_freq: self.radii.histogram(),
        }
    }

    pub fn clear(&mut self) {
        self.requests.clear();
        self.radii.clear();
    }
}
