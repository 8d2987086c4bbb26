//! The store behind its lock, kept in sync with the airport catalog source.
//!
//! Lock order is always store first, then instrumentation.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tokio::sync::{Mutex, OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, info, warn};

use airport_catalog::AirportSource;
use weather_common::{AirportRecord, WeatherError, WeatherResult};

use crate::frequency::{HealthSnapshot, Instrumentation};
use crate::observation::{ObservationPoint, PointKind};
use crate::record::{AtmosphericRecord, RECENT_WINDOW_MS};
use crate::spatial::{self, parse_radius};
use crate::store::ObservationStore;

/// Tunables of the service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// Largest radius a query may ask for.
    pub max_radius_km: f64,
    /// How far back an update counts as recent in the health snapshot.
    pub recent_window_ms: i64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            max_radius_km: 25_000.0,
            recent_window_ms: RECENT_WINDOW_MS,
        }
    }
}

/// Shared state of the weather service.
pub struct AtmosphereService {
    store: Arc<RwLock<ObservationStore>>,
    instrumentation: Mutex<Instrumentation>,
    source: Arc<dyn AirportSource>,
    settings: ServiceSettings,
}

impl AtmosphereService {
    /// Load the catalog from `source` and start with empty records.
    ///
    /// A failed load is logged and leaves the store empty and stale, so the
    /// next operation tries again.
    pub async fn open(source: Arc<dyn AirportSource>, settings: ServiceSettings) -> Self {
        let service = Self {
            store: Arc::new(RwLock::new(ObservationStore::new())),
            instrumentation: Mutex::new(Instrumentation::new()),
            source,
            settings,
        };

        {
            let mut store = service.store.write().await;
            service.reload(&mut store).await;
        }

        service
    }

    pub fn settings(&self) -> ServiceSettings {
        self.settings
    }

    pub async fn is_stale(&self) -> bool {
        self.store.read().await.is_stale()
    }

    pub async fn airport_count(&self) -> usize {
        self.store.read().await.len()
    }

    async fn reload(&self, store: &mut ObservationStore) {
        match self.source.load().await {
            Ok(airports) => {
                store.replace_catalog(airports);
                info!(
                    source = %self.source.describe(),
                    airports = store.len(),
                    "Loaded airport catalog"
                );
            }
            Err(e) => {
                store.mark_stale();
                warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "Failed to load airport catalog, keeping current one"
                );
            }
        }
    }

    /// Reload the catalog if a persist happened since the last load.
    pub async fn refresh_if_stale(&self) {
        if !self.store.read().await.is_stale() {
            return;
        }

        let mut store = self.store.write().await;
        // Another task may have reloaded while we waited for the lock.
        if store.is_stale() {
            self.reload(&mut store).await;
        }
    }

    /// Health and usage statistics.
    pub async fn ping(&self) -> HealthSnapshot {
        self.refresh_if_stale().await;

        let store = self.store.read().await;
        let instrumentation = self.instrumentation.lock().await;
        instrumentation.snapshot(
            &store,
            Utc::now().timestamp_millis(),
            self.settings.recent_window_ms,
        )
    }

    /// Records around `iata`; see [`spatial::query`].
    ///
    /// The request is counted once the radius is known to be valid, even when
    /// the airport turns out to be unknown.
    pub async fn weather(
        &self,
        iata: &str,
        radius: Option<&str>,
    ) -> WeatherResult<Vec<AtmosphericRecord>> {
        let radius = parse_radius(radius)?;
        if radius > self.settings.max_radius_km {
            return Err(WeatherError::InvalidRadius(format!(
                "{} exceeds the limit of {} km",
                radius, self.settings.max_radius_km
            )));
        }

        self.refresh_if_stale().await;

        let store = self.store.read().await;
        self.instrumentation
            .lock()
            .await
            .record(&store, iata, radius);
        counter!("weather_queries_total").increment(1);

        let records = spatial::query(&store, iata, radius)?;
        debug!(iata = %iata, radius_km = radius, matches = records.len(), "Weather query");
        Ok(records)
    }

    /// Apply one observation point.
    pub async fn update_weather(
        &self,
        iata: &str,
        point_type: &str,
        point: ObservationPoint,
    ) -> WeatherResult<()> {
        let kind: PointKind = point_type.parse()?;

        self.refresh_if_stale().await;

        let mut store = self.store.write().await;
        store.update(iata, kind, point)?;
        debug!(iata = %iata, kind = %kind, point = %point, "Observation updated");
        Ok(())
    }

    pub async fn airport_codes(&self) -> BTreeSet<String> {
        self.refresh_if_stale().await;
        self.store.read().await.codes()
    }

    pub async fn airport(&self, iata: &str) -> Option<AirportRecord> {
        self.refresh_if_stale().await;
        self.store.read().await.find(iata).cloned()
    }

    /// Add an airport, or move an existing one to new coordinates.
    ///
    /// Codes match existing airports ignoring ASCII case; a match keeps its
    /// stored code. The new catalog is persisted before the store changes; a
    /// failed persist leaves the store as it was.
    pub async fn add_airport(
        &self,
        iata: &str,
        latitude: &str,
        longitude: &str,
    ) -> WeatherResult<AirportRecord> {
        let iata = checked_code(iata)?;
        let latitude = parse_coordinate("latitude", latitude)?;
        let longitude = parse_coordinate("longitude", longitude)?;

        self.refresh_if_stale().await;

        let store = self.store.clone().write_owned().await;
        let mut airports = store.airports();
        let airport = match store.position_ignore_case(iata) {
            Some(pos) => {
                let airport = &mut airports[pos];
                airport.latitude = latitude;
                airport.longitude = longitude;
                airport.clone()
            }
            None => {
                let airport = AirportRecord::new(iata, latitude, longitude);
                airports.push(airport.clone());
                airport
            }
        };

        let airport = self
            .commit(store, airports, move |store| store.upsert_airport(airport))
            .await?;

        info!(iata = %airport.iata, latitude, longitude, "Airport added");
        Ok(airport)
    }

    /// Remove an airport and its observations.
    ///
    /// Codes match ignoring ASCII case. Returns the removed airport, or a
    /// placeholder record when the code is not in the catalog.
    pub async fn delete_airport(&self, iata: &str) -> WeatherResult<AirportRecord> {
        self.refresh_if_stale().await;

        let store = self.store.clone().write_owned().await;
        let Some(pos) = store.position_ignore_case(iata) else {
            debug!(iata = %iata, "Delete of unknown airport");
            return Ok(AirportRecord::default());
        };

        let mut airports = store.airports();
        let code = airports.remove(pos).iata;

        let removed = self
            .commit(store, airports, move |store| {
                store
                    .remove_airport(&code)
                    .map(|station| station.airport)
                    .unwrap_or_default()
            })
            .await?;

        info!(iata = %removed.iata, "Airport removed");
        Ok(removed)
    }

    /// Persist `airports`, then apply `change` and mark the store stale.
    ///
    /// Runs on its own task holding the write lock, so an aborted caller
    /// cannot leave a persisted catalog unapplied.
    async fn commit<T, F>(
        &self,
        mut store: OwnedRwLockWriteGuard<ObservationStore>,
        airports: Vec<AirportRecord>,
        change: F,
    ) -> WeatherResult<T>
    where
        F: FnOnce(&mut ObservationStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let source = self.source.clone();
        tokio::spawn(async move {
            source.persist(&airports).await?;
            let applied = change(&mut store);
            store.mark_stale();
            Ok::<_, WeatherError>(applied)
        })
        .await
        .map_err(|e| WeatherError::TaskFailed(e.to_string()))?
    }

    /// Drop every observation and statistic and reload the catalog.
    pub async fn reset(&self) -> usize {
        let mut store = self.store.write().await;
        store.clear();
        self.instrumentation.lock().await.clear();
        self.reload(&mut store).await;

        info!(airports = store.len(), "Store reset");
        store.len()
    }
}

fn checked_code(iata: &str) -> WeatherResult<&str> {
    let iata = iata.trim();
    if iata.is_empty() {
        return Err(WeatherError::invalid_parameter("iata", "airport code is empty"));
    }
    if iata.chars().any(|c| c == ',' || c == '"' || c.is_control()) {
        return Err(WeatherError::invalid_parameter(
            "iata",
            format!("'{}' contains a comma, quote or control character", iata.escape_debug()),
        ));
    }
    Ok(iata)
}

fn parse_coordinate(param: &str, value: &str) -> WeatherResult<f64> {
    let parsed: f64 = value.trim().parse().map_err(|_| {
        WeatherError::invalid_parameter(param, format!("'{}' is not a number", value))
    })?;

    if !parsed.is_finite() {
        return Err(WeatherError::invalid_parameter(
            param,
            format!("'{}' is not a finite number", value),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airport_catalog::MemorySource;
    use test_utils::default_airports;

    async fn service() -> (Arc<MemorySource>, AtmosphereService) {
        let source = Arc::new(MemorySource::new(default_airports()));
        let service = AtmosphereService::open(source.clone(), ServiceSettings::default()).await;
        (source, service)
    }

    fn wind(mean: f64) -> ObservationPoint {
        ObservationPoint::builder().mean(mean).first(10).second(20).third(30).count(10).build()
    }

    #[tokio::test]
    async fn test_open_loads_catalog() {
        let (_, service) = service().await;
        assert_eq!(service.airport_count().await, 5);
        assert!(!service.is_stale().await);
    }

    #[tokio::test]
    async fn test_weather_rejects_bad_radius_without_counting() {
        let (_, service) = service().await;

        assert!(matches!(
            service.weather("BOS", Some("abc")).await,
            Err(WeatherError::InvalidRadius(_))
        ));
        assert!(matches!(
            service.weather("BOS", Some("30000")).await,
            Err(WeatherError::InvalidRadius(_))
        ));

        let health = service.ping().await;
        assert!(health.iata_freq.values().all(|f| *f == 0.0));
        assert_eq!(health.radius_freq.len(), 1001);
    }

    #[tokio::test]
    async fn test_unknown_airport_is_still_counted() {
        let (_, service) = service().await;

        let err = service.weather("XXX", None).await.unwrap_err();
        assert_eq!(err, WeatherError::AirportNotFound("XXX".into()));

        service.weather("BOS", Some("0")).await.unwrap();
        let health = service.ping().await;
        assert_eq!(health.iata_freq["BOS"], 0.5);
    }

    #[tokio::test]
    async fn test_update_unknown_kind_checked_first() {
        let (_, service) = service().await;
        let err = service.update_weather("XXX", "snow", wind(1.0)).await.unwrap_err();
        assert!(matches!(err, WeatherError::UnknownPointType(_)));
    }

    #[tokio::test]
    async fn test_add_airport_persists_then_marks_stale() {
        let (source, service) = service().await;

        let added = service.add_airport("FOR", "-3.776283", "-38.532556").await.unwrap();
        assert_eq!(added.latitude, -3.776283);
        assert!(service.is_stale().await);

        let persisted = source.contents().await;
        assert_eq!(persisted.last().unwrap().iata, "FOR");

        assert_eq!(service.airport("FOR").await, Some(added));
        assert!(!service.is_stale().await);
    }

    #[tokio::test]
    async fn test_add_existing_airport_moves_it() {
        let (source, service) = service().await;
        service.update_weather("BOS", "wind", wind(3.0)).await.unwrap();

        service.add_airport("BOS", "1.5", "2.5").await.unwrap();

        let bos = service.airport("BOS").await.unwrap();
        assert_eq!((bos.latitude, bos.longitude), (1.5, 2.5));
        assert_eq!(bos.name, "General Edward Lawrence Logan Intl");
        assert_eq!(source.contents().await.len(), 5);

        let records = service.weather("BOS", None).await.unwrap();
        assert_eq!(records[0].wind, Some(wind(3.0)));
    }

    #[tokio::test]
    async fn test_add_airport_rejects_bad_input() {
        let (source, service) = service().await;

        let cases = [
            ("FOR", "north", "1"),
            ("FOR", "1", "NaN"),
            (" ", "1", "1"),
            ("A,B", "1", "2"),
            ("A\"B", "1", "2"),
            ("A\nB", "1", "2"),
        ];
        for (iata, lat, lon) in cases {
            assert!(matches!(
                service.add_airport(iata, lat, lon).await,
                Err(WeatherError::InvalidParameter { .. })
            ));
        }
        assert_eq!(source.contents().await.len(), 5);
    }

    #[tokio::test]
    async fn test_codes_match_ignoring_case() {
        let (source, service) = service().await;
        service.update_weather("BOS", "wind", wind(3.0)).await.unwrap();

        let moved = service.add_airport("bos", "1.5", "2.5").await.unwrap();
        assert_eq!(moved.iata, "BOS");
        assert_eq!(service.airport_count().await, 5);
        assert_eq!(service.weather("BOS", None).await.unwrap()[0].wind, Some(wind(3.0)));

        let removed = service.delete_airport("Bos").await.unwrap();
        assert_eq!(removed.iata, "BOS");
        assert_eq!(service.airport("BOS").await, None);
        assert_eq!(source.contents().await.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_unknown_returns_placeholder() {
        let (source, service) = service().await;
        let removed = service.delete_airport("ZZZ").await.unwrap();
        assert!(removed.is_placeholder());
        assert_eq!(source.contents().await.len(), 5);
        assert!(!service.is_stale().await);
    }

    #[tokio::test]
    async fn test_reset_clears_data_and_statistics() {
        let (_, service) = service().await;
        service.update_weather("BOS", "wind", wind(3.0)).await.unwrap();
        service.weather("BOS", Some("10")).await.unwrap();

        assert_eq!(service.reset().await, 5);

        let health = service.ping().await;
        assert_eq!(health.data_count, 0);
        assert_eq!(health.radius_freq.len(), 1001);
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("latitude", " 42.5 ").unwrap(), 42.5);
        assert!(parse_coordinate("latitude", "inf").is_err());
        assert!(parse_coordinate("latitude", "").is_err());
    }
}
