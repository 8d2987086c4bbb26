//! Great-circle distance and radius queries.

use weather_common::{AirportRecord, WeatherError, WeatherResult};

use crate::record::AtmosphericRecord;
use crate::store::ObservationStore;

/// Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6372.8;

/// Distance in kilometres between two airports, as the service has always
/// computed it.
///
/// NOTE: the latitude cosines are taken of the raw degree values, not of
/// radians. This is not the textbook haversine (see [`true_haversine`]), but
/// every radius query and every stored client expectation depends on it, so it
/// is reproduced exactly. The result is still symmetric in `a` and `b`.
pub fn distance(a: &AirportRecord, b: &AirportRecord) -> f64 {
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + (delta_lon / 2.0).sin().powi(2) * a.latitude.cos() * b.latitude.cos();
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Textbook haversine distance in kilometres.
pub fn true_haversine(a: &AirportRecord, b: &AirportRecord) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Parse a radius path parameter. Absent or blank means 0.
pub fn parse_radius(radius: Option<&str>) -> WeatherResult<f64> {
    match radius.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(s) => {
            let value: f64 = s
                .parse()
                .map_err(|_| WeatherError::InvalidRadius(s.to_string()))?;
            check_radius(value)?;
            Ok(value)
        }
    }
}

fn check_radius(radius: f64) -> WeatherResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(WeatherError::InvalidRadius(radius.to_string()));
    }
    Ok(())
}

/// Records of every airport within `radius_km` of `origin`.
///
/// A radius of 0 is a direct lookup of the origin's record, with or without
/// data. Otherwise airports are visited in catalog order, the origin
/// included, and only records holding at least one observation are returned.
pub fn query(
    store: &ObservationStore,
    origin: &str,
    radius_km: f64,
) -> WeatherResult<Vec<AtmosphericRecord>> {
    check_radius(radius_km)?;

    let origin = store
        .station(origin)
        .ok_or_else(|| WeatherError::AirportNotFound(origin.to_string()))?;

    if radius_km == 0.0 {
        return Ok(vec![origin.record.clone()]);
    }

    Ok(store
        .stations()
        .filter(|s| distance(&origin.airport, &s.airport) <= radius_km)
        .filter(|s| s.record.has_data())
        .map(|s| s.record.clone())
        .collect())
}
