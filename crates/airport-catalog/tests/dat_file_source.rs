//! Tests for the `airports.dat` catalog source against real files.

use airport_catalog::{AirportSource, DatFileSource};
use test_utils::{default_airports, default_temp_catalog, temp_catalog};
use weather_common::{AirportRecord, WeatherError};

#[tokio::test]
async fn test_load_default_catalog() {
    let catalog = default_temp_catalog();
    let source = DatFileSource::new(&catalog.path);

    let airports = source.load().await.unwrap();
    assert_eq!(airports, default_airports());
}

#[tokio::test]
async fn test_persist_then_load_round_trips() {
    let catalog = default_temp_catalog();
    let source = DatFileSource::new(&catalog.path);

    let mut airports = source.load().await.unwrap();
    airports.push(AirportRecord::new("FOR", 3.7736, 38.5286));
    airports.retain(|a| a.iata != "EWR");

    source.persist(&airports).await.unwrap();
    let reloaded = source.load().await.unwrap();

    assert_eq!(reloaded, airports);
    assert_eq!(reloaded.last().unwrap().iata, "FOR");
}

#[tokio::test]
async fn test_persist_renumbers_primary_keys() {
    let catalog = temp_catalog("");
    let source = DatFileSource::new(&catalog.path);

    source
        .persist(&[
            AirportRecord::new("FOR", 3.7736, 38.5286),
            AirportRecord::new("REC", 8.1259, 34.9240),
        ])
        .await
        .unwrap();

    let content = std::fs::read_to_string(&catalog.path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1,"));
    assert!(lines[1].starts_with("2,"));
    assert!(!content.ends_with('\n'));
}

#[tokio::test]
async fn test_load_missing_file_is_io_error() {
    let catalog = default_temp_catalog();
    let source = DatFileSource::new(catalog.dir.path().join("missing.dat"));

    let err = source.load().await.unwrap_err();
    assert!(matches!(err, WeatherError::Io(_)));
}

#[tokio::test]
async fn test_persist_into_missing_directory_is_io_error() {
    let catalog = default_temp_catalog();
    let source = DatFileSource::new(catalog.dir.path().join("nope").join("airports.dat"));

    let err = source
        .persist(&[AirportRecord::new("FOR", 3.7736, 38.5286)])
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "IOFailure");
}
