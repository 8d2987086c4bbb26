//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use airport_catalog::MemorySource;
use test_utils::default_airports;
use weather_api::config::ServiceConfig;
use weather_api::router::build_router;
use weather_api::state::AppState;

async fn app() -> (Arc<AppState>, Router) {
    let source = Arc::new(MemorySource::new(default_airports()));
    let state = AppState::with_source(ServiceConfig::default(), source, None)
        .await
        .unwrap();
    let state = Arc::new(state);
    (state.clone(), build_router(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn wind() -> Value {
    json!({"mean": 22.0, "first": 10, "second": 20, "third": 30, "count": 10})
}

#[tokio::test]
async fn test_collect_ping() {
    let (_, app) = app().await;
    let (status, body) = send(&app, Method::GET, "/collect/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ready"));
}

#[tokio::test]
async fn test_update_then_query() {
    let (_, app) = app().await;

    let uri = "/collect/weather/BOS/wind";
    let (status, _) = send(&app, Method::POST, uri, Some(wind())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/query/weather/BOS/0", None).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["wind"], wind());
    assert!(records[0].get("cloudCover").is_none());
}

#[tokio::test]
async fn test_radius_query() {
    let (_, app) = app().await;
    for (iata, mean) in [("JFK", 22.0), ("EWR", 40.0), ("LGA", 30.0)] {
        let point = json!({"mean": mean, "first": 10, "second": 20, "third": 30, "count": 10});
        let uri = format!("/collect/weather/{}/wind", iata);
        assert_eq!(send(&app, Method::POST, &uri, Some(point)).await.0, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, "/query/weather/JFK/200", None).await;
    assert_eq!(status, StatusCode::OK);
    let means: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["wind"]["mean"].as_f64().unwrap())
        .collect();
    assert_eq!(means, vec![40.0, 22.0, 30.0]);
}

#[tokio::test]
async fn test_query_errors() {
    let (_, app) = app().await;

    let (status, body) = send(&app, Method::GET, "/query/weather/XXX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["type"], "AirportNotFound");
    assert_eq!(body["status"], 404);

    let (status, body) = send(&app, Method::GET, "/query/weather/BOS/far", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "InvalidRadius");
}

#[tokio::test]
async fn test_update_errors() {
    let (_, app) = app().await;

    let uri = "/collect/weather/BOS/snow";
    let (status, body) = send(&app, Method::POST, uri, Some(wind())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "UnknownPointType");

    let bad = json!({"mean": 900.0, "first": 1, "second": 2, "third": 3, "count": 4});
    let uri = "/collect/weather/BOS/pressure";
    let (status, body) = send(&app, Method::POST, uri, Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "ValidationFailure");

    let uri = "/collect/weather/BOS/wind";
    let (status, body) = send(&app, Method::POST, uri, Some(json!("x"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "InvalidParameterValue");
}

#[tokio::test]
async fn test_airport_lifecycle() {
    let (_, app) = app().await;

    let uri = "/collect/airport/FOR/-3.776283/-38.532556";
    let (status, body) = send(&app, Method::POST, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iata"], "FOR");

    let (status, body) = send(&app, Method::GET, "/collect/airport/FOR", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latitude"], -3.776283);
    assert_eq!(body["longitude"], -38.532556);

    let (_, body) = send(&app, Method::GET, "/collect/airports", None).await;
    assert_eq!(body, json!(["BOS", "EWR", "FOR", "JFK", "LGA", "MMU"]));

    let (status, body) = send(&app, Method::DELETE, "/collect/airport/FOR", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iata"], "FOR");

    let (status, body) = send(&app, Method::GET, "/collect/airport/FOR", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["type"], "AirportNotFound");

    let (status, body) = send(&app, Method::DELETE, "/collect/airport/FOR", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iata"], "");
}

#[tokio::test]
async fn test_add_airport_bad_coordinates() {
    let (_, app) = app().await;
    let (status, body) = send(&app, Method::POST, "/collect/airport/FOR/north/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "InvalidParameterValue");
}

#[tokio::test]
async fn test_query_ping_reports_statistics() {
    let (_, app) = app().await;
    send(&app, Method::POST, "/collect/weather/BOS/wind", Some(wind())).await;
    send(&app, Method::GET, "/query/weather/BOS/0", None).await;

    let (status, body) = send(&app, Method::GET, "/query/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_count"], 1);
    assert_eq!(body["datasize"], 1);
    assert_eq!(body["iata_freq"]["BOS"], 1.0);
    assert_eq!(body["radius_freq"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_probes() {
    let (_, app) = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["airports"], 5);

    send(&app, Method::GET, "/collect/airports", None).await;
    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pool_size"], 100);
    assert!(body["tasks"]["total_finished"].as_u64().unwrap() >= 1);

    let (status, _) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_exit_stops_accepting_work() {
    let (state, app) = app().await;

    let (status, _) = send(&app, Method::GET, "/collect/exit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.dispatcher.is_shut_down());

    let (status, body) = send(&app, Method::GET, "/query/weather/BOS", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["type"], "Cancelled");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
}
