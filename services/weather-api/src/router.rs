//! Route table.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Query surface
        .route("/query/ping", get(handlers::query::ping_handler))
        .route("/query/weather/:iata", get(handlers::query::weather_handler))
        .route(
            "/query/weather/:iata/:radius",
            get(handlers::query::weather_radius_handler),
        )
        // Collection surface
        .route("/collect/ping", get(handlers::collect::ping_handler))
        .route(
            "/collect/weather/:iata/:point_type",
            post(handlers::collect::update_weather_handler),
        )
        .route(
            "/collect/airports",
            get(handlers::collect::list_airports_handler),
        )
        .route(
            "/collect/airport/:iata",
            get(handlers::collect::get_airport_handler)
                .delete(handlers::collect::delete_airport_handler),
        )
        .route(
            "/collect/airport/:iata/:lat/:long",
            post(handlers::collect::add_airport_handler),
        )
        .route("/collect/exit", get(handlers::collect::exit_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .route("/status", get(handlers::health::status_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
