//! Application state for the weather API.

use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use airport_catalog::{AirportSource, DatFileSource};
use atmosphere::{AtmosphereService, TaskDispatcher};

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Runs every store operation.
    pub dispatcher: Arc<TaskDispatcher>,

    /// Effective configuration.
    pub config: ServiceConfig,

    /// Renders `/metrics`; absent when no recorder was installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state backed by the configured `airports.dat` file.
    pub async fn new(config: ServiceConfig, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let source = Arc::new(DatFileSource::new(&config.airports_file));
        Self::with_source(config, source, prometheus).await
    }

    /// Create state over any catalog source.
    pub async fn with_source(
        config: ServiceConfig,
        source: Arc<dyn AirportSource>,
        prometheus: Option<PrometheusHandle>,
    ) -> Result<Self> {
        let settings = config.service_settings()?;
        info!(source = %source.describe(), "Opening airport catalog");

        let service = AtmosphereService::open(source, settings).await;
        let dispatcher = TaskDispatcher::new(Arc::new(service), config.dispatcher_config());

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            config,
            prometheus,
        })
    }
}
