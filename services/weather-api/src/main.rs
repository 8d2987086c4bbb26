//! Weather API Server
//!
//! In-memory airport weather store with radius queries.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use weather_api::config::ServiceConfig;
use weather_api::router::build_router;
use weather_api::state::AppState;

/// Weather API Server
#[derive(Parser, Debug)]
#[command(name = "weather-api")]
#[command(about = "Airport weather observation store and radius query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:9090", env = "WEATHER_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "WEATHER_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Path to the YAML service configuration
    #[arg(short, long, env = "WEATHER_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting weather API server");

    let config = ServiceConfig::load(args.config.as_deref())?;
    info!(
        airports_file = %config.airports_file.display(),
        pool_size = config.pool_size,
        task_timeout_secs = config.task_timeout_secs,
        "Loaded configuration"
    );

    let state = Arc::new(AppState::new(config, Some(prometheus)).await?);
    let dispatcher = state.dispatcher.clone();
    let app = build_router(state);

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Weather API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Stop on /collect/exit or Ctrl-C, whichever comes first.
    let exit_requested = dispatcher.shutdown_signal();
    let shutdown = async move {
        tokio::select! {
            _ = exit_requested => {}
            _ = tokio::signal::ctrl_c() => {
                dispatcher.shutdown();
            }
        }
        info!("Shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server failed")?;

    Ok(())
}
