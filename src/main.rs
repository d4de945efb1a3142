//! Quarry API Server
//!
//! Run with: cargo run --bin quarry
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the default locations)
//! with environment overrides:
//! - `QUARRY_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `QUARRY_API_PORT`: Port to listen on (default: 7071)
//! - `QUARRY_STORE_URL`: Store address (default: localhost:8086)
//! - `QUARRY_STORE_USERNAME` / `QUARRY_STORE_PASSWORD`: Store credentials
//! - `QUARRY_STORE_DIALECT`: mysql, postgres or opengemini (default)
//! - `QUARRY_LOG_LEVEL`, `QUARRY_LOG_FORMAT`: Logging (`RUST_LOG` wins)

use anyhow::Context;
use clap::Parser;
use quarry::api::{serve, AppState};
use quarry::config::Config;
use quarry::telemetry::init_tracing;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query adapter for relational and time-series stores")]
struct Args {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Quarry API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        store = %config.store.url,
        dialect = %config.store.dialect,
        "Store configured"
    );

    let state = AppState::connect(&config.store, config.api.clone())
        .context("connecting to store")?;

    // The server still starts when the store is down; requests report it.
    match state.store().ping().await {
        Ok(()) => tracing::info!("Store connection verified"),
        Err(e) => tracing::warn!("Store not available: {} (queries will fail until it is)", e),
    }

    serve(state, &config.api).await?;

    tracing::info!("Quarry API server stopped");
    Ok(())
}
