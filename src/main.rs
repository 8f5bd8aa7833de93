use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use taskmaster::{config, init_tracing, server, store::PgTaskStore, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file for local development
    let app_env = std::env::var("APP_ENV").unwrap_or_default();
    if app_env != "production" && dotenvy::dotenv().is_err() {
        eprintln!("Warning: .env file not found");
    }

    init_tracing();

    let config = config::load_config().context("Failed to load configuration")?;

    // Telemetry first: a misconfigured exporter is a bootstrap failure
    let tracer_provider = telemetry::init_tracer_provider(&config.otel_exporter_otlp_endpoint)
        .context("Failed to initialize tracer provider")?;
    let meter_provider = telemetry::init_meter_provider(&config.otel_exporter_otlp_endpoint)
        .context("Failed to initialize meter provider")?;

    // Then persistence: unreachable database aborts before serving traffic
    let store = PgTaskStore::connect(&config).await?;
    store.ensure_schema().await?;
    info!("Successfully connected to database");

    server::start_server(&config, Arc::new(store)).await?;

    telemetry::shutdown(&tracer_provider, &meter_provider);
    info!("Server exiting");

    Ok(())
}
