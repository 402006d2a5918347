//! # Application Hub
//!
//! Job application lifecycle service with a real-time notification gateway.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Storage backend (PostgreSQL or in-memory)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use application_hub::config::Settings;
use application_hub::presentation::http::handlers::health;
use application_hub::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings first: the log format is configurable
    let settings = Settings::load()?;
    application_hub::telemetry::init_tracing(settings.logging.json);
    health::init_server_start();

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        backend = %settings.storage.backend,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
