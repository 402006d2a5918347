//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

use crate::application::services::{
    InterviewService, InterviewServiceImpl, JwtTokenVerifier, LifecycleService,
    LifecycleServiceImpl, ThreadService, ThreadServiceImpl, TokenVerifier,
};
use crate::application::EventPublisher;
use crate::config::{Settings, StorageBackend};
use crate::domain::{ApplicationRepository, JobDirectory, UserDirectory};
use crate::infrastructure::database;
use crate::infrastructure::memory::{InMemoryApplicationRepository, InMemoryDirectory};
use crate::infrastructure::repositories::{PgApplicationRepository, PgDirectory};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::{Gateway, GatewayPublisher};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub applications: Arc<dyn ApplicationRepository>,
    pub lifecycle: Arc<dyn LifecycleService>,
    pub threads: Arc<dyn ThreadService>,
    pub interviews: Arc<dyn InterviewService>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Connect the configured storage backend and wire the services.
    pub async fn build(settings: Settings) -> Result<Self> {
        match settings.storage.backend {
            StorageBackend::Postgres => {
                let pool = database::create_pool(&settings.database)
                    .await
                    .context("failed to connect to PostgreSQL")?;
                if settings.database.run_migrations {
                    database::run_migrations(&pool)
                        .await
                        .context("failed to run migrations")?;
                }

                let directory = Arc::new(PgDirectory::new(pool.clone()));
                let applications = Arc::new(PgApplicationRepository::new(pool));
                Ok(Self::with_backends(
                    settings,
                    applications,
                    directory.clone(),
                    directory,
                ))
            }
            StorageBackend::Memory => {
                let directory = match &settings.storage.seed_file {
                    Some(path) => Arc::new(InMemoryDirectory::from_seed_file(path)?),
                    None => Arc::new(InMemoryDirectory::new()),
                };
                tracing::warn!("Using in-memory storage; data is lost on shutdown");

                let applications = Arc::new(InMemoryApplicationRepository::new());
                Ok(Self::with_backends(
                    settings,
                    applications,
                    directory.clone(),
                    directory,
                ))
            }
        }
    }

    /// Wire services over explicit backends.
    pub fn with_backends(
        settings: Settings,
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobDirectory>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let gateway = Arc::new(Gateway::new(settings.websocket.heartbeat_interval_ms));
        let publisher: Arc<dyn EventPublisher> = Arc::new(GatewayPublisher::new(gateway.clone()));

        let lifecycle: Arc<dyn LifecycleService> = Arc::new(LifecycleServiceImpl::new(
            applications.clone(),
            jobs,
            users.clone(),
            publisher.clone(),
            settings.lifecycle.transition_policy,
        ));
        let threads: Arc<dyn ThreadService> = Arc::new(ThreadServiceImpl::new(
            applications.clone(),
            users.clone(),
            publisher.clone(),
            settings.lifecycle.max_message_length,
        ));
        let interviews: Arc<dyn InterviewService> = Arc::new(InterviewServiceImpl::new(
            applications.clone(),
            users,
            lifecycle.clone(),
            publisher,
        ));
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(&settings.jwt));

        Self {
            applications,
            lifecycle,
            threads,
            interviews,
            verifier,
            gateway,
            settings: Arc::new(settings),
        }
    }
}

/// Build the full router with tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(logging::create_trace_layer())
            .layer(cors),
    )
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let addr = settings.server_addr();
        let state = AppState::build(settings).await?;
        tracing::info!(backend = %state.settings.storage.backend, "Storage ready");

        let router = create_router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
