// ============================================================================
// Stayhub Marketplace Core
// ============================================================================
//
// Chat between guests and hosts, the booking ledger, and the notification
// feed both of them feed. Served as a REST API (axum) plus a WebSocket
// channel (tokio-tungstenite) on its own port.
//
// ============================================================================

pub mod bookings;
pub mod context;
pub mod directory;
pub mod email;
pub mod locks;
pub mod messages;
pub mod notifications;
pub mod realtime;
pub mod routes;
pub mod utils;

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{Context, Result};
use stayhub_config::{Config, StorageBackend};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::context::AppContext;
use crate::directory::InMemoryDirectory;

/// Initialize the global tracing subscriber
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect storage for the configured backend and assemble the context
pub async fn build_context(config: Arc<Config>) -> Result<AppContext> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = stayhub_db::create_pool(&config.database_url, &config.db)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            tracing::info!("Applying database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to apply database migrations")?;
            tracing::info!("Database migrations applied successfully.");

            AppContext::builder()
                .with_config(config)
                .with_db_pool(pool)
                .build()
        }
        StorageBackend::Memory => {
            let directory = match config.directory_seed_file.as_deref() {
                Some(path) => {
                    tracing::info!(path, "Loading directory seed");
                    InMemoryDirectory::from_json_file(path)?
                }
                None => {
                    tracing::warn!("In-memory backend without DIRECTORY_SEED_FILE: directory is empty");
                    InMemoryDirectory::new()
                }
            };
            tracing::warn!("Using in-memory storage: data is lost on restart");

            AppContext::builder()
                .with_config(config)
                .with_directory(Arc::new(directory))
                .with_in_memory_stores()
                .build()
        }
    }
}

/// Serve REST and realtime on already-bound listeners until one stops
pub async fn serve(ctx: AppContext, http: TcpListener, ws: TcpListener) -> Result<()> {
    let router = routes::create_router(Arc::new(ctx.clone()));
    let ws_server = realtime::run_websocket_server(ctx, ws);

    tokio::select! {
        result = axum::serve(http, router).into_future() => {
            result.context("HTTP server failed")?;
        }
        _ = ws_server => {
            tracing::warn!("WebSocket server stopped");
        }
    }
    Ok(())
}

/// Load config, bind both ports and run until Ctrl-C
pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let config = Arc::new(config);
    let ctx = build_context(config.clone()).await?;

    let http = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    let ws = TcpListener::bind(&config.ws_bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.ws_bind_address))?;
    tracing::info!(
        http = %config.bind_address,
        websocket = %config.ws_bind_address,
        backend = ?config.storage_backend,
        "Stayhub marketplace service listening"
    );

    tokio::select! {
        result = serve(ctx, http, ws) => result?,
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown signal received. Shutting down...");
        }
    }

    Ok(())
}
