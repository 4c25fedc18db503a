use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, warn};

use crate::cache::AnalyticsCache;
use crate::commands;
use crate::config::ServerConfig;

/// State shared by every request handler.
pub struct AppState {
    pub config: ServerConfig,
    pub cache: AnalyticsCache,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            cache: AnalyticsCache::default(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/analytics/excel",
            get(commands::analytics::analytics_excel),
        )
        .route(
            "/api/inventory/add",
            post(commands::inventory::inventory_add),
        )
        .route(
            "/api/inventory/:id/edit",
            post(commands::inventory::inventory_edit),
        )
        .route("/api/health", get(commands::system::health))
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if !config.data_dir.is_dir() {
        warn!(
            data_dir = %config.data_dir.display(),
            "Data directory does not exist; analytics requests will fail until it is populated"
        );
    }

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("bind {bind_addr}"))?;

    info!("Listening on http://{bind_addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
