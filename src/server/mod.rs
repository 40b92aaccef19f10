//! Local JSON API over the search, history, editor and directory services.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;

use crate::core::config::AppConfig;
use crate::core::errors::Result;
use crate::services::search::SearchRunner;
use crate::services::store::{EditorSettingsStore, HistoryStore};

pub const DEFAULT_BIND: &str = "127.0.0.1:5170";

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<SearchRunner>,
    pub settings: Arc<Mutex<EditorSettingsStore>>,
    pub history: Arc<Mutex<HistoryStore>>,
}

impl AppState {
    pub fn new(runner: SearchRunner, settings: EditorSettingsStore, history: HistoryStore) -> Self {
        Self {
            runner: Arc::new(runner),
            settings: Arc::new(Mutex::new(settings)),
            history: Arc::new(Mutex::new(history)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            config.runner(),
            EditorSettingsStore::load(config.settings_path()?),
            HistoryStore::load(config.history_path()?, config.history_limit),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/search", post(handlers::search))
        .route(
            "/api/history",
            get(handlers::list_history).delete(handlers::clear_history),
        )
        .route(
            "/api/history/:id",
            get(handlers::get_history_entry).delete(handlers::remove_history_entry),
        )
        .route("/api/history/:id/rerun", post(handlers::rerun_history_entry))
        .route(
            "/api/editor/settings",
            get(handlers::get_editor_settings).put(handlers::put_editor_settings),
        )
        .route("/api/editor/availability", get(handlers::editor_availability))
        .route("/api/editor/open", post(handlers::open_in_editor))
        .route("/api/dirs/common", get(handlers::common_directories))
        .route("/api/dirs/list", get(handlers::list_directories))
        .route("/api/dirs/parent", get(handlers::parent_directory))
        .with_state(state)
}

/// Serves the API until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("api server stopped unexpectedly")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
