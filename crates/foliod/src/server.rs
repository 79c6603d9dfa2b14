//! HTTP server for foliod.

use crate::cascade::Cascade;
use crate::config::FolioConfig;
use crate::llm::LlmClient;
use crate::routes;
use crate::store::CrmStore;
use anyhow::{Context, Result};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub cascade: Cascade,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(cascade: Cascade) -> Self {
        Self {
            cascade,
            start_time: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(config: FolioConfig) -> Result<()> {
    let store = CrmStore::open(Path::new(&config.store.db_path))
        .with_context(|| format!("Failed to open CRM store at {}", config.store.db_path))?;

    if config.llm.api_key.is_none() {
        info!("No API key configured, LLM tiers disabled");
    }
    let llm = LlmClient::new(config.llm.clone()).context("Failed to construct LLM client")?;

    let state = Arc::new(AppState::new(Cascade::new(store, llm)));

    let app = Router::new()
        .merge(routes::chat_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
