//! Folio Chat daemon.
//!
//! Serves the CRM chat endpoint and routes each message through the
//! resolution cascade: intent resolvers, structured dispatcher, LLM
//! fallback, heuristic floor.

use anyhow::Result;
use foliod::{config::FolioConfig, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("foliod v{} starting", env!("CARGO_PKG_VERSION"));

    let config = FolioConfig::load()?;
    server::run(config).await
}
