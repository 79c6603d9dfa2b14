//! Error types for Folio Chat.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
