//! Wire types for the foliod HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/chat`. The caller identity travels in the
/// `x-folio-user` header, injected by the auth middleware in front of
/// foliod, never in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response of `POST /v1/chat`. Always present for a well-formed request:
/// the cascade is total and every path terminates in a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Response of `GET /v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
