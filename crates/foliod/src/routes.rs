//! API routes for foliod.

use crate::server::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use folio_shared::{ChatReply, ChatRequest, HealthResponse};
use std::sync::Arc;
use tracing::info;

type AppStateArc = Arc<AppState>;

/// Header the auth middleware in front of foliod sets to the authenticated
/// user id. The chat core trusts it; authentication itself is out of scope.
pub const USER_HEADER: &str = "x-folio-user";

/// Boundary limit on the chat message, in characters.
const MAX_MESSAGE_CHARS: usize = 500;

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/chat", post(chat))
}

/// The chat endpoint. Malformed requests get a 400; every well-formed
/// request gets a 200 with a reply string — the cascade is total, so no
/// internal failure maps to a 5xx.
async fn chat(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, String)> {
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or((
            StatusCode::BAD_REQUEST,
            format!("Missing {} header", USER_HEADER),
        ))?;

    let message = req.message.trim();
    if message.is_empty() || message.chars().count() > MAX_MESSAGE_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Message must be 1-{} characters", MAX_MESSAGE_CHARS),
        ));
    }

    info!("Chat request ({} chars)", message.chars().count());
    let reply = state.cascade.answer(message, user_id).await;
    Ok(Json(ChatReply { reply }))
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
