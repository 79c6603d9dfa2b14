//! LLM fallback orchestrator.
//!
//! Last resolution tier of the cascade: a primary chat-completion attempt,
//! one retry against a secondary model, and a static heuristic floor that
//! performs no I/O. `LlmClient::fallback` never fails — every path ends in
//! a user-facing string.

pub mod client;
pub mod heuristic;

pub use client::{LlmClient, NOT_CONFIGURED_MSG};
