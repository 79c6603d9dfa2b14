//! Folio Chat daemon library.
//!
//! The conversational query resolution cascade behind the Folio CRM chat
//! endpoint. A free-text message is routed, in strict priority order,
//! through a deterministic intent classifier with dedicated resolvers, a
//! broader keyword-driven CRM dispatcher, and an LLM fallback chain with a
//! static heuristic floor. Cheap and deterministic first, expensive last;
//! every path terminates in a natural-language string.

pub mod cascade;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod llm;
pub mod resolvers;
pub mod routes;
pub mod server;
pub mod store;
