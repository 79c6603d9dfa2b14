//! Shared types for Folio Chat.
//!
//! Wire types exchanged between foliod and folioctl, the read-only CRM
//! entity projections consumed at the store boundary, and the error
//! taxonomy.

pub mod entities;
pub mod error;
pub mod rpc;

pub use entities::{ClientSummary, LeadSummary, MeetingSummary, ProjectSummary};
pub use error::FolioError;
pub use rpc::{ChatReply, ChatRequest, HealthResponse};
