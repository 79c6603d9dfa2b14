//! Read-only CRM entity projections.
//!
//! These are the typed records the cascade consumes at the store boundary.
//! The chat core never mutates them; writes belong to the CRUD layer. Every
//! projection carries the owning `user_id` so callers can assert the
//! tenancy scope they queried under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client as seen by the chat cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    /// Absence is a normal state, not an error: the address resolver
    /// renders a distinct "no address on file" answer for it.
    pub address: Option<String>,
    pub pitch_status: String,
    pub user_id: String,
}

/// A project as seen by the chat cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    /// Owning client, when the project is attached to one. Used only for
    /// best-effort answer enrichment.
    pub client_id: Option<String>,
    pub user_id: String,
}

/// A meeting as seen by the chat cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub id: String,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub user_id: String,
}

/// A lead as seen by the chat cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub status: String,
    pub priority: String,
    /// Assigned owner, rendered as "unassigned" when absent.
    pub owner: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}
