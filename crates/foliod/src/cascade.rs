//! Cascade controller: the only entry point the HTTP layer calls.
//!
//! Strict tier order with short-circuit on first success: intent resolver,
//! then structured dispatcher (gated on a CRM keyword), then LLM fallback.
//! A resolver answer is always final, including "not found" — a classifier
//! hit never falls through to the later tiers. Store failures degrade to
//! the heuristic tier so the contract stays total: every call returns a
//! string, never an error.

use crate::classifier::{self, Intent};
use crate::dispatcher;
use crate::llm::{heuristic, LlmClient};
use crate::resolvers;
use crate::store::CrmStore;
use tracing::{error, info};

/// Entity substitute when a ClientAddress message yields no extractable
/// name; produces a deterministic not-found echo.
const DEFAULT_CLIENT_NAME: &str = "client";

/// Gate for the dispatcher tier: the message must superficially look
/// CRM-related before we spend store reads on it.
const CRM_KEYWORDS: &[&str] = &[
    "client", "project", "meeting", "lead", "crm", "status", "summary", "statistics", "stats",
];

pub struct Cascade {
    store: CrmStore,
    llm: LlmClient,
}

impl Cascade {
    pub fn new(store: CrmStore, llm: LlmClient) -> Self {
        Self { store, llm }
    }

    /// Answer a chat message for the given user. Total: every branch
    /// terminates in a natural-language string.
    pub async fn answer(&self, message: &str, user_id: &str) -> String {
        let intent = classifier::classify(message);

        if intent != Intent::General {
            info!("Intent {} matched, resolving directly", intent);
            let result = match intent {
                Intent::ClientAddress => {
                    let name = classifier::extract_entity_name(message)
                        .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());
                    resolvers::resolve_client_address(&self.store, &name, user_id).await
                }
                Intent::ProjectToday => {
                    resolvers::resolve_project_today(&self.store, user_id).await
                }
                Intent::LeadsThisWeek => {
                    resolvers::resolve_leads_this_week(&self.store, user_id).await
                }
                Intent::LeadStatus => {
                    resolvers::resolve_lead_status(&self.store, message, user_id).await
                }
                Intent::General => unreachable!("general intent has no resolver"),
            };

            // Resolver answers are final, even "not found". Only a store
            // failure degrades further.
            return match result {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Resolver for {} failed: {:#}", intent, e);
                    heuristic::canned_reply(message)
                }
            };
        }

        if looks_crm_related(message) {
            match dispatcher::dispatch(&self.store, message, user_id).await {
                Ok(Some(reply)) => return reply,
                Ok(None) => {}
                Err(e) => {
                    error!("Dispatcher failed: {:#}", e);
                    return heuristic::canned_reply(message);
                }
            }
        }

        self.llm.fallback(message).await
    }
}

fn looks_crm_related(message: &str) -> bool {
    let m = message.to_lowercase();
    CRM_KEYWORDS.iter().any(|k| m.contains(k))
}
