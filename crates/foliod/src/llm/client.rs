//! Chat-completion client with a two-model retry chain.
//!
//! OpenAI-compatible wire shape: POST {api_url}/chat/completions with a
//! system/user message pair, a token cap, and a bearer key. Each attempt
//! carries its own bounded timeout so a hung provider cannot stall the
//! request; after both attempts fail, control passes to the heuristic tier.

use crate::config::LlmConfig;
use crate::llm::heuristic;
use folio_shared::FolioError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Terminal answer when no API key is configured. Not an error: key-less
/// deployments are a recognized state.
pub const NOT_CONFIGURED_MSG: &str =
    "AI is not configured. Set a Folio API key to enable smart replies.";

/// Completions shorter than this get a pointer to the structured queries
/// appended, to avoid unhelpfully terse replies.
const MIN_REPLY_LEN: usize = 40;

const HELP_SUFFIX: &str = "You can also ask me about your clients, projects, meetings, or leads.";

const PRIMARY_SYSTEM_PROMPT: &str = "You are the assistant inside the Folio CRM. Answer briefly \
and helpfully. You may answer general questions, but steer CRM questions (clients, projects, \
meetings, leads) toward concrete next steps.";

const SECONDARY_SYSTEM_PROMPT: &str = "You are a concise CRM assistant. Answer the user's \
question in one or two short sentences.";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// LLM client over an injected configuration. A missing key is not a
/// construction error; it short-circuits `fallback` instead.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Build the client. Fails only when the underlying HTTP client cannot
    /// be constructed; the per-attempt timeout is set here and must never
    /// be silently dropped.
    pub fn new(config: LlmConfig) -> Result<Self, FolioError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FolioError::Provider(format!("HTTP client construction failed: {}", e)))?;
        Ok(Self { http, config })
    }

    /// Resolve a message through the external tiers. Always returns a
    /// string: not-configured message, a completion, or the heuristic floor.
    pub async fn fallback(&self, message: &str) -> String {
        let key = match self.config.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => k,
            _ => return NOT_CONFIGURED_MSG.to_string(),
        };

        match self
            .complete(&self.config.primary_model, PRIMARY_SYSTEM_PROMPT, message, key)
            .await
        {
            Ok(text) => return finalize(text),
            Err(e) => warn!("Primary model {} failed: {}", self.config.primary_model, e),
        }

        match self
            .complete(&self.config.secondary_model, SECONDARY_SYSTEM_PROMPT, message, key)
            .await
        {
            Ok(text) => finalize(text),
            Err(e) => {
                warn!(
                    "Secondary model {} failed: {}, using heuristic reply",
                    self.config.secondary_model, e
                );
                heuristic::canned_reply(message)
            }
        }
    }

    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_message: &str,
        api_key: &str,
    ) -> Result<String, FolioError> {
        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
        };

        info!("LLM call [{}]", model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FolioError::Provider(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FolioError::Provider(format!("returned {}: {}", status, body)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| FolioError::Provider(format!("malformed response: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(FolioError::Provider("empty completion".to_string()));
        }

        Ok(text)
    }
}

fn finalize(text: String) -> String {
    if text.len() < MIN_REPLY_LEN {
        format!("{} {}", text, HELP_SUFFIX)
    } else {
        text
    }
}
