//! Configuration management for foliod.
//!
//! Loads settings from /etc/folio/config.toml (override with FOLIO_CONFIG)
//! or uses defaults. The LLM section is handed to the fallback orchestrator
//! as a plain injected object so tests can construct it directly instead of
//! probing ambient process state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/folio/config.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7410".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// CRM store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "/var/lib/folio/crm.db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// LLM fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// First model attempted for unmatched messages
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Retry model when the primary attempt fails
    #[serde(default = "default_secondary_model")]
    pub secondary_model: String,

    /// Chat-completions base URL (OpenAI-compatible)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. None disables the external tiers entirely; the orchestrator
    /// answers with its fixed "not configured" message instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Completion token cap per attempt
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_primary_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_secondary_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    20
}

fn default_max_tokens() -> u32 {
    400
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            primary_model: default_primary_model(),
            secondary_model: default_secondary_model(),
            api_url: default_api_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Config with no key, for tests and key-less deployments.
    pub fn unconfigured() -> Self {
        Self::default()
    }
}

/// Top-level foliod configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl FolioConfig {
    /// Load configuration, falling back to defaults when the file is
    /// missing. FOLIO_API_KEY overrides the file-provided key so deployments
    /// can keep secrets out of the config file.
    pub fn load() -> Result<Self> {
        let path = std::env::var("FOLIO_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string());
        let mut config = Self::load_from(Path::new(&path))?;

        if let Ok(key) = std::env::var("FOLIO_API_KEY") {
            if !key.trim().is_empty() {
                config.llm.api_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Load from a specific path; missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_missing() {
        let config = FolioConfig::load_from(Path::new("/nonexistent/folio.toml")).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:7410");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.request_timeout_secs, 20);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nprimary_model = \"gpt-4o\"").unwrap();

        let config = FolioConfig::load_from(file.path()).unwrap();
        assert_eq!(config.llm.primary_model, "gpt-4o");
        assert_eq!(config.llm.secondary_model, "gpt-3.5-turbo");
        assert_eq!(config.store.db_path, "/var/lib/folio/crm.db");
    }
}
