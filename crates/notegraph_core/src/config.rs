//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve the note store path.
//! - Resolve extraction service settings.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Secrets are never included in `Debug` output or logs.

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "NOTEGRAPH_DB_PATH";
pub const API_KEY_ENV: &str = "NOTEGRAPH_LLM_API_KEY";
pub const API_KEY_FALLBACK_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "NOTEGRAPH_LLM_BASE_URL";
pub const MODEL_ENV: &str = "NOTEGRAPH_LLM_MODEL";
pub const TIMEOUT_ENV: &str = "NOTEGRAPH_LLM_TIMEOUT_SECS";

const DEFAULT_DB_FILE_NAME: &str = "notegraph.sqlite3";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Returns `NOTEGRAPH_DB_PATH`, or `notegraph.sqlite3` in the temp dir.
pub fn resolve_db_path() -> PathBuf {
    db_path_from_lookup(env_lookup)
}

pub fn db_path_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    match non_blank(lookup(DB_PATH_ENV)) {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
    }
}

/// Settings for the chat-completions extraction client.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Debug for ExtractionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ExtractionConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Reads settings through `lookup`; unparsable timeouts fall back to the
    /// default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = non_blank(lookup(API_KEY_ENV)).or_else(|| non_blank(lookup(API_KEY_FALLBACK_ENV)));
        let base_url = non_blank(lookup(BASE_URL_ENV))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = non_blank(lookup(MODEL_ENV)).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout = non_blank(lookup(TIMEOUT_ENV))
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    /// Chat-completions endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
