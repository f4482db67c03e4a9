//! Provider configuration and credentials
//!
//! The API key is read once at process start and handed to each client inside
//! a [`ProviderConfig`]; nothing reads credentials from ambient state later.

use crate::error::{Error, Result};
use std::path::Path;

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Endpoint, credentials and defaults for one remote service
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub api_key: String,
    pub base_url: String,
    /// Used when a request names no model
    pub default_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    XAI,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::XAI => "xai",
        }
    }
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            default_model: "gpt-5-nano".into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// xAI speaks the OpenAI chat-completions dialect
    pub fn xai(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::XAI,
            api_key: api_key.into(),
            base_url: "https://api.x.ai/v1".into(),
            default_model: "grok-4".into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

/// Read an API key from `path`, trimming surrounding whitespace.
pub fn load_api_key(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::credentials_missing(path.display().to_string())
            .with_operation("config::load_api_key")
            .set_source(e)
    })?;

    let key = raw.trim();
    if key.is_empty() {
        return Err(Error::credentials_missing(path.display().to_string())
            .with_operation("config::load_api_key"));
    }
    Ok(key.to_string())
}
