//! # Remote Service Interface
//!
//! Trait-based access to the hosted generative-AI services.
//!
//! ## Design
//! - `TextProvider`: one request (instructions + input) in, one text out
//! - `VideoService`: submit / retrieve / download / list generation jobs
//! - Implementations for the OpenAI Responses API, OpenAI-compatible chat
//!   completions (xAI) and the OpenAI Videos API
//! - Every response body is decoded once, here, into explicit types

pub mod chat;
pub mod responses;
pub mod videos;

pub use chat::ChatCompletionsProvider;
pub use responses::ResponsesProvider;
pub use videos::OpenAIVideoService;

use crate::config::ProviderConfig;
use crate::error::{self, Error, Result};
use crate::job::{Job, Submission};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Core Types
// ============================================================================

/// Hint for how much reasoning the model should spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "minimal",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl std::str::FromStr for ReasoningEffort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(ReasoningEffort::Minimal),
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(Error::invalid_argument(format!(
                "unknown reasoning effort '{}' (expected minimal, low, medium or high)",
                other
            ))),
        }
    }
}

/// Request parameters for a single text generation
#[derive(Debug, Clone, Default)]
pub struct TextRequest {
    pub model: Option<String>,
    pub instructions: Option<String>,
    pub input: String,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl TextRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }
}

/// Decoded result of a text generation
#[derive(Debug, Clone, PartialEq)]
pub struct TextResponse {
    pub id: String,
    pub model: String,
    pub text: String,
}

// ============================================================================
// Provider Traits
// ============================================================================

/// A stateless text generation endpoint
#[allow(async_fn_in_trait)]
pub trait TextProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "xai")
    fn name(&self) -> &str;

    /// Model used when the request names none
    fn default_model(&self) -> &str;

    /// Send one request and wait for the full response
    async fn respond(&self, request: TextRequest) -> Result<TextResponse>;
}

/// A job-oriented video generation endpoint
#[allow(async_fn_in_trait)]
pub trait VideoService: Send + Sync {
    /// Issue exactly one creation request
    async fn submit(&self, submission: &Submission) -> Result<Job>;

    /// Re-fetch a job by id
    async fn retrieve(&self, video_id: &str) -> Result<Job>;

    /// Write the job's binary content to `dest`, returning the byte count
    async fn download(&self, video_id: &str, variant: &str, dest: &Path) -> Result<u64>;

    /// Jobs known to the service, newest first
    async fn list(&self) -> Result<Vec<Job>>;
}

// ============================================================================
// Shared HTTP plumbing
// ============================================================================

pub(crate) fn build_client(config: &ProviderConfig) -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| {
            Error::unexpected("failed to create HTTP client")
                .with_operation("provider::build_client")
                .set_source(e)
        })
}

/// Attach bearer auth
pub(crate) fn authorize(req: RequestBuilder, config: &ProviderConfig) -> RequestBuilder {
    req.bearer_auth(&config.api_key)
}

/// Send and turn transport failures and non-2xx answers into errors.
pub(crate) async fn send(req: RequestBuilder, operation: &'static str) -> Result<Response> {
    let response = req
        .send()
        .await
        .map_err(|e| error::network(e).with_operation(operation))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(&body).unwrap_or(body);
        return Err(error::from_status(status.as_u16(), message).with_operation(operation));
    }
    Ok(response)
}

/// Read the body and decode it as `T`.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response, operation: &'static str) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| error::network(e).with_operation(operation))?;
    serde_json::from_str(&body).map_err(|e| error::parse(e).with_operation(operation))
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// `{"error": {"message": ...}}` -> message
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_builder() {
        let request = TextRequest::new("ping")
            .with_model("gpt-5-nano")
            .with_instructions("Reply with OK.")
            .with_reasoning_effort(ReasoningEffort::Low);

        assert_eq!(request.input, "ping");
        assert_eq!(request.model.as_deref(), Some("gpt-5-nano"));
        assert_eq!(request.instructions.as_deref(), Some("Reply with OK."));
        assert_eq!(request.reasoning_effort, Some(ReasoningEffort::Low));
    }

    #[test]
    fn test_reasoning_effort_parse() {
        assert_eq!("HIGH".parse::<ReasoningEffort>().unwrap(), ReasoningEffort::High);
        assert_eq!(" minimal ".parse::<ReasoningEffort>().unwrap(), ReasoningEffort::Minimal);
        assert!("max".parse::<ReasoningEffort>().is_err());
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"message": "Invalid size", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body).as_deref(), Some("Invalid size"));
        assert_eq!(api_error_message("<html>bad gateway</html>"), None);
        assert_eq!(api_error_message(r#"{"error": {"message": ""}}"#), None);
    }
}
