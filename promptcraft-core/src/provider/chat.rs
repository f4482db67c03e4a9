//! OpenAI-compatible chat completions provider
//!
//! Used for xAI (grok), and works with any other endpoint that speaks the
//! `/chat/completions` dialect. Instructions become the system message and
//! the input becomes a single user message.

use super::*;

pub struct ChatCompletionsProvider {
    client: Client,
    config: ProviderConfig,
}

impl ChatCompletionsProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

impl TextProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        self.config.provider_type.as_str()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn respond(&self, request: TextRequest) -> Result<TextResponse> {
        let api_request = ChatRequest::from_request(&request, self.default_model());
        tracing::debug!(
            provider = self.name(),
            model = %api_request.model,
            messages = api_request.messages.len(),
            "sending chat completion"
        );

        let req = self.client
            .post(format!("{}/chat/completions", self.base_url()))
            .json(&api_request);
        let response = send(authorize(req, &self.config), "chat::complete").await?;
        let api_response: ChatResponse = decode(response, "chat::complete").await?;

        api_response
            .into_text_response()
            .map_err(|e| e.with_operation("chat::complete"))
    }
}

// ============================================================================
// Chat Completions API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<ReasoningEffort>,
    stream: bool,
}

impl ChatRequest {
    fn from_request(request: &TextRequest, default_model: &str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = request.instructions.as_deref().filter(|i| !i.is_empty()) {
            messages.push(ChatMessage {
                role: "system".into(),
                content: Some(instructions.to_string()),
            });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: Some(request.input.clone()),
        });

        Self {
            model: request.model.clone().unwrap_or_else(|| default_model.to_string()),
            messages,
            reasoning_effort: request.reasoning_effort,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl ChatResponse {
    fn into_text_response(self) -> Result<TextResponse> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::parse_failed("no choices in response").with_context("response_id", self.id.clone()))?;

        let text = choice.message.content.unwrap_or_default();
        if text.is_empty() {
            return Err(Error::parse_failed("choice has no content")
                .with_context("response_id", self.id.clone())
                .with_context("finish_reason", choice.finish_reason.unwrap_or_default()));
        }

        Ok(TextResponse {
            id: self.id,
            model: self.model.unwrap_or_default(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_messages_from_request() {
        let request = TextRequest::new("What is the meaning of life?").with_instructions("Be brief.");
        let body = serde_json::to_value(ChatRequest::from_request(&request, "grok-4")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "model": "grok-4",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "What is the meaning of life?"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn test_no_system_message_without_instructions() {
        let request = TextRequest::new("hi").with_reasoning_effort(ReasoningEffort::High);
        let body = serde_json::to_value(ChatRequest::from_request(&request, "grok-3-mini")).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["reasoning_effort"], "high");
    }

    #[test]
    fn test_decode_choice() {
        let raw: ChatResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "grok-4",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "42"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
        }))
        .unwrap();

        let response = raw.into_text_response().unwrap();
        assert_eq!(response.text, "42");
        assert_eq!(response.model, "grok-4");
    }

    #[test]
    fn test_decode_without_choices() {
        let raw: ChatResponse = serde_json::from_str(r#"{"id": "chatcmpl-2", "choices": []}"#).unwrap();
        let err = raw.into_text_response().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
        assert_eq!(err.context_value("response_id"), Some("chatcmpl-2"));
    }
}
