//! OpenAI Responses API provider
//!
//! `POST /responses` with `{model, instructions, input, reasoning}`; the text
//! is gathered from the `output_text` parts of the returned message items.

use super::*;

pub struct ResponsesProvider {
    client: Client,
    config: ProviderConfig,
}

impl ResponsesProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

impl TextProvider for ResponsesProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn respond(&self, request: TextRequest) -> Result<TextResponse> {
        let body = ResponsesRequest::from_request(&request, self.default_model());
        tracing::debug!(
            model = %body.model,
            input_chars = body.input.len(),
            "sending responses request"
        );

        let req = self.client
            .post(format!("{}/responses", self.base_url()))
            .json(&body);
        let response = send(authorize(req, &self.config), "responses::create").await?;
        let raw: ResponsesResponse = decode(response, "responses::create").await?;

        raw.into_text_response()
            .map_err(|e| e.with_operation("responses::create"))
    }
}

// ============================================================================
// Responses API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ReasoningParam>,
}

#[derive(Debug, Serialize)]
struct ReasoningParam {
    effort: ReasoningEffort,
}

impl ResponsesRequest {
    fn from_request(request: &TextRequest, default_model: &str) -> Self {
        Self {
            model: request.model.clone().unwrap_or_else(|| default_model.to_string()),
            instructions: request.instructions.clone().filter(|i| !i.is_empty()),
            input: request.input.clone(),
            reasoning: request.reasoning_effort.map(|effort| ReasoningParam { effort }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    id: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

impl ResponsesResponse {
    fn into_text_response(self) -> Result<TextResponse> {
        let text = match self.output_text {
            Some(text) => text,
            None => self
                .output
                .iter()
                .filter(|item| item.kind == "message")
                .flat_map(|item| item.content.iter())
                .filter(|part| part.kind == "output_text")
                .filter_map(|part| part.text.as_deref())
                .collect(),
        };

        if text.is_empty() {
            let mut err = Error::parse_failed("response contained no output text")
                .with_context("response_id", self.id.clone());
            if let Some(status) = &self.status {
                err = err.with_context("status", status.clone());
            }
            if let Some(reason) = self.incomplete_details.and_then(|d| d.reason) {
                err = err.with_context("reason", reason);
            }
            return Err(err);
        }

        Ok(TextResponse {
            id: self.id,
            model: self.model.unwrap_or_default(),
            text,
        })
    }
}
