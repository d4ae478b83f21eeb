/// LLM client: the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may call the generative-language API directly.
/// Handlers depend on the `TextGenerator` trait carried in `AppState`; `LlmClient` is the
/// production implementation.
///
/// Calls are never retried here. A request that exceeds the configured timeout fails with
/// `LlmError::Timeout` and the client decides whether to try again.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Generative API did not respond in time")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(e)
        }
    }
}

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Part::Text(s.into())
    }

    /// Binary attachment; `data` must already be base64.
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData(InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: &'a [Part],
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anything that can turn a prompt into model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: Option<&str>, parts: Vec<Part>) -> Result<String, LlmError>;
}

/// The single generative-model client used by all services.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }

    /// Makes one call to `generateContent`, returning the full response object.
    pub async fn call(
        &self,
        system: Option<&str>,
        parts: &[Part],
    ) -> Result<GenerateResponse, LlmError> {
        let request_body = build_request(system, parts);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generative API returned {status}");
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, system: Option<&str>, parts: Vec<Part>) -> Result<String, LlmError> {
        let response = self.call(system, &parts).await?;
        response.text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            warn!("Generative API returned no text (finish reason: {reason})");
            LlmError::EmptyContent
        })
    }
}

fn build_request<'a>(system: Option<&str>, parts: &'a [Part]) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![RequestContent {
            role: "user",
            parts,
        }],
        system_instruction: system.map(|s| SystemInstruction {
            parts: vec![Part::text(s)],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_text_and_inline_parts() {
        let parts = vec![
            Part::text("Analyze this"),
            Part::inline("application/pdf", "JVBERi0="),
        ];
        let body = serde_json::to_value(build_request(Some("Be terse."), &parts)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Analyze this" },
                        { "inlineData": { "mimeType": "application/pdf", "data": "JVBERi0=" } }
                    ]
                }],
                "systemInstruction": { "parts": [{ "text": "Be terse." }] }
            })
        );
    }

    #[test]
    fn test_request_without_system_omits_field() {
        let parts = vec![Part::text("hi")];
        let body = serde_json::to_value(build_request(None, &parts)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text_joins_first_candidate_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }], "role": "model" },
                  "finishReason": "STOP" },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ],
            "usageMetadata": { "promptTokenCount": 5, "candidatesTokenCount": 2 }
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_response_without_text_is_none() {
        let blocked: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(blocked.text().is_none());

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = LlmClient::new(
            "key".into(),
            "gemini-1.5-flash".into(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(client
            .endpoint()
            .ends_with("/models/gemini-1.5-flash:generateContent"));
    }
}
