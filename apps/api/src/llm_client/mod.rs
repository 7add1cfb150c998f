/// LLM client. The single point of entry for all Gemini API calls in CareerPath.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// Extraction, analysis and chat all go through `GeminiClient`.
///
/// Models are hardcoded per use case and are not configurable.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod prompts;
pub mod schema;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Fast multimodal model used for CV extraction.
pub const EXTRACTION_MODEL: &str = "gemini-2.5-flash";
/// Model used for the career analysis document.
pub const ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
/// Model used for the consultant chat.
pub const CHAT_MODEL: &str = "gemini-3-pro-preview";

const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
}

impl LlmError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingApiKey)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// A single turn (or system instruction) sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user"),
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::Text(text.into())])
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("model"),
            parts: vec![Part::Text(text.into())],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::Text(text.to_string())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

/// Base64-encoded binary payload (PDF, image) sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

/// Parameters for a single `generateContent` call.
#[derive(Debug, Clone, Copy)]
pub struct LlmRequest<'a> {
    pub model: &'a str,
    pub contents: &'a [Content],
    pub system: Option<&'a str>,
    /// When set, the response is constrained to JSON matching this schema.
    pub response_schema: Option<&'a Value>,
}

impl<'a> LlmRequest<'a> {
    pub fn new(model: &'a str, contents: &'a [Content]) -> Self {
        Self {
            model,
            contents,
            system: None,
            response_schema: None,
        }
    }

    pub fn system(mut self, system: &'a str) -> Self {
        self.system = Some(system);
        self
    }

    pub fn schema(mut self, schema: &'a Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    fn body(&self) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: self.contents,
            system_instruction: self.system.map(Content::system),
            generation_config: self.response_schema.map(|schema| GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: schema,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
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
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl LlmResponse {
    /// Concatenates the text parts of the first candidate, skipping thought parts.
    /// Returns `None` when there is no usable text.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client shared by every gateway.
/// Built once at startup and injected; holds no exclusive resources.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    missing_key_reported: Arc<AtomicBool>,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            missing_key_reported: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => {
                if !self.missing_key_reported.swap(true, Ordering::Relaxed) {
                    error!("Gemini API key is not configured; set GEMINI_API_KEY");
                }
                Err(LlmError::MissingApiKey)
            }
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Makes a single call to `generateContent`, returning the full response object.
    /// No retries: every failure is terminal for this attempt.
    pub async fn call(&self, request: LlmRequest<'_>) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", api_key)
            .json(&request.body())
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, candidate_tokens={}",
                request.model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(llm_response)
    }

    /// Calls the model and returns its text, failing with `EmptyContent` when none came back.
    pub async fn call_text(&self, request: LlmRequest<'_>) -> Result<String, LlmError> {
        self.call(request).await?.text().ok_or(LlmError::EmptyContent)
    }

    /// Calls the model with a response schema and parses the text strictly as JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        request: LlmRequest<'_>,
        schema: &Value,
    ) -> Result<T, LlmError> {
        let text = self.call_text(request.schema(schema)).await?;
        serde_json::from_str(&text).map_err(LlmError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(
            api_key.map(String::from),
            "http://127.0.0.1:9/",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_uses_gemini_field_names() {
        let contents = vec![Content::user(vec![
            Part::InlineData(InlineData {
                mime_type: "application/pdf".into(),
                data: "QUJD".into(),
            }),
            Part::Text("Extract".into()),
        ])];
        let schema = json!({"type": "OBJECT"});
        let request = LlmRequest::new(EXTRACTION_MODEL, &contents)
            .system("Be precise")
            .schema(&schema);

        let body = serde_json::to_value(request.body()).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "QUJD");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "Extract");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be precise");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_plain_request_omits_optional_sections() {
        let contents = vec![Content::user_text("hello")];
        let body = serde_json::to_value(LlmRequest::new(CHAT_MODEL, &contents).body()).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_concatenates_parts_and_skips_thoughts() {
        let response: LlmResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "{\"name\":"},
                        {"text": "\"Jane\"}"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"name\":\"Jane\"}"));
    }

    #[test]
    fn test_response_without_text_is_none() {
        let blocked: LlmResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(blocked.text().is_none());

        let empty: LlmResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());

        let whitespace: LlmResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "  "}]}}]
        }))
        .unwrap();
        assert!(whitespace.text().is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            client(Some("k")).endpoint("gemini-2.5-flash"),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let llm = client(None);
        assert!(!llm.has_api_key());
        let contents = vec![Content::user_text("hi")];
        let err = llm
            .call(LlmRequest::new(CHAT_MODEL, &contents))
            .await
            .unwrap_err();
        assert!(err.is_configuration());

        // Reported once, still an error on every later use.
        let err = llm
            .call(LlmRequest::new(CHAT_MODEL, &contents))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(!client(Some("   ")).has_api_key());
    }
}
