//! Gemini Flash via Google AI `generateContent`.
//!
//! Key differences from the other providers:
//! - API key in the `x-goog-api-key` header
//! - `responseMimeType: "application/json"` asks for bare JSON
//! - Text in `candidates[0].content.parts[0].text`
//! - Token usage in `usageMetadata`

use super::{check_status, CompletionRequest, LlmError, TEMPERATURE};
use crate::config::ApiKey;

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: Option<ApiKey>, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url: API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(LlmError::NotConfigured("GEMINI_API_KEY"))?;

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let start = std::time::Instant::now();
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key.expose())
            .header("content-type", "application/json")
            .json(&build_body(request))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: serde_json::Value = response.json().await?;

        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());
        extract_text(&body).ok_or(LlmError::NoContent)
    }
}

fn build_body(request: &CompletionRequest<'_>) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": [{"text": request.evidence}]
            }
        ],
        "systemInstruction": {
            "parts": [{"text": request.instructions}]
        },
        "generationConfig": {
            "maxOutputTokens": request.max_tokens,
            "temperature": TEMPERATURE,
            "responseMimeType": "application/json"
        }
    })
}

fn extract_text(body: &serde_json::Value) -> Option<String> {
    if let Some(usage) = body.get("usageMetadata") {
        log::info!(
            "[LLM] Input tokens: {}, output tokens: {}",
            usage["promptTokenCount"].as_u64().unwrap_or(0),
            usage["candidatesTokenCount"].as_u64().unwrap_or(0)
        );
    }
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}
