//! Anthropic Messages API.

use super::{check_status, CompletionRequest, LlmError, TEMPERATURE};
use crate::config::ApiKey;

pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

#[derive(Debug)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: Option<ApiKey>,
    model: String,
}

impl AnthropicClient {
    pub fn new(http: reqwest::Client, api_key: Option<ApiKey>, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(LlmError::NotConfigured("ANTHROPIC_API_KEY"))?;

        let start = std::time::Instant::now();
        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&build_body(&self.model, request))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: serde_json::Value = response.json().await?;

        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());
        extract_text(&body).ok_or(LlmError::NoContent)
    }
}

fn build_body(model: &str, request: &CompletionRequest<'_>) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "temperature": TEMPERATURE,
        "system": request.instructions,
        "messages": [
            {"role": "user", "content": request.evidence}
        ]
    })
}

fn extract_text(body: &serde_json::Value) -> Option<String> {
    if let Some(usage) = body.get("usage") {
        log::info!(
            "[LLM] Input tokens: {}, output tokens: {}",
            usage["input_tokens"].as_u64().unwrap_or(0),
            usage["output_tokens"].as_u64().unwrap_or(0)
        );
    }
    if body["stop_reason"].as_str() == Some("max_tokens") {
        log::warn!("[LLM] Response hit the token ceiling and is likely truncated");
    }
    body["content"][0]["text"].as_str().map(|s| s.to_string())
}
