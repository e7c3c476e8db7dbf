//! Groq — OpenAI-compatible chat completions.
//!
//! Non-streaming: the whole diagnosis waits on one response anyway.

use super::{check_status, CompletionRequest, LlmError, TEMPERATURE};
use crate::config::ApiKey;
use serde::{Deserialize, Serialize};

pub const API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Debug)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl GroqClient {
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
            .ok_or(LlmError::NotConfigured("GROQ_API_KEY"))?;

        let start = std::time::Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.expose())
            .json(&build_request(&self.model, request))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: ChatResponse = response.json().await?;

        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());
        extract_text(body)
    }
}

fn build_request<'a>(model: &'a str, request: &CompletionRequest<'a>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [
            ChatMessage {
                role: "system",
                content: request.instructions,
            },
            ChatMessage {
                role: "user",
                content: request.evidence,
            },
        ],
        temperature: TEMPERATURE,
        max_tokens: request.max_tokens,
    }
}

fn extract_text(body: ChatResponse) -> Result<String, LlmError> {
    if let Some(usage) = &body.usage {
        log::info!(
            "[LLM] Input tokens: {}, output tokens: {}",
            usage.prompt_tokens,
            usage.completion_tokens
        );
    }
    let choice = body.choices.into_iter().next().ok_or(LlmError::NoContent)?;
    if choice.finish_reason.as_deref() == Some("length") {
        log::warn!("[LLM] Response hit the token ceiling and is likely truncated");
    }
    choice.message.content.ok_or(LlmError::NoContent)
}
