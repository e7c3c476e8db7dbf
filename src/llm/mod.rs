//! LLM domain — the single reasoning call behind every diagnosis.
//!
//! External code should only use what is exported here.
//!
//! Providers:
//!   - Groq, OpenAI-compatible chat completions (groq.rs, default)
//!   - Anthropic Messages API (anthropic.rs)
//!   - Google Gemini generateContent (gemini.rs)
//!
//! Shared:
//!   - prompts.rs  — instruction templates + evidence framing
//!   - provider.rs — provider metadata

pub mod anthropic;
pub mod gemini;
pub mod groq;
pub mod prompts;
pub mod provider;

pub use provider::{ProviderId, ProviderInfo};

use crate::config::Config;
use std::future::Future;
use std::time::Duration;

/// One stateless request to a hosted model.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Variant system prompt.
    pub instructions: &'a str,
    /// Evidence message built by the request builder.
    pub evidence: &'a str,
    pub max_tokens: u32,
}

/// Temperature sent with every request.
pub const TEMPERATURE: f32 = 0.0;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{0} is not set")]
    NotConfigured(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response had no text content")]
    NoContent,
}

// Request URLs never reach error text; some endpoints carry credentials there.
impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e.without_url())
    }
}

/// Anything that can turn instructions + evidence into raw model text.
///
/// The output is untrusted; callers validate it before use. Tests substitute
/// their own implementation for the hosted services.
pub trait ReasoningService {
    fn name(&self) -> &str;

    fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> impl Future<Output = Result<String, LlmError>>;
}

/// The hosted provider selected at startup.
#[derive(Debug)]
pub enum Provider {
    Groq(groq::GroqClient),
    Anthropic(anthropic::AnthropicClient),
    Gemini(gemini::GeminiClient),
}

impl Provider {
    /// Build the configured provider. A missing API key is not an error here:
    /// the call fails at request time and the caller falls back.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let http = http_client(config.timeout)?;
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| config.provider.default_model().to_string());
        let api_key = config.api_key(config.provider);

        log::info!("[LLM] Provider: {}", config.provider);
        log::info!("[LLM] Model: {}", model);

        Ok(match config.provider {
            ProviderId::Groq => Provider::Groq(groq::GroqClient::new(http, api_key, model)),
            ProviderId::Anthropic => {
                Provider::Anthropic(anthropic::AnthropicClient::new(http, api_key, model))
            }
            ProviderId::Gemini => Provider::Gemini(gemini::GeminiClient::new(http, api_key, model)),
        })
    }
}

impl ReasoningService for Provider {
    fn name(&self) -> &str {
        match self {
            Provider::Groq(_) => "groq",
            Provider::Anthropic(_) => "anthropic",
            Provider::Gemini(_) => "gemini",
        }
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        match self {
            Provider::Groq(c) => c.complete(request).await,
            Provider::Anthropic(c) => c.complete(request).await,
            Provider::Gemini(c) => c.complete(request).await,
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Shorten an error body for logs and error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

/// Turn a non-2xx response into [`LlmError::Status`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::error!("[LLM] API returned {}: {}", status, truncate_body(&body));
    Err(LlmError::Status {
        status: status.as_u16(),
        body: truncate_body(&body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("bad request"), "bad request");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert_eq!(cut.chars().count(), 201);
        assert!(cut.ends_with('…'));
    }
}
