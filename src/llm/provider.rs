//! Provider metadata + configuration checks.
//!
//! Each hosted service WhatNext can talk to is listed here with the
//! environment variable holding its key and the model it uses by default.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Groq,
    Anthropic,
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::Groq, ProviderId::Anthropic, ProviderId::Gemini];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Groq => "groq",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
        }
    }

    pub fn env_key(self) -> &'static str {
        match self {
            ProviderId::Groq => "GROQ_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderId::Groq => super::groq::DEFAULT_MODEL,
            ProviderId::Anthropic => super::anthropic::DEFAULT_MODEL,
            ProviderId::Gemini => super::gemini::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(ProviderId::Groq),
            "anthropic" => Ok(ProviderId::Anthropic),
            "gemini" => Ok(ProviderId::Gemini),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Provider metadata shown by `whatnext providers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub env_key: &'static str,
    pub default_model: &'static str,
}

/// All known providers and their display info.
pub fn all_providers() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo {
            id: ProviderId::Groq,
            name: "Groq — Llama 3.1 8B Instant, free tier",
            env_key: ProviderId::Groq.env_key(),
            default_model: ProviderId::Groq.default_model(),
        },
        ProviderInfo {
            id: ProviderId::Anthropic,
            name: "Anthropic — Claude Haiku",
            env_key: ProviderId::Anthropic.env_key(),
            default_model: ProviderId::Anthropic.default_model(),
        },
        ProviderInfo {
            id: ProviderId::Gemini,
            name: "Google — Gemini Flash",
            env_key: ProviderId::Gemini.env_key(),
            default_model: ProviderId::Gemini.default_model(),
        },
    ]
}
