//! Process-wide configuration, read once at startup.
//!
//! Handles:
//! - `.env.local` / `.env` loading
//! - Provider resolution and API keys
//! - Variant, timeout, model override, feedback log and OCR command
//!
//! The resulting [`Config`] is passed explicitly to whatever needs it.

use crate::contract::Variant;
use crate::llm::ProviderId;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// An API key whose `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// `None` for empty or whitespace-only values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.trim().to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = &self.0;
        if key.len() <= 8 || !key.is_ascii() {
            return f.write_str("\"****\"");
        }
        write!(f, "\"{}...{}\"", &key[..4], &key[key.len() - 4..])
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderId,
    api_keys: HashMap<ProviderId, ApiKey>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub variant: Variant,
    pub timeout: Duration,
    pub feedback_log: PathBuf,
    /// Path or name of the tesseract binary.
    pub tesseract_cmd: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_keys: HashMap<ProviderId, ApiKey> = ProviderId::ALL
            .into_iter()
            .filter_map(|id| lookup(id.env_key()).and_then(ApiKey::new).map(|k| (id, k)))
            .collect();

        let provider = resolve_provider(lookup("LLM_PROVIDER").as_deref(), &api_keys);

        let model = lookup("WHATNEXT_MODEL").filter(|m| !m.trim().is_empty());

        let variant = match lookup("WHATNEXT_VARIANT") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse::<Variant>()
                    .map_err(|message| ConfigError::Invalid {
                        key: "WHATNEXT_VARIANT",
                        message,
                    })?
            }
            _ => Variant::WhatNext,
        };

        let timeout = match lookup("WHATNEXT_TIMEOUT_SECS") {
            Some(raw) if !raw.trim().is_empty() => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::Invalid {
                        key: "WHATNEXT_TIMEOUT_SECS",
                        message: format!("'{}' is not a positive number of seconds", raw),
                    })?;
                Duration::from_secs(secs)
            }
            _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let feedback_log = lookup("WHATNEXT_FEEDBACK_LOG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_feedback_log);

        let tesseract_cmd = lookup("TESSERACT_CMD")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "tesseract".to_string());

        Ok(Self {
            provider,
            api_keys,
            model,
            variant,
            timeout,
            feedback_log,
            tesseract_cmd,
        })
    }

    pub fn api_key(&self, provider: ProviderId) -> Option<ApiKey> {
        self.api_keys.get(&provider).cloned()
    }

    pub fn is_provider_configured(&self, provider: ProviderId) -> bool {
        self.api_keys.contains_key(&provider)
    }
}

/// Determine which provider to use.
///
/// Priority:
/// 1. LLM_PROVIDER (explicit override)
/// 2. First provider with an API key set
/// 3. Groq as final default (calls will fail and fall back)
fn resolve_provider(
    explicit: Option<&str>,
    api_keys: &HashMap<ProviderId, ApiKey>,
) -> ProviderId {
    if let Some(raw) = explicit {
        match raw.parse::<ProviderId>() {
            Ok(id) => {
                log::info!("[LLM] Provider override: {}", id);
                return id;
            }
            Err(e) => log::warn!("[LLM] Ignoring LLM_PROVIDER: {}", e),
        }
    }
    ProviderId::ALL
        .into_iter()
        .find(|id| api_keys.contains_key(id))
        .unwrap_or(ProviderId::Groq)
}

fn default_feedback_log() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("whatnext")
        .join("feedback.jsonl")
}

/// Load `.env.local`, else `.env`, from `dir`. The first file found wins;
/// variables already set in the environment are left alone.
///
/// Runs before logging is initialised (so `RUST_LOG` can come from the file);
/// the caller logs the returned path.
pub fn load_dotenv(dir: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    for env_file in [".env.local", ".env"] {
        let path = dir.join(env_file);
        if path.exists() {
            dotenvy::from_path(&path)?;
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.provider, ProviderId::Groq);
        assert_eq!(config.variant, Variant::WhatNext);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.tesseract_cmd, "tesseract");
        assert!(config.api_key(ProviderId::Groq).is_none());
    }

    #[test]
    fn first_configured_provider_wins() {
        let config =
            Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "g-123456789")])).unwrap();
        assert_eq!(config.provider, ProviderId::Gemini);
        assert!(config.is_provider_configured(ProviderId::Gemini));
    }

    #[test]
    fn explicit_provider_overrides_detection() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "g-123456789"),
            ("LLM_PROVIDER", "Anthropic"),
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderId::Anthropic);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "   ")])).unwrap();
        assert!(!config.is_provider_configured(ProviderId::Groq));
    }

    #[test]
    fn bad_variant_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("WHATNEXT_VARIANT", "v7")])).unwrap_err();
        assert!(err.to_string().starts_with("WHATNEXT_VARIANT"));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("WHATNEXT_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("WHATNEXT_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().starts_with("WHATNEXT_TIMEOUT_SECS"));
        let ok = Config::from_lookup(lookup_from(&[("WHATNEXT_TIMEOUT_SECS", " 15 ")])).unwrap();
        assert_eq!(ok.timeout, Duration::from_secs(15));
    }

    #[test]
    fn dotenv_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "WHATNEXT_TEST_DOTENV_A=plain\n").unwrap();
        std::fs::write(dir.path().join(".env.local"), "WHATNEXT_TEST_DOTENV_B=local\n").unwrap();
        let loaded = load_dotenv(dir.path()).unwrap().unwrap();
        assert!(loaded.ends_with(".env.local"));
        assert_eq!(std::env::var("WHATNEXT_TEST_DOTENV_B").unwrap(), "local");
        assert!(std::env::var("WHATNEXT_TEST_DOTENV_A").is_err());
    }

    #[test]
    fn dotenv_missing_files_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dotenv(dir.path()).unwrap().is_none());
    }

    #[test]
    fn api_key_debug_is_masked() {
        let key = ApiKey::new("gsk_abcdefghijklmnop").unwrap();
        let shown = format!("{:?}", key);
        assert_eq!(shown, "\"gsk_...mnop\"");
        assert_eq!(format!("{:?}", ApiKey::new("short").unwrap()), "\"****\"");
    }
}
