//! Configuration schema for config.toml.

use crate::agent::{GeneratorOptions, ToolErrorPolicy, DEFAULT_ROUNDTRIP_LIMIT};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when `api_key` is empty.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// OpenAI-compatible API base URL (without `/v1`).
    pub api_url: String,

    /// API key. Falls back to `OPENAI_API_KEY` when empty.
    pub api_key: String,

    /// Model identifier sent with every exchange.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum completion tokens per exchange (0 = provider default).
    pub max_tokens: u32,

    /// Default system prompt.
    pub system_prompt: String,

    /// Round-trips allowed before a generation fails.
    pub roundtrip_limit: u32,

    /// Whether tool failures abort the generation or are reported to the model.
    pub tool_error_policy: ToolErrorPolicy,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            max_tokens: 0,
            system_prompt: "You are a helpful assistant. Use the tools available when necessary."
                .into(),
            roundtrip_limit: DEFAULT_ROUNDTRIP_LIMIT,
            tool_error_policy: ToolErrorPolicy::Abort,
            log_level: "info".into(),
        }
    }
}

impl GeneratorConfig {
    /// The configured key, or `OPENAI_API_KEY` from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        if self.api_key.is_empty() {
            fallback.filter(|k| !k.is_empty())
        } else {
            Some(self.api_key.clone())
        }
    }

    /// Loop options derived from this config.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            temperature: self.temperature,
            roundtrip_limit: self.roundtrip_limit,
            tool_error_policy: self.tool_error_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins_over_environment() {
        let cfg = GeneratorConfig {
            api_key: "from-file".into(),
            ..Default::default()
        };
        assert_eq!(cfg.api_key_or(Some("from-env".into())).as_deref(), Some("from-file"));
    }

    #[test]
    fn empty_key_falls_back() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.api_key_or(Some("from-env".into())).as_deref(), Some("from-env"));
        assert_eq!(cfg.api_key_or(Some(String::new())), None);
        assert_eq!(cfg.api_key_or(None), None);
    }

    #[test]
    fn options_mirror_config() {
        let cfg = GeneratorConfig {
            temperature: 0.4,
            roundtrip_limit: 3,
            tool_error_policy: ToolErrorPolicy::Report,
            ..Default::default()
        };
        let opts = cfg.generator_options();
        assert_eq!(opts.temperature, 0.4);
        assert_eq!(opts.roundtrip_limit, 3);
        assert_eq!(opts.tool_error_policy, ToolErrorPolicy::Report);
    }
}
