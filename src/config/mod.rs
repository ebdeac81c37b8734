//! Configuration module for VDP-Scout
//!
//! Configuration is environment-driven (optionally via a `.env` file):
//! the only configurable surface is the text-generation collaborator —
//! its endpoint, model id, and API key.
//!
//! # Example
//!
//! ```no_run
//! use vdp_scout::config::Config;
//!
//! let config = Config::from_env().unwrap();
//! println!("Using model: {}", config.model);
//! ```

use crate::{ConfigError, ConfigResult};
use url::Url;

/// Default chat-completions endpoint base (OpenAI-compatible)
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Placeholder value that must never reach a live query
const PLACEHOLDER: &str = "<REPLACE_ME>";

/// Collaborator configuration for the text-generation model
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of an OpenAI-compatible chat-completions API
    pub base_url: String,

    /// Model identifier to query
    pub model: String,

    /// Bearer token for the endpoint
    pub api_key: String,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// Reads `LLM_BASE_URL` (optional, defaults to the OpenRouter
    /// endpoint), `LLM_MODEL_ID`, and `LLM_API_KEY`. A `.env` file in the
    /// working directory is honored if present.
    pub fn from_env() -> ConfigResult<Self> {
        // Missing .env files are fine; real env vars still apply.
        let _ = dotenvy::dotenv();

        let base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = require_var("LLM_MODEL_ID")?;
        let api_key = require_var("LLM_API_KEY")?;

        let config = Config {
            base_url,
            model,
            api_key,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> ConfigResult<()> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingVar("LLM_MODEL_ID".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar("LLM_API_KEY".to_string()));
        }

        Ok(())
    }
}

/// Reads a required environment variable, rejecting placeholder values.
fn require_var(name: &str) -> ConfigResult<String> {
    let value = std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))?;

    if value.trim().is_empty() {
        return Err(ConfigError::MissingVar(name.to_string()));
    }
    if value.trim() == PLACEHOLDER {
        return Err(ConfigError::Placeholder(name.to_string()));
    }

    Ok(value)
}
