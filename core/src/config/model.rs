//! Resolved model provider configuration

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model name
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Fully resolved model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedModelConfig {
    /// API key for the provider
    pub api_key: String,

    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,

    /// Model name to request
    pub model: String,
}

impl ResolvedModelConfig {
    /// Create a configuration with defaults for url and model
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Resolve configuration from the environment.
    ///
    /// `NOTEFLOW_API_KEY` takes precedence over `OPENAI_API_KEY`;
    /// `NOTEFLOW_BASE_URL` and `NOTEFLOW_MODEL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NOTEFLOW_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| ConfigError::MissingField {
                field: "api_key".to_string(),
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("NOTEFLOW_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("NOTEFLOW_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Override the base URL
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model name
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }
}
