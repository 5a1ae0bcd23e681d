//! CLI configuration loader
//!
//! Layered loading with flag overrides:
//! 1. Command-line flags (highest priority)
//! 2. `NOTEFLOW_*` environment variables (`__` separates nested keys)
//! 3. `--config` file, or `~/.config/noteflow/config.toml` if present
//!
//! `OPENAI_API_KEY` is honored as a fallback for the api key so a plain
//! OpenAI environment works without any noteflow-specific setup.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use noteflow_core::{EngineConfig, ResolvedModelConfig, WorkerConfig};
use serde::Deserialize;
use std::path::PathBuf;

/// Settings as read from file and environment, before flag overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliSettings {
    /// API key for the model provider
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: Option<String>,

    /// Model name
    pub model: Option<String>,

    /// Iteration cap for one run
    pub max_iterations: Option<usize>,

    /// Path to the sqlite notes database
    pub database: Option<PathBuf>,

    /// Credential for the connected workspace
    pub workspace_token: Option<String>,

    /// Tool worker process, e.g. `worker = { command = "node", args = ["worker.js"] }`
    pub worker: Option<WorkerConfig>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    config_override: Option<PathBuf>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    max_iterations_override: Option<usize>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            api_key_override: None,
            base_url_override: None,
            model_override: None,
            max_iterations_override: None,
        }
    }

    /// Set config file override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Set iteration cap override
    pub fn with_max_iterations_override(mut self, max_iterations: usize) -> Self {
        self.max_iterations_override = Some(max_iterations);
        self
    }

    /// Load settings and apply flag overrides
    pub fn load(&self) -> Result<CliSettings> {
        let mut builder = Config::builder();

        if let Some(path) = &self.config_override {
            builder = builder.add_source(File::from(path.clone()).format(FileFormat::Toml));
        } else if let Some(path) = default_config_path() {
            if path.exists() {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
        }

        builder = builder.add_source(Environment::with_prefix("NOTEFLOW").separator("__"));

        let mut settings: CliSettings = builder
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        if settings.api_key.is_none() {
            settings.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        if let Some(api_key) = &self.api_key_override {
            settings.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            settings.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            settings.model = Some(model.clone());
        }
        if let Some(max_iterations) = self.max_iterations_override {
            settings.max_iterations = Some(max_iterations);
        }

        Ok(settings)
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CliSettings {
    /// Resolve the model provider configuration, requiring an api key
    pub fn resolve_model(&self) -> Result<ResolvedModelConfig> {
        let api_key = self.api_key.clone().context(
            "no API key configured; set NOTEFLOW_API_KEY, OPENAI_API_KEY, or api_key in config.toml",
        )?;

        let mut model = ResolvedModelConfig::new(api_key);
        if let Some(base_url) = &self.base_url {
            model = model.with_base_url(base_url.clone());
        }
        if let Some(name) = &self.model {
            model = model.with_model(name.clone());
        }
        Ok(model)
    }

    /// Build the engine configuration
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        if let Some(worker) = &self.worker {
            config = config.with_worker(worker.clone());
        }
        config
    }

    /// Path to the sqlite database, defaulting to the platform data dir
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("could not determine a data directory")?;
        Ok(data_dir.join("noteflow").join("notes.db"))
    }
}

/// `~/.config/noteflow/config.toml` (platform equivalent)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("noteflow").join("config.toml"))
}
