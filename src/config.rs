use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::generation::GenerationParams;

const DEFAULT_CONFIG_PATH: &str = "host_summary.toml";
const DEFAULT_BIND: &str = "127.0.0.1:5001";
const DEFAULT_DATASET_PATH: &str = "hosts_dataset.json";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LOG_LEVEL: &str = "host_summary=info,tower_http=info";

/// Load environment variables. Existing variables are never overwritten.
/// 1) HOST_SUMMARY_ENV_FILE if set
/// 2) ./.env
/// 3) ../.env when the API key is still missing
///
/// The log filter is read from RUST_LOG, then HOST_SUMMARY_LOG, then [`DEFAULT_LOG_LEVEL`].
pub fn load_env() {
    if let Ok(env_path) = std::env::var("HOST_SUMMARY_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else {
        let _ = dotenvy::from_path(".env");
        if std::env::var("OPENAI_API_KEY").is_err() {
            let _ = dotenvy::from_path("../.env");
        }
    }
}

/// Main configuration structure loaded from host_summary.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub generation: GenerationConfig,
    /// Secrets, loaded from environment variables only
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

/// Location of the static host dataset
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

/// Parameters for the chat-completion call
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND
                .parse()
                .expect("default bind address should parse"),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: params.model,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            timeout_ms: 60_000,
        }
    }
}

impl GenerationConfig {
    /// Snapshot of the per-request completion parameters
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses HOST_SUMMARY_CONFIG environment variable or defaults to "host_summary.toml"
    pub fn load() -> anyhow::Result<Self> {
        load_env();

        let config_path = std::env::var("HOST_SUMMARY_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            tracing::debug!("Loaded configuration from {}", config_path);
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides (env-first). The lookup is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.runtime.openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

        if let Some(v) = lookup("HOST_SUMMARY_BIND") {
            match v.parse::<SocketAddr>() {
                Ok(bind) => self.server.bind = bind,
                Err(e) => tracing::warn!("Ignoring HOST_SUMMARY_BIND '{}': {}", v, e),
            }
        }
        if let Some(path) = lookup("HOST_SUMMARY_DATASET") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.generation.base_url = url;
        }
        if let Some(model) = lookup("HOST_SUMMARY_MODEL") {
            self.generation.model = model;
        }
        if let Some(timeout) = lookup("HOST_SUMMARY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.generation.timeout_ms = timeout;
        }
    }

    pub fn validate(&mut self) -> anyhow::Result<()> {
        if self.generation.model.trim().is_empty() {
            return Err(anyhow::anyhow!("generation.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            tracing::warn!(
                "temperature {} outside [0, 2], clamping",
                self.generation.temperature
            );
            self.generation.temperature = self.generation.temperature.clamp(0.0, 2.0);
        }
        if self.generation.max_tokens == 0 {
            tracing::warn!("max_tokens 0 is invalid, using 1");
            self.generation.max_tokens = 1;
        }
        Ok(())
    }
}
