use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Model runtime endpoint. Only `POST {url}/api/generate` is used.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Unset means the request waits until the transport gives up.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_llm_model(),
            timeout_secs: None,
        }
    }
}

fn default_llm_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "mistral".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_preview_chars() -> usize {
    500
}
fn default_preview_rows() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.llm.model.trim().is_empty() {
        anyhow::bail!("llm.model must not be empty");
    }
    if !(config.llm.url.starts_with("http://") || config.llm.url.starts_with("https://")) {
        anyhow::bail!(
            "llm.url must start with http:// or https://, got '{}'",
            config.llm.url
        );
    }
    if config.llm.timeout_secs == Some(0) {
        anyhow::bail!("llm.timeout_secs must be > 0 when set");
    }
    if config.upload.preview_rows == 0 {
        anyhow::bail!("upload.preview_rows must be > 0");
    }
    Ok(())
}
