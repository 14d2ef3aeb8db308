//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use parley_llm::ProviderKind;
use parley_orchestrator::ResearchConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Model provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Search service settings
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Research run settings
    #[serde(default)]
    pub research: ResearchConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Model provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider backing every model call
    pub provider: ProviderKind,

    /// API endpoint; the provider's default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model name
    pub model: String,

    /// Environment variable holding the API key (OpenAI-compatible only)
    pub api_key_env: String,

    /// Attempts per request (Ollama only)
    pub max_retries: u32,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Search service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Tavily API base URL
    pub tavily_endpoint: String,

    /// Environment variable holding the Tavily API key
    pub tavily_api_key_env: String,

    /// MediaWiki API endpoint
    pub wikipedia_endpoint: String,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".parley").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path`, or defaults when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CliError::Config("llm.timeout_secs must be greater than 0".into()));
        }
        self.research
            .validate()
            .map_err(|e| CliError::Config(format!("research: {}", e)))
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            endpoint: None,
            model: "llama3.1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_retries: parley_llm::ollama::DEFAULT_MAX_RETRIES,
            timeout_secs: parley_llm::ollama::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            tavily_endpoint: parley_retrieval::tavily::DEFAULT_ENDPOINT.to_string(),
            tavily_api_key_env: parley_retrieval::tavily::DEFAULT_API_KEY_ENV.to_string(),
            wikipedia_endpoint: parley_retrieval::wikipedia::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
