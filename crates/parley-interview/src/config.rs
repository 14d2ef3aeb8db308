//! Configuration for interviews

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phrase with which the analyst signals the interview is over
pub const DEFAULT_CLOSING_PHRASE: &str = "Thank you so much for your help!";

/// Configuration for a single interview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Persona answers after which the interview ends
    pub max_num_turns: usize,

    /// Web documents fetched per retrieval step
    pub web_max_results: usize,

    /// Encyclopedia documents fetched per retrieval step
    pub encyclopedia_max_docs: usize,

    /// Maximum time for any single model or retrieval call (seconds)
    pub call_timeout_secs: u64,

    /// Analyst phrase that ends the interview early
    pub closing_phrase: String,
}

impl InterviewConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_num_turns == 0 {
            return Err("max_num_turns must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        if self.closing_phrase.trim().is_empty() {
            return Err("closing_phrase cannot be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_num_turns: 2,
            web_max_results: 3,
            encyclopedia_max_docs: 2,
            call_timeout_secs: 120,
            closing_phrase: DEFAULT_CLOSING_PHRASE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = InterviewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_num_turns, 2);
        assert_eq!(config.web_max_results, 3);
        assert_eq!(config.encyclopedia_max_docs, 2);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = InterviewConfig::default();
        config.max_num_turns = 0;
        assert!(config.validate().is_err());

        let mut config = InterviewConfig::default();
        config.closing_phrase = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = InterviewConfig::default();
        config.call_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = InterviewConfig {
            max_num_turns: 4,
            ..Default::default()
        };
        let parsed = InterviewConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
