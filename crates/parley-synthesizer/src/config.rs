//! Configuration for the Persona Synthesizer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard ceiling on personas per run
pub const MAX_PERSONAS_CEILING: usize = 10;

/// Configuration for the Persona Synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Largest persona count a caller may request
    pub max_personas: usize,

    /// Maximum time for the synthesis call (seconds)
    pub synthesis_timeout_secs: u64,
}

impl SynthesizerConfig {
    /// Get the synthesis timeout as a Duration
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_personas == 0 {
            return Err("max_personas must be greater than 0".to_string());
        }
        if self.max_personas > MAX_PERSONAS_CEILING {
            return Err(format!(
                "max_personas cannot exceed {}",
                MAX_PERSONAS_CEILING
            ));
        }
        if self.synthesis_timeout_secs == 0 {
            return Err("synthesis_timeout_secs must be greater than 0".to_string());
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

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            max_personas: MAX_PERSONAS_CEILING,
            synthesis_timeout_secs: 120,
        }
    }
}
