//! Configuration for research runs

use parley_interview::InterviewConfig;
use parley_synthesizer::{SynthesizerConfig, MAX_PERSONAS_CEILING};
use serde::{Deserialize, Serialize};

/// Configuration for a research run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Largest persona panel a run may request
    pub max_personas: usize,

    /// Panel size used when the caller does not choose one
    pub default_personas: usize,

    /// Interviews allowed to run at the same time
    pub max_concurrent_interviews: usize,

    /// Maximum time for the synthesis call (seconds)
    pub synthesis_timeout_secs: u64,

    /// Per-interview settings
    pub interview: InterviewConfig,
}

impl ResearchConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_personas == 0 || self.max_personas > MAX_PERSONAS_CEILING {
            return Err(format!(
                "max_personas must be between 1 and {}",
                MAX_PERSONAS_CEILING
            ));
        }
        if self.default_personas == 0 || self.default_personas > self.max_personas {
            return Err("default_personas must be between 1 and max_personas".to_string());
        }
        if self.max_concurrent_interviews == 0 {
            return Err("max_concurrent_interviews must be greater than 0".to_string());
        }
        if self.synthesis_timeout_secs == 0 {
            return Err("synthesis_timeout_secs must be greater than 0".to_string());
        }
        self.interview
            .validate()
            .map_err(|e| format!("interview: {}", e))
    }

    /// Synthesizer settings derived from this configuration
    pub fn synthesizer(&self) -> SynthesizerConfig {
        SynthesizerConfig {
            max_personas: self.max_personas,
            synthesis_timeout_secs: self.synthesis_timeout_secs,
        }
    }

    /// Quick preset: small panel, one turn per interview
    pub fn quick() -> Self {
        Self {
            max_personas: MAX_PERSONAS_CEILING,
            default_personas: 2,
            max_concurrent_interviews: 2,
            synthesis_timeout_secs: 60,
            interview: InterviewConfig {
                max_num_turns: 1,
                call_timeout_secs: 60,
                ..Default::default()
            },
        }
    }

    /// Thorough preset: bigger panel, longer interviews, more context
    pub fn thorough() -> Self {
        Self {
            max_personas: MAX_PERSONAS_CEILING,
            default_personas: 5,
            max_concurrent_interviews: 5,
            synthesis_timeout_secs: 300,
            interview: InterviewConfig {
                max_num_turns: 4,
                web_max_results: 5,
                encyclopedia_max_docs: 3,
                call_timeout_secs: 300,
                ..Default::default()
            },
        }
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

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_personas: MAX_PERSONAS_CEILING,
            default_personas: 3,
            max_concurrent_interviews: 4,
            synthesis_timeout_secs: 120,
            interview: InterviewConfig::default(),
        }
    }
}
