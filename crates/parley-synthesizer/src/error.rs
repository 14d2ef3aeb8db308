//! Error types for the Persona Synthesizer

use thiserror::Error;

/// Errors that can occur during persona synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Synthesis call did not finish in time
    #[error("Synthesis timeout")]
    Timeout,

    /// Model output is not the expected JSON structure
    #[error("Invalid persona format: {0}")]
    InvalidFormat(String),

    /// Model returned the wrong number of personas
    #[error("Expected {expected} personas, got {actual}")]
    CountMismatch {
        /// Requested count
        expected: usize,
        /// Count in the response
        actual: usize,
    },

    /// A persona failed validation
    #[error("Invalid persona: {0}")]
    InvalidPersona(String),

    /// Bad topic or count
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Event not allowed in the current feedback-loop state
    #[error("Cannot apply {event} while {state}")]
    InvalidTransition {
        /// State name
        state: &'static str,
        /// Event name
        event: &'static str,
    },
}

impl From<serde_json::Error> for SynthesisError {
    fn from(e: serde_json::Error) -> Self {
        SynthesisError::InvalidFormat(e.to_string())
    }
}
