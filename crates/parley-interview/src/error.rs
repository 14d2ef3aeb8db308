//! Error types for interviews

use crate::state::Stage;
use thiserror::Error;

/// Errors that end a single interview
///
/// Retrieval failures are not listed: they degrade to empty context.
#[derive(Error, Debug)]
pub enum InterviewError {
    /// Model call failed
    #[error("LLM error during {stage}: {message}")]
    Llm {
        /// Stage that made the call
        stage: Stage,
        /// Provider error text
        message: String,
    },

    /// Model call did not finish in time
    #[error("Timeout during {0}")]
    Timeout(Stage),

    /// Event not accepted in the current stage
    #[error("Cannot apply {event} during {stage}")]
    InvalidTransition {
        /// Current stage
        stage: Stage,
        /// Event name
        event: &'static str,
    },

    /// Write-once record field written twice
    #[error("Record already finalized: {0}")]
    AlreadyFinalized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
