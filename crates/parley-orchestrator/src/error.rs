//! Error types for the Orchestrator

use crate::checkpoint::RunPhase;
use parley_domain::RunId;
use parley_synthesizer::SynthesisError;
use thiserror::Error;

/// Checkpoint lookup and phase errors
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// No run stored under this id
    #[error("Unknown run: {0}")]
    UnknownRun(RunId),

    /// Run exists but is not waiting for a decision
    #[error("Run {run_id} is not awaiting approval (phase: {phase})")]
    NotAwaitingApproval {
        /// Run id
        run_id: RunId,
        /// Phase the run is in
        phase: RunPhase,
    },

    /// Underlying store failed
    #[error("Checkpoint store error: {0}")]
    Store(String),
}

/// Errors that can occur while orchestrating a run
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Persona synthesis failed
    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Checkpoint error
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Event not allowed in the run's phase
    #[error("Cannot apply {event} during {phase}")]
    InvalidTransition {
        /// Current phase
        phase: RunPhase,
        /// Event name
        event: &'static str,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
