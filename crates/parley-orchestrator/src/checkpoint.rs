//! Run state and the checkpoint store it lives in between calls

use crate::error::{CheckpointError, OrchestratorError};
use parley_domain::{PersonaSet, RunId};
use parley_synthesizer::{PersonaSynthesisState, SynthesisEvent};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Coarse phase of a research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Personas are being (re)generated
    Synthesizing,
    /// Waiting for the human to approve or revise
    AwaitingApproval,
    /// Interviews are running
    Interviewing,
    /// All interviews joined
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Synthesizing => "synthesizing",
            RunPhase::AwaitingApproval => "awaiting_approval",
            RunPhase::Interviewing => "interviewing",
            RunPhase::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Events that move a run forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Feedback-loop event
    Synthesis(SynthesisEvent),
    /// Every interview task has been joined
    InterviewsFinished,
}

/// Everything needed to resume a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    /// Run identifier (checkpoint key)
    pub run_id: RunId,

    /// Research topic
    pub topic: String,

    /// Panel size requested at start
    pub requested_persona_count: usize,

    synthesis: PersonaSynthesisState,

    phase: RunPhase,
}

impl RunState {
    /// Create a run that is about to synthesize
    pub fn new(topic: impl Into<String>, requested_persona_count: usize) -> Self {
        Self {
            run_id: RunId::new(),
            topic: topic.into(),
            requested_persona_count,
            synthesis: PersonaSynthesisState::start(),
            phase: RunPhase::Synthesizing,
        }
    }

    /// Current phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Feedback-loop state
    pub fn synthesis(&self) -> &PersonaSynthesisState {
        &self.synthesis
    }

    /// Current persona set, if any
    pub fn personas(&self) -> Option<&PersonaSet> {
        self.synthesis.personas()
    }

    /// Apply an event, returning the next state
    pub fn apply(self, event: RunEvent) -> Result<Self, OrchestratorError> {
        match (self.phase, event) {
            (RunPhase::Synthesizing | RunPhase::AwaitingApproval, RunEvent::Synthesis(event)) => {
                let synthesis = self.synthesis.apply(event)?;
                let phase = match &synthesis {
                    PersonaSynthesisState::Synthesizing { .. } => RunPhase::Synthesizing,
                    PersonaSynthesisState::AwaitingApproval { .. } => RunPhase::AwaitingApproval,
                    PersonaSynthesisState::Approved { .. } => RunPhase::Interviewing,
                };
                Ok(Self {
                    synthesis,
                    phase,
                    ..self
                })
            }
            (RunPhase::Interviewing, RunEvent::InterviewsFinished) => Ok(Self {
                phase: RunPhase::Completed,
                ..self
            }),
            (phase, RunEvent::Synthesis(_)) => Err(OrchestratorError::InvalidTransition {
                phase,
                event: "Synthesis",
            }),
            (phase, RunEvent::InterviewsFinished) => Err(OrchestratorError::InvalidTransition {
                phase,
                event: "InterviewsFinished",
            }),
        }
    }
}

/// Storage for suspended runs, keyed by run id
pub trait CheckpointStore: Send + Sync {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Insert or replace the state of a run
    fn save(&self, state: &RunState) -> Result<(), Self::Error>;

    /// Replace the state of a run only while its stored phase is `expected`
    ///
    /// The check and the write are one atomic step. Returns the phase that
    /// was stored before the call (`None` for an unknown run); the write
    /// happened only when that equals `expected`.
    fn replace_if(
        &self,
        expected: RunPhase,
        state: &RunState,
    ) -> Result<Option<RunPhase>, Self::Error>;

    /// Fetch the state of a run
    fn load(&self, run_id: RunId) -> Result<Option<RunState>, Self::Error>;

    /// Delete a run, returning its last state
    fn remove(&self, run_id: RunId) -> Result<Option<RunState>, Self::Error>;

    /// Ids of every stored run, oldest first
    fn list(&self) -> Result<Vec<RunId>, Self::Error>;
}

/// Process-local checkpoint store
///
/// Runs are kept until [`CheckpointStore::remove`] is called, including
/// completed ones. Long-lived callers drop finished runs with
/// `ResearchOrchestrator::forget`.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    runs: Mutex<HashMap<RunId, RunState>>,
}

impl InMemoryCheckpointStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn runs(&self) -> Result<std::sync::MutexGuard<'_, HashMap<RunId, RunState>>, CheckpointError> {
        self.runs
            .lock()
            .map_err(|_| CheckpointError::Store("checkpoint lock poisoned".to_string()))
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    type Error = CheckpointError;

    fn save(&self, state: &RunState) -> Result<(), Self::Error> {
        self.runs()?.insert(state.run_id, state.clone());
        Ok(())
    }

    fn replace_if(
        &self,
        expected: RunPhase,
        state: &RunState,
    ) -> Result<Option<RunPhase>, Self::Error> {
        let mut runs = self.runs()?;
        let current = runs.get(&state.run_id).map(RunState::phase);
        if current == Some(expected) {
            runs.insert(state.run_id, state.clone());
        }
        Ok(current)
    }

    fn load(&self, run_id: RunId) -> Result<Option<RunState>, Self::Error> {
        Ok(self.runs()?.get(&run_id).cloned())
    }

    fn remove(&self, run_id: RunId) -> Result<Option<RunState>, Self::Error> {
        Ok(self.runs()?.remove(&run_id))
    }

    fn list(&self) -> Result<Vec<RunId>, Self::Error> {
        let mut ids: Vec<RunId> = self.runs()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
