//! Values returned by the two-phase run API

use crate::metrics::RunMetrics;
use crate::report::FinalReport;
use parley_domain::{InterviewRecord, PersonaSet, RunId};

/// A run suspended at the human review step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingApproval {
    /// Run to resume with `revise_synthesis` or `approve_and_run`
    pub run_id: RunId,

    /// Research topic
    pub topic: String,

    /// Personas awaiting review
    pub personas: PersonaSet,
}

/// A written report section tagged with its persona
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position of the persona in the approved set
    pub persona_index: usize,

    /// Persona name
    pub persona_name: String,

    /// Markdown section text
    pub text: String,
}

/// How one persona's interview ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewOutcome {
    /// Interview ran to a written section
    Completed {
        /// Position of the persona in the approved set
        persona_index: usize,
        /// Full interview record
        record: Box<InterviewRecord>,
    },

    /// Interview stopped on an error
    Failed {
        /// Position of the persona in the approved set
        persona_index: usize,
        /// Persona name
        persona_name: String,
        /// Error message
        error: String,
    },
}

impl InterviewOutcome {
    /// Position of the persona in the approved set
    pub fn persona_index(&self) -> usize {
        match self {
            InterviewOutcome::Completed { persona_index, .. }
            | InterviewOutcome::Failed { persona_index, .. } => *persona_index,
        }
    }

    /// Whether the interview completed
    pub fn is_completed(&self) -> bool {
        matches!(self, InterviewOutcome::Completed { .. })
    }

    /// Record of a completed interview
    pub fn record(&self) -> Option<&InterviewRecord> {
        match self {
            InterviewOutcome::Completed { record, .. } => Some(record.as_ref()),
            InterviewOutcome::Failed { .. } => None,
        }
    }
}

/// Result of an approved run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Run identifier
    pub run_id: RunId,

    /// Research topic
    pub topic: String,

    /// Approved personas
    pub personas: PersonaSet,

    /// One outcome per persona, in persona order
    pub outcomes: Vec<InterviewOutcome>,

    /// Sections in the order interviews finished
    pub sections: Vec<Section>,

    /// Run statistics
    pub metrics: RunMetrics,
}

impl RunResult {
    /// Failed outcomes only
    pub fn failures(&self) -> impl Iterator<Item = &InterviewOutcome> {
        self.outcomes.iter().filter(|o| !o.is_completed())
    }

    /// Combined report of every written section
    pub fn report(&self) -> FinalReport {
        FinalReport::compile(&self.topic, &self.sections)
    }
}
