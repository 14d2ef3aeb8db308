//! Human feedback loop around persona synthesis
//!
//! ```text
//! Synthesizing --PersonasGenerated--> AwaitingApproval
//! AwaitingApproval --FeedbackProvided--> Synthesizing
//! AwaitingApproval --Approved--> Approved
//! ```
//!
//! Transitions are pure: [`PersonaSynthesisState::apply`] consumes the state
//! and returns the next one, or an error for events the state does not accept.

use crate::error::SynthesisError;
use parley_domain::PersonaSet;
use serde::{Deserialize, Serialize};

/// Where the feedback loop currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonaSynthesisState {
    /// A synthesis call is due, optionally guided by feedback
    Synthesizing {
        /// Revision guidance for the next synthesis (consumed by it)
        feedback: Option<String>,
    },

    /// Personas are ready for human review
    AwaitingApproval {
        /// Current persona set
        personas: PersonaSet,
    },

    /// The human approved the set; interviews may start
    Approved {
        /// Approved persona set
        personas: PersonaSet,
    },
}

/// Inputs to the feedback loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    /// The synthesizer produced a set
    PersonasGenerated(PersonaSet),

    /// The human asked for a revision
    FeedbackProvided(String),

    /// The human accepted the set
    Approved,
}

impl SynthesisEvent {
    fn name(&self) -> &'static str {
        match self {
            SynthesisEvent::PersonasGenerated(_) => "PersonasGenerated",
            SynthesisEvent::FeedbackProvided(_) => "FeedbackProvided",
            SynthesisEvent::Approved => "Approved",
        }
    }
}

impl PersonaSynthesisState {
    /// Initial state of a new run
    pub fn start() -> Self {
        PersonaSynthesisState::Synthesizing { feedback: None }
    }

    /// Apply an event, returning the next state
    ///
    /// Generated personas replace any previous set and clear the feedback
    /// that produced them. Blank feedback is stored as no feedback.
    pub fn apply(self, event: SynthesisEvent) -> Result<Self, SynthesisError> {
        let state = self.name();
        match (self, event) {
            (Self::Synthesizing { .. }, SynthesisEvent::PersonasGenerated(personas)) => {
                Ok(Self::AwaitingApproval { personas })
            }
            (Self::AwaitingApproval { .. }, SynthesisEvent::FeedbackProvided(text)) => {
                let trimmed = text.trim();
                Ok(Self::Synthesizing {
                    feedback: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                })
            }
            (Self::AwaitingApproval { personas }, SynthesisEvent::Approved) => {
                Ok(Self::Approved { personas })
            }
            (_, event) => Err(SynthesisError::InvalidTransition {
                state,
                event: event.name(),
            }),
        }
    }

    /// State name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Synthesizing { .. } => "Synthesizing",
            Self::AwaitingApproval { .. } => "AwaitingApproval",
            Self::Approved { .. } => "Approved",
        }
    }

    /// Current persona set, if one exists
    pub fn personas(&self) -> Option<&PersonaSet> {
        match self {
            Self::Synthesizing { .. } => None,
            Self::AwaitingApproval { personas } | Self::Approved { personas } => Some(personas),
        }
    }

    /// Pending feedback for the next synthesis
    pub fn feedback(&self) -> Option<&str> {
        match self {
            Self::Synthesizing { feedback } => feedback.as_deref(),
            _ => None,
        }
    }

    /// Whether the set waits for a human decision
    pub fn is_awaiting_approval(&self) -> bool {
        matches!(self, Self::AwaitingApproval { .. })
    }

    /// Whether the set has been approved
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}
