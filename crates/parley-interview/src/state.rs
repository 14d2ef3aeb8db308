//! Interview state machine
//!
//! ```text
//! AskQuestion → Retrieve → Answer ─┬─→ AskQuestion
//!                                  └─→ SaveTranscript → WriteSection → Done
//! ```
//!
//! [`transition`] is pure: the interviewer performs the I/O for a stage and
//! feeds the result back as an [`InterviewEvent`].

use crate::config::InterviewConfig;
use crate::error::InterviewError;
use parley_domain::{ContextEntry, InterviewRecord, Persona, Role, Transcript};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interview stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Analyst asks the next question
    AskQuestion,
    /// Context is fetched for the question
    Retrieve,
    /// Persona answers from context
    Answer,
    /// Transcript is rendered and stored
    SaveTranscript,
    /// Report section is written
    WriteSection,
    /// Interview finished
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::AskQuestion => "ask_question",
            Stage::Retrieve => "retrieve",
            Stage::Answer => "answer",
            Stage::SaveTranscript => "save_transcript",
            Stage::WriteSection => "write_section",
            Stage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Result of performing one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewEvent {
    /// Analyst produced a question
    QuestionAsked(String),
    /// Retrieval step finished (possibly empty)
    ContextRetrieved(ContextEntry),
    /// Persona produced an answer
    Answered(String),
    /// Transcript rendering requested
    TranscriptSaved,
    /// Section text produced
    SectionWritten(String),
}

impl InterviewEvent {
    fn name(&self) -> &'static str {
        match self {
            InterviewEvent::QuestionAsked(_) => "QuestionAsked",
            InterviewEvent::ContextRetrieved(_) => "ContextRetrieved",
            InterviewEvent::Answered(_) => "Answered",
            InterviewEvent::TranscriptSaved => "TranscriptSaved",
            InterviewEvent::SectionWritten(_) => "SectionWritten",
        }
    }
}

/// A persona interview in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewState {
    stage: Stage,
    record: InterviewRecord,
}

impl InterviewState {
    /// Start an interview with `persona`
    pub fn new(persona: Persona) -> Self {
        Self {
            stage: Stage::AskQuestion,
            record: InterviewRecord::new(persona),
        }
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Record accumulated so far
    pub fn record(&self) -> &InterviewRecord {
        &self.record
    }

    /// Consume the state, keeping the record
    pub fn into_record(self) -> InterviewRecord {
        self.record
    }

    /// Whether the interview has finished
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }
}

/// Decide where to go after an answer
///
/// Ends the interview once the persona has answered `max_num_turns` times,
/// or when the most recent analyst turn contains the closing phrase. Persona
/// turns are never inspected for the phrase.
pub fn route_after_answer(transcript: &Transcript, config: &InterviewConfig) -> Stage {
    if transcript.count(Role::Persona) >= config.max_num_turns {
        return Stage::SaveTranscript;
    }
    match transcript.last_analyst_turn() {
        Some(turn) if turn.text.contains(&config.closing_phrase) => Stage::SaveTranscript,
        _ => Stage::AskQuestion,
    }
}

/// Apply `event` to `state`
pub fn transition(
    state: InterviewState,
    event: InterviewEvent,
    config: &InterviewConfig,
) -> Result<InterviewState, InterviewError> {
    let InterviewState { stage, mut record } = state;

    let next = match (stage, event) {
        (Stage::AskQuestion, InterviewEvent::QuestionAsked(question)) => {
            record.transcript.push_analyst(question);
            Stage::Retrieve
        }
        (Stage::Retrieve, InterviewEvent::ContextRetrieved(entry)) => {
            record.context.push(entry);
            Stage::Answer
        }
        (Stage::Answer, InterviewEvent::Answered(answer)) => {
            record.transcript.push_persona(answer);
            route_after_answer(&record.transcript, config)
        }
        (Stage::SaveTranscript, InterviewEvent::TranscriptSaved) => {
            let text = record.transcript.render(&record.persona.name);
            record
                .set_transcript_text(text)
                .map_err(InterviewError::AlreadyFinalized)?;
            Stage::WriteSection
        }
        (Stage::WriteSection, InterviewEvent::SectionWritten(section)) => {
            record
                .set_section(section)
                .map_err(InterviewError::AlreadyFinalized)?;
            Stage::Done
        }
        (stage, event) => {
            return Err(InterviewError::InvalidTransition {
                stage,
                event: event.name(),
            })
        }
    };

    Ok(InterviewState {
        stage: next,
        record,
    })
}
