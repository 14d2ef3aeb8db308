//! Interview record - everything one interview produced

use crate::{Persona, RetrievedContext, Transcript};
use serde::{Deserialize, Serialize};

/// The record of a single persona interview
///
/// Created when the interview starts and mutated turn by turn. The two
/// derived fields (`transcript_text`, `section`) are write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRecord {
    /// The interviewed persona
    pub persona: Persona,

    /// Analyst/persona exchange so far
    pub transcript: Transcript,

    /// Context retrieved across all turns
    pub context: RetrievedContext,

    transcript_text: Option<String>,

    section: Option<String>,
}

impl InterviewRecord {
    /// Start a record for a persona
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            transcript: Transcript::new(),
            context: RetrievedContext::new(),
            transcript_text: None,
            section: None,
        }
    }

    /// Rendered transcript, once saved
    pub fn transcript_text(&self) -> Option<&str> {
        self.transcript_text.as_deref()
    }

    /// Written report section, once written
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Store the rendered transcript (only once)
    pub fn set_transcript_text(&mut self, text: String) -> Result<(), String> {
        if self.transcript_text.is_some() {
            return Err("transcript text already saved".to_string());
        }
        self.transcript_text = Some(text);
        Ok(())
    }

    /// Store the report section (only once, after the transcript)
    pub fn set_section(&mut self, section: String) -> Result<(), String> {
        if self.transcript_text.is_none() {
            return Err("section written before transcript was saved".to_string());
        }
        if self.section.is_some() {
            return Err("section already written".to_string());
        }
        self.section = Some(section);
        Ok(())
    }

    /// Whether both derived fields are set
    pub fn is_finalized(&self) -> bool {
        self.transcript_text.is_some() && self.section.is_some()
    }
}
