//! Human review of a synthesized persona set.

use crate::error::{CliError, Result};
use parley_orchestrator::PendingApproval;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;

/// Question asked after every synthesis.
pub const REVISE_QUESTION: &str = "Do you want to revise the personas? (yes/no) ";

/// What the reviewer decided about a pending persona set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Interview the personas as they are
    Approve,
    /// Regenerate with this feedback
    Revise(String),
}

/// Source of review decisions.
pub trait Reviewer {
    /// Decide on `pending`.
    fn review(&mut self, pending: &PendingApproval) -> Result<Decision>;
}

/// Approves every persona set (`--yes`).
#[derive(Debug, Default)]
pub struct AutoApprove;

impl Reviewer for AutoApprove {
    fn review(&mut self, _pending: &PendingApproval) -> Result<Decision> {
        Ok(Decision::Approve)
    }
}

/// Asks on the terminal.
pub struct InteractiveReviewer {
    editor: DefaultEditor,
}

impl InteractiveReviewer {
    /// Create a reviewer reading from the terminal.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| CliError::Readline(format!("Failed to initialize editor: {}", e)))?;
        Ok(Self { editor })
    }

    fn read(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(CliError::Readline(e.to_string())),
        }
    }
}

impl Reviewer for InteractiveReviewer {
    fn review(&mut self, _pending: &PendingApproval) -> Result<Decision> {
        loop {
            let Some(answer) = self.read(REVISE_QUESTION)? else {
                return Err(CliError::InvalidInput("Review cancelled".to_string()));
            };

            match parse_yes_no(&answer) {
                Some(false) => return Ok(Decision::Approve),
                Some(true) => {
                    let feedback = self.read("Feedback: ")?.unwrap_or_default();
                    if feedback.is_empty() {
                        println!("No feedback given.");
                        continue;
                    }
                    return Ok(Decision::Revise(feedback));
                }
                None => println!("Please answer yes or no."),
            }
        }
    }
}

/// Replays a fixed list of decisions, then approves.
#[derive(Debug, Default)]
pub struct ScriptedReviewer {
    decisions: VecDeque<Decision>,
    seen: usize,
}

impl ScriptedReviewer {
    /// Create a reviewer that answers with `decisions` in order.
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            seen: 0,
        }
    }

    /// Number of persona sets reviewed so far.
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&mut self, _pending: &PendingApproval) -> Result<Decision> {
        self.seen += 1;
        Ok(self.decisions.pop_front().unwrap_or(Decision::Approve))
    }
}

/// Parse a yes/no answer; `None` when it is neither.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::{Persona, PersonaSet, RunId};

    fn pending() -> PendingApproval {
        PendingApproval {
            run_id: RunId::new(),
            topic: "bindings".to_string(),
            personas: PersonaSet::new(vec![Persona::new("Sam", "Rider", 30, "Rides")], 1).unwrap(),
        }
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("yes"), Some(true));
        assert_eq!(parse_yes_no(" Y "), Some(true));
        assert_eq!(parse_yes_no("NO"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn test_scripted_reviewer_then_approves() {
        let mut reviewer = ScriptedReviewer::new([Decision::Revise("cheaper".to_string())]);
        assert_eq!(
            reviewer.review(&pending()).unwrap(),
            Decision::Revise("cheaper".to_string())
        );
        assert_eq!(reviewer.review(&pending()).unwrap(), Decision::Approve);
        assert_eq!(reviewer.seen(), 2);
    }

    #[test]
    fn test_auto_approve() {
        assert_eq!(AutoApprove.review(&pending()).unwrap(), Decision::Approve);
    }
}
