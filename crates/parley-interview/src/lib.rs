//! Parley Interview Engine
//!
//! Simulates a multi-turn interview between an analyst and one persona, then
//! condenses the transcript into a cited report section.
//!
//! # Architecture
//!
//! ```text
//! AskQuestion → Retrieve (query rewrite, web ∥ encyclopedia) → Answer
//!      ↑                                                         │
//!      └────────────── more turns ───────────────────────────────┤
//!                                                                ↓
//!                                     SaveTranscript → WriteSection → Done
//! ```
//!
//! The state machine itself ([`transition`]) is pure; [`Interviewer`]
//! performs the model and retrieval calls for each stage.
//!
//! # Example Usage
//!
//! ```no_run
//! use parley_domain::Persona;
//! use parley_interview::{InterviewConfig, Interviewer};
//! use parley_llm::MockProvider;
//! use parley_retrieval::StaticRetriever;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let interviewer = Interviewer::new(
//!     Arc::new(MockProvider::default()),
//!     Arc::new(StaticRetriever::empty("web")),
//!     Arc::new(StaticRetriever::empty("wiki")),
//!     InterviewConfig::default(),
//! );
//!
//! let persona = Persona::new("Jake", "Snowboarder", 28, "Wants durable bindings");
//! let record = interviewer.conduct("latest snowboard binding", persona).await?;
//! println!("{}", record.section().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod interviewer;
mod prompt;
mod sections;
mod state;

#[cfg(test)]
mod tests;

pub use config::{InterviewConfig, DEFAULT_CLOSING_PHRASE};
pub use error::InterviewError;
pub use interviewer::Interviewer;
pub use prompt::opening_message;
pub use sections::{dedupe_sources, parse_source_line, renumber_citations};
pub use state::{route_after_answer, transition, InterviewEvent, InterviewState, Stage};
