//! Parley Domain Layer
//!
//! This crate contains the data model shared by every Parley component and the
//! trait interfaces for the external collaborators (language model, retrieval
//! services). It carries no infrastructure code.
//!
//! ## Key Concepts
//!
//! - **Persona**: A synthetic customer profile that role-plays an interview subject
//! - **Transcript**: The ordered, append-only analyst/persona exchange of one interview
//! - **Retrieved Context**: Source-tagged snippets that ground the persona's answers
//! - **Interview Record**: Persona + transcript + context, finalized into a report section
//! - **Run Id**: Time-sortable identifier for one research run
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Infrastructure implementations (HTTP providers, search adapters) live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod conversation;
pub mod persona;
pub mod record;
pub mod run_id;
pub mod traits;

// Re-exports for convenience
pub use context::{ContextEntry, Document, DocumentSource, RetrievedContext};
pub use conversation::{ChatMessage, ChatRole, ConversationTurn, Role, Transcript};
pub use persona::{Persona, PersonaSet};
pub use record::InterviewRecord;
pub use run_id::RunId;
