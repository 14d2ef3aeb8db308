//! Parley Persona Synthesizer
//!
//! Turns a product topic into a panel of synthetic customer personas, and
//! tracks the human review loop that may send the panel back for revision.
//!
//! # Architecture
//!
//! ```text
//! topic + feedback → prompt → ModelClient (structured) → parser → PersonaSet
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use parley_llm::MockProvider;
//! use parley_synthesizer::{PersonaSynthesizer, SynthesizerConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockProvider::new(
//!     r#"{"personas": [{"name": "Jake", "occupation": "Snowboarder", "age": 28,
//!         "description": "Wants durable bindings"}]}"#,
//! ));
//! let synthesizer = PersonaSynthesizer::new(llm, SynthesizerConfig::default());
//!
//! let personas = synthesizer.synthesize("latest snowboard binding", 1, None).await?;
//! println!("Generated {} personas", personas.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod parser;
mod prompt;
mod state;
mod synthesizer;


pub use config::{SynthesizerConfig, MAX_PERSONAS_CEILING};
pub use error::SynthesisError;
pub use parser::parse_personas;
pub use prompt::{build_system_prompt, PERSONA_SCHEMA};
pub use state::{PersonaSynthesisState, SynthesisEvent};
pub use synthesizer::PersonaSynthesizer;
