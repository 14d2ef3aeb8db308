//! Parse model output into a persona set

use crate::error::SynthesisError;
use parley_domain::{Persona, PersonaSet};
use parley_llm::extract_json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PersonaList {
    personas: Vec<Persona>,
}

/// Parse a structured synthesis reply into exactly `expected` personas
///
/// All-or-nothing: one bad persona rejects the whole reply.
pub fn parse_personas(response: &str, expected: usize) -> Result<PersonaSet, SynthesisError> {
    let json = extract_json(response);
    let list: PersonaList = serde_json::from_str(json)?;

    if list.personas.len() != expected {
        return Err(SynthesisError::CountMismatch {
            expected,
            actual: list.personas.len(),
        });
    }

    PersonaSet::new(list.personas, expected).map_err(SynthesisError::InvalidPersona)
}
