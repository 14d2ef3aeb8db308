//! Core Persona Synthesizer implementation

use crate::config::SynthesizerConfig;
use crate::error::SynthesisError;
use crate::parser::parse_personas;
use crate::prompt::{build_system_prompt, GENERATE_REQUEST, PERSONA_SCHEMA};
use parley_domain::traits::ModelClient;
use parley_domain::{ChatMessage, PersonaSet};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

/// Generates persona panels from a topic description
pub struct PersonaSynthesizer<M>
where
    M: ModelClient,
{
    model: Arc<M>,
    config: SynthesizerConfig,
}

impl<M> PersonaSynthesizer<M>
where
    M: ModelClient,
{
    /// Create a synthesizer sharing `model` with other components
    pub fn new(model: Arc<M>, config: SynthesizerConfig) -> Self {
        Self { model, config }
    }

    /// Active configuration
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Synthesize exactly `max_count` personas for `topic`
    ///
    /// `feedback` steers a revision; `None` or blank means no guidance. One
    /// structured model call is made and never retried.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for a blank topic or a count outside `1..=max_personas`
    /// - `Llm` / `Timeout` when the model call fails
    /// - `InvalidFormat`, `CountMismatch`, `InvalidPersona` when the reply is unusable
    pub async fn synthesize(
        &self,
        topic: &str,
        max_count: usize,
        feedback: Option<&str>,
    ) -> Result<PersonaSet, SynthesisError> {
        if topic.trim().is_empty() {
            return Err(SynthesisError::InvalidRequest("topic is empty".to_string()));
        }
        if max_count == 0 || max_count > self.config.max_personas {
            return Err(SynthesisError::InvalidRequest(format!(
                "persona count must be between 1 and {}, got {}",
                self.config.max_personas, max_count
            )));
        }

        let has_feedback = feedback.is_some_and(|f| !f.trim().is_empty());
        info!(topic, max_count, has_feedback, "Synthesizing personas");

        let system = build_system_prompt(topic, max_count, feedback);
        debug!("Synthesis prompt length: {} chars", system.len());

        let history = [ChatMessage::user(GENERATE_REQUEST)];
        let response = timeout(
            self.config.synthesis_timeout(),
            self.model.complete_structured(&system, &history, PERSONA_SCHEMA),
        )
        .await
        .map_err(|_| SynthesisError::Timeout)?
        .map_err(|e| SynthesisError::Llm(e.to_string()))?;

        debug!("Synthesis response length: {} chars", response.len());

        let personas = parse_personas(&response, max_count)?;
        info!(count = personas.len(), "Persona set ready");
        Ok(personas)
    }
}
