//! Runs one persona interview end to end

use crate::config::InterviewConfig;
use crate::error::InterviewError;
use crate::prompt::{
    answer_instructions, opening_message, question_instructions, search_request,
    section_request, section_writer_instructions, SEARCH_INSTRUCTIONS, SEARCH_QUERY_SCHEMA,
};
use crate::sections::dedupe_sources;
use crate::state::{transition, InterviewEvent, InterviewState, Stage};
use parley_domain::traits::{ModelClient, Retriever};
use parley_domain::{ChatMessage, ContextEntry, Document, InterviewRecord, Persona, Role};
use parley_llm::extract_json;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search_query: String,
}

/// Drives the interview state machine against real collaborators
///
/// `W` is the web search, `E` the encyclopedia lookup. All collaborators are
/// shared handles so one interviewer can serve many concurrent interviews.
pub struct Interviewer<M, W, E>
where
    M: ModelClient,
    W: Retriever,
    E: Retriever,
{
    model: Arc<M>,
    web: Arc<W>,
    encyclopedia: Arc<E>,
    config: InterviewConfig,
}

impl<M, W, E> Clone for Interviewer<M, W, E>
where
    M: ModelClient,
    W: Retriever,
    E: Retriever,
{
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            web: Arc::clone(&self.web),
            encyclopedia: Arc::clone(&self.encyclopedia),
            config: self.config.clone(),
        }
    }
}

impl<M, W, E> Interviewer<M, W, E>
where
    M: ModelClient,
    W: Retriever,
    E: Retriever,
{
    /// Create a new interviewer
    pub fn new(model: Arc<M>, web: Arc<W>, encyclopedia: Arc<E>, config: InterviewConfig) -> Self {
        Self {
            model,
            web,
            encyclopedia,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    /// Interview `persona` about `topic` until a section is written
    ///
    /// # Errors
    ///
    /// Any model failure or timeout ends the interview. Retrieval failures
    /// only shrink the context.
    pub async fn conduct(
        &self,
        topic: &str,
        persona: Persona,
    ) -> Result<InterviewRecord, InterviewError> {
        info!(persona = %persona.name, "Interview started");
        let mut state = InterviewState::new(persona);
        while !state.is_done() {
            state = self.step(topic, state).await?;
        }

        let record = state.into_record();
        info!(
            persona = %record.persona.name,
            turns = record.transcript.len(),
            "Interview complete"
        );
        Ok(record)
    }

    /// Perform the current stage and advance the state once
    pub async fn step(
        &self,
        topic: &str,
        state: InterviewState,
    ) -> Result<InterviewState, InterviewError> {
        let event = match state.stage() {
            Stage::AskQuestion => InterviewEvent::QuestionAsked(self.ask(topic, &state).await?),
            Stage::Retrieve => InterviewEvent::ContextRetrieved(self.retrieve(&state).await?),
            Stage::Answer => InterviewEvent::Answered(self.answer(&state).await?),
            Stage::SaveTranscript => InterviewEvent::TranscriptSaved,
            Stage::WriteSection => InterviewEvent::SectionWritten(self.write_section(&state).await?),
            Stage::Done => return Ok(state),
        };
        transition(state, event, &self.config)
    }

    async fn call<F>(&self, stage: Stage, call: F) -> Result<String, InterviewError>
    where
        F: Future<Output = Result<String, M::Error>>,
    {
        let response = timeout(self.config.call_timeout(), call)
            .await
            .map_err(|_| InterviewError::Timeout(stage))?
            .map_err(|e| InterviewError::Llm {
                stage,
                message: e.to_string(),
            })?;
        debug!(%stage, "Model response length: {} chars", response.len());
        Ok(response)
    }

    async fn ask(&self, topic: &str, state: &InterviewState) -> Result<String, InterviewError> {
        let record = state.record();
        let system = question_instructions(&record.persona.profile_text(), &self.config.closing_phrase);

        let mut history = vec![ChatMessage::user(opening_message(topic))];
        history.extend(record.transcript.as_chat(Role::Analyst));

        self.call(Stage::AskQuestion, self.model.complete(&system, &history))
            .await
    }

    async fn retrieve(&self, state: &InterviewState) -> Result<ContextEntry, InterviewError> {
        let record = state.record();
        let latest_question = record
            .transcript
            .last_analyst_turn()
            .map(|t| t.text.clone())
            .unwrap_or_default();

        let history = [ChatMessage::user(search_request(
            &record.transcript.render(&record.persona.name),
        ))];
        let raw = self
            .call(
                Stage::Retrieve,
                self.model
                    .complete_structured(SEARCH_INSTRUCTIONS, &history, SEARCH_QUERY_SCHEMA),
            )
            .await?;

        let query = match serde_json::from_str::<SearchQuery>(extract_json(&raw)) {
            Ok(q) if !q.search_query.trim().is_empty() => q.search_query,
            Ok(_) => {
                warn!("Empty search query, using the analyst question");
                latest_question
            }
            Err(e) => {
                warn!(error = %e, "Malformed search query, using the analyst question");
                latest_question
            }
        };

        let (web, encyclopedia) = tokio::join!(
            self.fetch(&*self.web, &query, self.config.web_max_results),
            self.fetch(&*self.encyclopedia, &query, self.config.encyclopedia_max_docs),
        );
        info!(
            persona = %record.persona.name,
            query = %query,
            web = web.len(),
            encyclopedia = encyclopedia.len(),
            "Context retrieved"
        );

        Ok(ContextEntry::from_sources(web, encyclopedia))
    }

    async fn fetch<R: Retriever>(&self, retriever: &R, query: &str, max_docs: usize) -> Vec<Document> {
        if max_docs == 0 {
            return Vec::new();
        }
        match timeout(self.config.call_timeout(), retriever.retrieve(query, max_docs)).await {
            Ok(Ok(mut docs)) => {
                docs.truncate(max_docs);
                docs
            }
            Ok(Err(e)) => {
                warn!(retriever = retriever.name(), error = %e, "Retrieval failed");
                Vec::new()
            }
            Err(_) => {
                warn!(retriever = retriever.name(), "Retrieval timed out");
                Vec::new()
            }
        }
    }

    async fn answer(&self, state: &InterviewState) -> Result<String, InterviewError> {
        let record = state.record();
        let system = answer_instructions(&record.persona.profile_text(), &record.context.render());
        let history = record.transcript.as_chat(Role::Persona);

        self.call(Stage::Answer, self.model.complete(&system, &history))
            .await
    }

    async fn write_section(&self, state: &InterviewState) -> Result<String, InterviewError> {
        let record = state.record();
        let transcript = record.transcript_text().ok_or(InterviewError::InvalidTransition {
            stage: Stage::WriteSection,
            event: "SectionWritten",
        })?;

        let system = section_writer_instructions(&record.persona.description);
        let history = [ChatMessage::user(section_request(transcript))];
        let section = self
            .call(Stage::WriteSection, self.model.complete(&system, &history))
            .await?;

        Ok(dedupe_sources(&section))
    }
}
