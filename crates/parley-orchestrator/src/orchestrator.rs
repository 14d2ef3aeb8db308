//! Two-phase research run: synthesize and review, then interview in parallel

use crate::checkpoint::{CheckpointStore, RunEvent, RunPhase, RunState};
use crate::config::ResearchConfig;
use crate::error::{CheckpointError, OrchestratorError};
use crate::metrics::RunMetrics;
use crate::types::{InterviewOutcome, PendingApproval, RunResult, Section};
use parley_domain::traits::{ModelClient, Retriever};
use parley_domain::{InterviewRecord, PersonaSet, RunId};
use parley_interview::Interviewer;
use parley_synthesizer::{PersonaSynthesizer, SynthesisEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

type TaskOutput = (usize, String, Result<InterviewRecord, String>, Duration);

/// Coordinates persona synthesis, the approval checkpoint and the interview fan-out
///
/// Every call takes or returns a [`RunId`]; the run's state between calls
/// lives in the checkpoint store `S`, so a caller can suspend at
/// [`PendingApproval`] for as long as the human needs.
pub struct ResearchOrchestrator<M, W, E, S>
where
    M: ModelClient + 'static,
    W: Retriever + 'static,
    E: Retriever + 'static,
    S: CheckpointStore,
{
    synthesizer: PersonaSynthesizer<M>,
    interviewer: Interviewer<M, W, E>,
    store: Arc<S>,
    config: ResearchConfig,
}

impl<M, W, E, S> ResearchOrchestrator<M, W, E, S>
where
    M: ModelClient + 'static,
    W: Retriever + 'static,
    E: Retriever + 'static,
    S: CheckpointStore,
{
    /// Create a new orchestrator
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::Config` if the configuration is invalid.
    pub fn new(
        model: Arc<M>,
        web: Arc<W>,
        encyclopedia: Arc<E>,
        store: Arc<S>,
        config: ResearchConfig,
    ) -> Result<Self, OrchestratorError> {
        config.validate().map_err(OrchestratorError::Config)?;

        Ok(Self {
            synthesizer: PersonaSynthesizer::new(Arc::clone(&model), config.synthesizer()),
            interviewer: Interviewer::new(model, web, encyclopedia, config.interview.clone()),
            store,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Synthesize personas for a new run and suspend for review
    ///
    /// `max_count` falls back to `default_personas`. Nothing is stored when
    /// synthesis fails.
    pub async fn start_synthesis(
        &self,
        topic: &str,
        max_count: Option<usize>,
    ) -> Result<PendingApproval, OrchestratorError> {
        let count = max_count.unwrap_or(self.config.default_personas);
        let personas = self.synthesizer.synthesize(topic, count, None).await?;

        let state = RunState::new(topic.trim(), count)
            .apply(RunEvent::Synthesis(SynthesisEvent::PersonasGenerated(personas)))?;
        self.save(&state)?;

        info!(run_id = %state.run_id, count, "Run awaiting approval");
        pending_from(&state)
    }

    /// Regenerate the personas of a suspended run using `feedback`
    ///
    /// The new set replaces the old one. If synthesis fails the stored run
    /// keeps its previous personas and stays awaiting approval. A run that
    /// was approved while synthesis ran is left alone and reported as
    /// `NotAwaitingApproval`.
    pub async fn revise_synthesis(
        &self,
        run_id: RunId,
        feedback: &str,
    ) -> Result<PendingApproval, OrchestratorError> {
        let state = self.awaiting(run_id)?;
        let state = state.apply(RunEvent::Synthesis(SynthesisEvent::FeedbackProvided(
            feedback.to_string(),
        )))?;

        info!(%run_id, "Revising personas");
        let personas = self
            .synthesizer
            .synthesize(
                &state.topic,
                state.requested_persona_count,
                state.synthesis().feedback(),
            )
            .await?;

        let state = state.apply(RunEvent::Synthesis(SynthesisEvent::PersonasGenerated(personas)))?;
        self.replace_awaiting(&state)?;
        pending_from(&state)
    }

    /// Inspect a run; `None` unless it is awaiting approval
    pub fn pending(&self, run_id: RunId) -> Result<Option<PendingApproval>, OrchestratorError> {
        match self.load(run_id)? {
            Some(state) if state.phase() == RunPhase::AwaitingApproval => {
                pending_from(&state).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Approve the current personas and interview each of them
    ///
    /// Interviews run concurrently, at most `max_concurrent_interviews` at a
    /// time. A failed interview becomes a failed outcome; the run itself
    /// only errors on checkpoint problems. Of two concurrent approvals of the
    /// same run, only one starts the interviews.
    pub async fn approve_and_run(&self, run_id: RunId) -> Result<RunResult, OrchestratorError> {
        let state = self
            .awaiting(run_id)?
            .apply(RunEvent::Synthesis(SynthesisEvent::Approved))?;
        self.replace_awaiting(&state)?;

        let personas = state
            .personas()
            .cloned()
            .ok_or(CheckpointError::NotAwaitingApproval {
                run_id,
                phase: state.phase(),
            })?;

        info!(%run_id, interviews = personas.len(), "Personas approved, starting interviews");
        let started = Instant::now();
        let (outcomes, sections, mut metrics) = self.interview_all(&state.topic, &personas).await;
        metrics.total_runtime_ms = started.elapsed().as_millis() as u64;

        let state = state.apply(RunEvent::InterviewsFinished)?;
        self.save(&state)?;

        info!(
            %run_id,
            completed = metrics.interviews_completed,
            failed = metrics.interviews_failed,
            "Run complete"
        );

        Ok(RunResult {
            run_id,
            topic: state.topic,
            personas,
            outcomes,
            sections,
            metrics,
        })
    }

    /// Drop a stored run, returning whether it existed
    pub fn forget(&self, run_id: RunId) -> Result<bool, OrchestratorError> {
        let removed = self
            .store
            .remove(run_id)
            .map_err(|e| OrchestratorError::from(CheckpointError::Store(e.to_string())))?;
        debug!(%run_id, removed = removed.is_some(), "Forgot run");
        Ok(removed.is_some())
    }

    async fn interview_all(
        &self,
        topic: &str,
        personas: &PersonaSet,
    ) -> (Vec<InterviewOutcome>, Vec<Section>, RunMetrics) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_interviews));
        let mut metrics = RunMetrics::new();
        let mut join_set: JoinSet<TaskOutput> = JoinSet::new();

        for (idx, persona) in personas.iter().cloned().enumerate() {
            let interviewer = self.interviewer.clone();
            let semaphore = Arc::clone(&semaphore);
            let topic = topic.to_string();
            metrics.record_started();

            join_set.spawn(async move {
                let name = persona.name.clone();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (idx, name, Err(e.to_string()), Duration::ZERO),
                };
                let started = Instant::now();
                let result = interviewer
                    .conduct(&topic, persona)
                    .await
                    .map_err(|e| e.to_string());
                (idx, name, result, started.elapsed())
            });
        }

        let mut slots: Vec<Option<InterviewOutcome>> = vec![None; personas.len()];
        let mut sections = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let (idx, name, result, elapsed) = match joined {
                Ok(output) => output,
                Err(e) => {
                    warn!(error = %e, "Interview task join error");
                    continue;
                }
            };

            match result {
                Ok(record) => {
                    debug!(persona = %name, elapsed_ms = elapsed.as_millis() as u64, "Interview joined");
                    metrics.record_completed(&record, elapsed);
                    sections.push(Section {
                        persona_index: idx,
                        persona_name: name,
                        text: record.section().unwrap_or_default().to_string(),
                    });
                    slots[idx] = Some(InterviewOutcome::Completed {
                        persona_index: idx,
                        record: Box::new(record),
                    });
                }
                Err(error) => {
                    warn!(persona = %name, error = %error, "Interview failed");
                    metrics.record_failed(elapsed);
                    slots[idx] = Some(InterviewOutcome::Failed {
                        persona_index: idx,
                        persona_name: name,
                        error,
                    });
                }
            }
        }

        let outcomes = slots
            .into_iter()
            .zip(personas.iter())
            .enumerate()
            .map(|(idx, (slot, persona))| {
                slot.unwrap_or_else(|| {
                    metrics.record_failed(Duration::ZERO);
                    InterviewOutcome::Failed {
                        persona_index: idx,
                        persona_name: persona.name.clone(),
                        error: "interview task did not complete".to_string(),
                    }
                })
            })
            .collect();

        (outcomes, sections, metrics)
    }

    fn awaiting(&self, run_id: RunId) -> Result<RunState, OrchestratorError> {
        let state = self.load(run_id)?.ok_or(CheckpointError::UnknownRun(run_id))?;
        if state.phase() != RunPhase::AwaitingApproval {
            return Err(CheckpointError::NotAwaitingApproval {
                run_id,
                phase: state.phase(),
            }
            .into());
        }
        Ok(state)
    }

    /// Write `state` only if the stored run is still awaiting approval
    fn replace_awaiting(&self, state: &RunState) -> Result<(), OrchestratorError> {
        debug!(run_id = %state.run_id, phase = %state.phase(), "Replacing checkpoint");
        let run_id = state.run_id;
        match self
            .store
            .replace_if(RunPhase::AwaitingApproval, state)
            .map_err(|e| CheckpointError::Store(e.to_string()))?
        {
            Some(RunPhase::AwaitingApproval) => Ok(()),
            Some(phase) => Err(CheckpointError::NotAwaitingApproval { run_id, phase }.into()),
            None => Err(CheckpointError::UnknownRun(run_id).into()),
        }
    }

    fn load(&self, run_id: RunId) -> Result<Option<RunState>, OrchestratorError> {
        self.store
            .load(run_id)
            .map_err(|e| CheckpointError::Store(e.to_string()).into())
    }

    fn save(&self, state: &RunState) -> Result<(), OrchestratorError> {
        debug!(run_id = %state.run_id, phase = %state.phase(), "Saving checkpoint");
        self.store
            .save(state)
            .map_err(|e| CheckpointError::Store(e.to_string()).into())
    }
}

fn pending_from(state: &RunState) -> Result<PendingApproval, OrchestratorError> {
    let personas = state
        .personas()
        .cloned()
        .ok_or(CheckpointError::NotAwaitingApproval {
            run_id: state.run_id,
            phase: state.phase(),
        })?;

    Ok(PendingApproval {
        run_id: state.run_id,
        topic: state.topic.clone(),
        personas,
    })
}
