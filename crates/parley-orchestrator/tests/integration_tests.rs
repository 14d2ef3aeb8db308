//! Integration tests for the research orchestrator

use async_trait::async_trait;
use parley_domain::traits::{ModelClient, Retriever};
use parley_domain::{ChatMessage, Document, Role, RunId};
use parley_llm::{LlmError, MockProvider};
use parley_orchestrator::{
    CheckpointError, CheckpointStore, InMemoryCheckpointStore, InterviewOutcome,
    OrchestratorError, ResearchConfig, ResearchOrchestrator, RunPhase, RunState,
};
use parley_retrieval::{RetrievalError, StaticRetriever};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SYNTHESIS: &str = "AI customer personas";
const ANALYST: &str = "You are an analyst";
const SEARCH: &str = "well-structured query";
const PERSONA: &str = "You are a customer being interviewed";
const WRITER: &str = "expert technical writer";

const TWO_PERSONAS: &str = r#"{"personas": [
  {"name": "Jake Thompson", "occupation": "Professional Snowboarder", "age": 28,
   "description": "Competes internationally and needs responsive, durable bindings."},
  {"name": "Maria Lopez", "occupation": "Weekend Rider", "age": 35,
   "description": "Rides a few times a season and wants easy entry and comfort."}
]}"#;

const THREE_PERSONAS: &str = r#"```json
{"personas": [
  {"name": "Jake Thompson", "occupation": "Professional Snowboarder", "age": 28, "description": "Racer"},
  {"name": "Maria Lopez", "occupation": "Weekend Rider", "age": 35, "description": "Casual"},
  {"name": "Chen Wei", "occupation": "Shop Owner", "age": 47, "description": "Stocks gear"}
]}
```"#;

const BUDGET_PERSONAS: &str = r#"{"personas": [
  {"name": "Sam Reed", "occupation": "Student", "age": 20, "description": "Buys second-hand gear"},
  {"name": "Priya Nair", "occupation": "Teacher", "age": 31, "description": "Rents before buying"},
  {"name": "Tom Berg", "occupation": "Parent", "age": 42, "description": "Equips a family of four"}
]}"#;

// Keys into each persona's description, which the section writer receives
const JAKE: &str = "Competes internationally";
const MARIA: &str = "wants easy entry";

const JAKE_SECTION: &str = "## Built for the Podium\n\
### Summary\n\
Racers want stiffness [1].\n\
### Sources\n\
[1] https://web.example/1  ";

const MARIA_SECTION: &str = "## Comfort Over Everything\n\
### Summary\n\
Easy entry [1] beats stiffness [2].\n\
### Sources\n\
[1] https://wiki.example/2  \n\
[2] https://web.example/1  ";

const SECTION: &str = "## Bindings Built to Last\n\
### Summary\n\
Riders value stiffness [1].\n\
### Sources\n\
[1] https://web.example/1  ";

fn scripted_llm(synthesis: &str) -> MockProvider {
    let mut llm = MockProvider::default();
    llm.add_response(SYNTHESIS, synthesis);
    add_interview_script(&mut llm);
    llm
}

fn add_interview_script(llm: &mut MockProvider) {
    llm.add_response(ANALYST, "Hi, I'm Ana. What do you look for in a binding?");
    llm.add_response(SEARCH, r#"{"search_query": "snowboard binding features"}"#);
    llm.add_response(PERSONA, "Stiffness matters most [1].");
    llm.add_response(JAKE, JAKE_SECTION);
    llm.add_response(MARIA, MARIA_SECTION);
    llm.add_response(WRITER, SECTION);
}

fn docs(prefix: &str) -> Vec<Document> {
    (1..=3)
        .map(|i| Document::web(format!("https://{}.example/{}", prefix, i), "text"))
        .collect()
}

fn single_turn_config() -> ResearchConfig {
    let mut config = ResearchConfig::default();
    config.interview.max_num_turns = 1;
    config
}

type Orchestrator<W> = ResearchOrchestrator<MockProvider, W, StaticRetriever, InMemoryCheckpointStore>;

fn orchestrator(
    llm: &MockProvider,
    store: &Arc<InMemoryCheckpointStore>,
    config: ResearchConfig,
) -> Orchestrator<StaticRetriever> {
    ResearchOrchestrator::new(
        Arc::new(llm.clone()),
        Arc::new(StaticRetriever::new("web", docs("web"))),
        Arc::new(StaticRetriever::new("wiki", docs("wiki"))),
        Arc::clone(store),
        config,
    )
    .unwrap()
}

#[tokio::test]
async fn test_snowboard_run_end_to_end() {
    let llm = scripted_llm(TWO_PERSONAS);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, single_turn_config());

    let pending = orch
        .start_synthesis("latest snowboard binding", Some(2))
        .await
        .unwrap();
    assert_eq!(pending.personas.len(), 2);
    let occupations: HashSet<_> = pending.personas.iter().map(|p| &p.occupation).collect();
    assert_eq!(occupations.len(), 2);
    assert_eq!(
        store.load(pending.run_id).unwrap().unwrap().phase(),
        RunPhase::AwaitingApproval
    );

    let result = orch.approve_and_run(pending.run_id).await.unwrap();

    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.sections.len(), 2);
    for (idx, outcome) in result.outcomes.iter().enumerate() {
        assert_eq!(outcome.persona_index(), idx);
        let record = outcome.record().expect("interview completed");
        assert_eq!(record.transcript.count(Role::Analyst), 1);
        assert_eq!(record.transcript.count(Role::Persona), 1);
        assert_eq!(record.context.len(), 1);
        assert!(record.is_finalized());
    }

    let indices: HashSet<_> = result.sections.iter().map(|s| s.persona_index).collect();
    assert_eq!(indices, HashSet::from([0, 1]));
    assert_sections_match_personas(&result.sections);

    // one synthesis call plus four calls per single-turn interview
    assert_eq!(llm.calls_matching(SYNTHESIS), 1);
    assert_eq!(llm.call_count(), 9);

    assert_eq!(result.metrics.interviews_completed, 2);
    assert_eq!(result.metrics.interviews_failed, 0);

    let report = result.report().render();
    assert!(report.starts_with("# latest snowboard binding\n\n## Built for the Podium"));
    assert!(report.contains("\n\n---\n\n## Comfort Over Everything"));
    // Maria's citations follow the report-wide numbering
    assert!(report.contains("Easy entry [2] beats stiffness [1]."));
    assert!(report.ends_with(
        "## Sources\n[1] https://web.example/1  \n[2] https://wiki.example/2  \n"
    ));

    assert_eq!(
        store.load(pending.run_id).unwrap().unwrap().phase(),
        RunPhase::Completed
    );
    assert!(orch.pending(pending.run_id).unwrap().is_none());
}

fn assert_sections_match_personas(sections: &[parley_orchestrator::Section]) {
    for section in sections {
        let (name, title) = match section.persona_index {
            0 => ("Jake Thompson", "## Built for the Podium"),
            1 => ("Maria Lopez", "## Comfort Over Everything"),
            other => panic!("unexpected persona index {}", other),
        };
        assert_eq!(section.persona_name, name);
        assert!(section.text.starts_with(title), "{} got {}", name, section.text);
    }
}

/// Model that stalls every call whose prompt mentions `needle`
struct StallingModel {
    inner: MockProvider,
    needle: &'static str,
}

impl StallingModel {
    async fn stall(&self, system: &str) {
        if system.contains(self.needle) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

#[async_trait]
impl ModelClient for StallingModel {
    type Error = LlmError;

    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String, Self::Error> {
        self.stall(system).await;
        self.inner.complete(system, history).await
    }

    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatMessage],
        schema: &str,
    ) -> Result<String, Self::Error> {
        self.stall(system).await;
        self.inner.complete_structured(system, history, schema).await
    }
}

#[tokio::test]
async fn test_sections_keep_their_persona_when_finishing_out_of_order() {
    let model = StallingModel {
        inner: scripted_llm(TWO_PERSONAS),
        needle: JAKE,
    };
    let orch = ResearchOrchestrator::new(
        Arc::new(model),
        Arc::new(StaticRetriever::new("web", docs("web"))),
        Arc::new(StaticRetriever::new("wiki", docs("wiki"))),
        Arc::new(InMemoryCheckpointStore::new()),
        single_turn_config(),
    )
    .unwrap();

    let pending = orch.start_synthesis("bindings", Some(2)).await.unwrap();
    let result = orch.approve_and_run(pending.run_id).await.unwrap();

    // Jake's interview stalls, so Maria's section is joined first
    let order: Vec<_> = result.sections.iter().map(|s| s.persona_index).collect();
    assert_eq!(order, vec![1, 0]);
    assert_sections_match_personas(&result.sections);

    let report = result.report();
    assert_eq!(report.sections[0].persona_name, "Jake Thompson");
    assert!(report.sections[0].text.starts_with("## Built for the Podium"));
    assert!(report.sections[1].text.starts_with("## Comfort Over Everything"));
}

#[tokio::test]
async fn test_feedback_replaces_persona_set() {
    let mut llm = MockProvider::default();
    llm.add_sequence(SYNTHESIS, [THREE_PERSONAS, BUDGET_PERSONAS]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, ResearchConfig::default());

    let first = orch
        .start_synthesis("latest snowboard binding", Some(3))
        .await
        .unwrap();
    assert_eq!(first.personas.get(0).unwrap().name, "Jake Thompson");

    let revised = orch
        .revise_synthesis(first.run_id, "focus on budget buyers")
        .await
        .unwrap();

    assert_eq!(revised.run_id, first.run_id);
    assert_eq!(revised.personas.len(), 3);
    let names: Vec<_> = revised.personas.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Sam Reed", "Priya Nair", "Tom Berg"]);

    assert_eq!(llm.calls_matching(SYNTHESIS), 2);
    let calls = llm.calls();
    assert!(!calls[0].system.contains("focus on budget buyers"));
    assert!(calls[1].system.contains("focus on budget buyers"));
    assert!(calls[1].structured);

    let pending = orch.pending(first.run_id).unwrap().unwrap();
    assert_eq!(pending.personas, revised.personas);
}

#[tokio::test]
async fn test_failed_revision_keeps_previous_personas() {
    let mut llm = MockProvider::default();
    llm.add_sequence(SYNTHESIS, [TWO_PERSONAS, "ERROR"]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, ResearchConfig::default());

    let pending = orch.start_synthesis("bindings", Some(2)).await.unwrap();
    let err = orch
        .revise_synthesis(pending.run_id, "more beginners")
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Synthesis(_)));

    let still = orch.pending(pending.run_id).unwrap().unwrap();
    assert_eq!(still.personas, pending.personas);
}

#[tokio::test]
async fn test_failed_start_stores_nothing() {
    let llm = scripted_llm("this is not json");
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, ResearchConfig::default());

    let err = orch.start_synthesis("bindings", Some(2)).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Synthesis(_)));
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_run_is_rejected() {
    let llm = scripted_llm(TWO_PERSONAS);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, ResearchConfig::default());
    let missing = RunId::new();

    let err = orch.revise_synthesis(missing, "anything").await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Checkpoint(CheckpointError::UnknownRun(id)) if id == missing
    ));

    let err = orch.approve_and_run(missing).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Checkpoint(CheckpointError::UnknownRun(_))
    ));

    assert!(orch.pending(missing).unwrap().is_none());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_completed_run_is_not_awaiting_approval() {
    let llm = scripted_llm(TWO_PERSONAS);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, single_turn_config());

    let pending = orch.start_synthesis("bindings", Some(2)).await.unwrap();
    orch.approve_and_run(pending.run_id).await.unwrap();
    let calls = llm.call_count();

    let err = orch.approve_and_run(pending.run_id).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Checkpoint(CheckpointError::NotAwaitingApproval {
            phase: RunPhase::Completed,
            ..
        })
    ));

    let err = orch
        .revise_synthesis(pending.run_id, "again")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Checkpoint(CheckpointError::NotAwaitingApproval { .. })
    ));
    assert_eq!(llm.call_count(), calls);
}

/// Store whose reads keep returning the first checkpoint saved
///
/// Stands in for a second caller that loaded the run before the first
/// approval was written.
#[derive(Default)]
struct StaleReadStore {
    inner: InMemoryCheckpointStore,
    first: Mutex<Option<RunState>>,
}

impl CheckpointStore for StaleReadStore {
    type Error = CheckpointError;

    fn save(&self, state: &RunState) -> Result<(), Self::Error> {
        self.first.lock().unwrap().get_or_insert_with(|| state.clone());
        self.inner.save(state)
    }

    fn replace_if(
        &self,
        expected: RunPhase,
        state: &RunState,
    ) -> Result<Option<RunPhase>, Self::Error> {
        self.inner.replace_if(expected, state)
    }

    fn load(&self, run_id: RunId) -> Result<Option<RunState>, Self::Error> {
        match self.first.lock().unwrap().clone() {
            Some(state) if state.run_id == run_id => Ok(Some(state)),
            _ => self.inner.load(run_id),
        }
    }

    fn remove(&self, run_id: RunId) -> Result<Option<RunState>, Self::Error> {
        self.inner.remove(run_id)
    }

    fn list(&self) -> Result<Vec<RunId>, Self::Error> {
        self.inner.list()
    }
}

#[tokio::test]
async fn test_second_approval_with_stale_read_does_not_interview_again() {
    let llm = scripted_llm(TWO_PERSONAS);
    let store = Arc::new(StaleReadStore::default());
    let orch = ResearchOrchestrator::new(
        Arc::new(llm.clone()),
        Arc::new(StaticRetriever::new("web", docs("web"))),
        Arc::new(StaticRetriever::new("wiki", docs("wiki"))),
        Arc::clone(&store),
        single_turn_config(),
    )
    .unwrap();

    let pending = orch.start_synthesis("bindings", Some(2)).await.unwrap();
    orch.approve_and_run(pending.run_id).await.unwrap();
    let calls = llm.call_count();

    // the stale read still says awaiting approval; the write must not
    let err = orch.approve_and_run(pending.run_id).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Checkpoint(CheckpointError::NotAwaitingApproval {
            phase: RunPhase::Completed,
            ..
        })
    ));
    assert_eq!(llm.call_count(), calls);
    assert_eq!(
        store.inner.load(pending.run_id).unwrap().unwrap().phase(),
        RunPhase::Completed
    );
}

#[tokio::test]
async fn test_forget_drops_completed_run() {
    let llm = scripted_llm(TWO_PERSONAS);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, single_turn_config());

    let pending = orch.start_synthesis("bindings", Some(2)).await.unwrap();
    orch.approve_and_run(pending.run_id).await.unwrap();

    assert!(orch.forget(pending.run_id).unwrap());
    assert!(store.list().unwrap().is_empty());
    assert!(!orch.forget(pending.run_id).unwrap());

    let err = orch.approve_and_run(pending.run_id).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Checkpoint(CheckpointError::UnknownRun(_))
    ));
}

#[tokio::test]
async fn test_failed_interview_does_not_stop_run() {
    let mut llm = MockProvider::default();
    llm.add_error("Name: Maria Lopez");
    llm.add_response(SYNTHESIS, TWO_PERSONAS);
    add_interview_script(&mut llm);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let orch = orchestrator(&llm, &store, single_turn_config());

    let pending = orch.start_synthesis("bindings", Some(2)).await.unwrap();
    let result = orch.approve_and_run(pending.run_id).await.unwrap();

    assert_eq!(result.outcomes.len(), 2);
    assert!(result.outcomes[0].is_completed());
    match &result.outcomes[1] {
        InterviewOutcome::Failed {
            persona_index,
            persona_name,
            error,
        } => {
            assert_eq!(*persona_index, 1);
            assert_eq!(persona_name, "Maria Lopez");
            assert!(error.contains("ask_question"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    assert_eq!(result.sections.len(), 1);
    assert_eq!(result.sections[0].persona_name, "Jake Thompson");
    assert_eq!(result.failures().count(), 1);
    assert_eq!(result.metrics.interviews_failed, 1);
    assert_eq!(
        store.load(pending.run_id).unwrap().unwrap().phase(),
        RunPhase::Completed
    );
}

/// Web retriever that records how many lookups overlap
#[derive(Default)]
struct OverlapRetriever {
    active: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Retriever for OverlapRetriever {
    type Error = RetrievalError;

    fn name(&self) -> &str {
        "overlap"
    }

    async fn retrieve(&self, query: &str, _max_docs: usize) -> Result<Vec<Document>, Self::Error> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![Document::web("https://overlap.example", query)])
    }
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
    let llm = scripted_llm(THREE_PERSONAS);
    let web = Arc::new(OverlapRetriever::default());
    let config = ResearchConfig {
        max_concurrent_interviews: 1,
        ..single_turn_config()
    };
    let orch = ResearchOrchestrator::new(
        Arc::new(llm.clone()),
        Arc::clone(&web),
        Arc::new(StaticRetriever::empty("wiki")),
        Arc::new(InMemoryCheckpointStore::new()),
        config,
    )
    .unwrap();

    let pending = orch.start_synthesis("bindings", Some(3)).await.unwrap();
    let result = orch.approve_and_run(pending.run_id).await.unwrap();

    assert_eq!(result.sections.len(), 3);
    assert_eq!(web.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let config = ResearchConfig {
        max_concurrent_interviews: 0,
        ..Default::default()
    };
    let result = ResearchOrchestrator::new(
        Arc::new(MockProvider::default()),
        Arc::new(StaticRetriever::empty("web")),
        Arc::new(StaticRetriever::empty("wiki")),
        Arc::new(InMemoryCheckpointStore::new()),
        config,
    );
    assert!(matches!(result, Err(OrchestratorError::Config(_))));
}
