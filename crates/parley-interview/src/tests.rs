//! Behavioral tests for the interview loop

use crate::{InterviewConfig, InterviewError, Interviewer, Stage};
use parley_domain::{Document, Persona, Role};
use parley_llm::MockProvider;
use parley_retrieval::StaticRetriever;
use std::sync::Arc;

const ANALYST: &str = "You are an analyst";
const SEARCH: &str = "well-structured query";
const PERSONA: &str = "You are a customer being interviewed";
const WRITER: &str = "expert technical writer";

const SECTION: &str = "## Bindings Built to Last\n\
### Summary\n\
Competitive riders value stiffness [1] and fast straps [2].\n\
### Sources\n\
[1] https://example.com/union  \n\
[2] https://example.com/union  ";

fn scripted_llm() -> MockProvider {
    let mut llm = MockProvider::default();
    llm.add_response(ANALYST, "Hi, I'm Ana. What do you look for in a binding?");
    llm.add_response(SEARCH, r#"{"search_query": "union snowboard binding stiffness"}"#);
    llm.add_response(PERSONA, "Stiffness matters most [1].\n[1] https://example.com/union");
    llm.add_response(WRITER, SECTION);
    llm
}

fn docs(prefix: &str) -> Vec<Document> {
    (1..=4)
        .map(|i| Document::web(format!("https://{}.example/{}", prefix, i), "text"))
        .collect()
}

fn persona() -> Persona {
    Persona::new(
        "Jake Thompson",
        "Professional Snowboarder",
        28,
        "Competes internationally and needs durable gear.",
    )
}

fn interviewer(
    llm: MockProvider,
    web: StaticRetriever,
    wiki: StaticRetriever,
    max_num_turns: usize,
) -> Interviewer<MockProvider, StaticRetriever, StaticRetriever> {
    let config = InterviewConfig {
        max_num_turns,
        ..Default::default()
    };
    Interviewer::new(Arc::new(llm), Arc::new(web), Arc::new(wiki), config)
}

#[tokio::test]
async fn test_single_turn_interview() {
    let llm = scripted_llm();
    let web = StaticRetriever::new("web", docs("web"));
    let wiki = StaticRetriever::new("wiki", docs("wiki"));
    let iv = interviewer(llm.clone(), web, wiki, 1);

    let record = iv.conduct("latest snowboard binding", persona()).await.unwrap();

    assert_eq!(record.transcript.count(Role::Analyst), 1);
    assert_eq!(record.transcript.count(Role::Persona), 1);
    assert_eq!(record.context.len(), 1);
    // 3 web documents first, then 2 encyclopedia documents
    let entry = &record.context.entries()[0];
    assert_eq!(entry.documents.len(), 5);
    assert!(entry.documents[0].citation().starts_with("https://web.example"));
    assert!(entry.documents[4].citation().starts_with("https://wiki.example"));

    assert!(record
        .transcript_text()
        .unwrap()
        .starts_with("Analyst: Hi, I'm Ana."));
    assert!(record
        .transcript_text()
        .unwrap()
        .contains("\nJake Thompson: Stiffness matters most"));
    assert!(record.is_finalized());

    assert_eq!(llm.call_count(), 4);
}

#[tokio::test]
async fn test_opening_message_seeds_analyst() {
    let llm = scripted_llm();
    let iv = interviewer(
        llm.clone(),
        StaticRetriever::empty("web"),
        StaticRetriever::empty("wiki"),
        1,
    );
    iv.conduct("latest snowboard binding", persona()).await.unwrap();

    let first = &llm.calls()[0];
    assert!(first.system.contains(ANALYST));
    assert!(first.system.contains("Name: Jake Thompson"));
    assert_eq!(
        first.history[0].content,
        "So you said you were writing an article on latest snowboard binding?"
    );
}

#[tokio::test]
async fn test_turn_limit_bounds_interview() {
    for max in 1..=4 {
        let iv = interviewer(
            scripted_llm(),
            StaticRetriever::empty("web"),
            StaticRetriever::empty("wiki"),
            max,
        );
        let record = iv.conduct("bindings", persona()).await.unwrap();
        assert_eq!(record.transcript.count(Role::Persona), max);
        assert_eq!(record.transcript.count(Role::Analyst), max);
        assert_eq!(record.context.len(), max);
    }
}

#[tokio::test]
async fn test_closing_phrase_stops_early() {
    let mut llm = MockProvider::default();
    llm.add_sequence(
        ANALYST,
        ["First question?", "Great, that's all. Thank you so much for your help!"],
    );
    llm.add_response(SEARCH, r#"{"search_query": "q"}"#);
    llm.add_response(PERSONA, "answer");
    llm.add_response(WRITER, "## T\n### Summary\nx\n### Sources\n");

    let iv = interviewer(
        llm,
        StaticRetriever::empty("web"),
        StaticRetriever::empty("wiki"),
        5,
    );
    let record = iv.conduct("bindings", persona()).await.unwrap();
    assert_eq!(record.transcript.count(Role::Persona), 2);
}

#[tokio::test]
async fn test_same_query_sent_to_both_retrievers() {
    let web = StaticRetriever::new("web", docs("web"));
    let wiki = StaticRetriever::new("wiki", docs("wiki"));
    let iv = interviewer(scripted_llm(), web.clone(), wiki.clone(), 2);

    iv.conduct("bindings", persona()).await.unwrap();

    let expected = vec!["union snowboard binding stiffness"; 2];
    assert_eq!(web.queries(), expected);
    assert_eq!(wiki.queries(), expected);
}

#[tokio::test]
async fn test_malformed_query_falls_back_to_question() {
    let mut llm = MockProvider::default();
    llm.add_response(ANALYST, "What about highbacks?");
    llm.add_response(SEARCH, "not json at all");
    llm.add_response(PERSONA, "answer");
    llm.add_response(WRITER, SECTION);

    let web = StaticRetriever::empty("web");
    let iv = interviewer(llm, web.clone(), StaticRetriever::empty("wiki"), 1);

    iv.conduct("bindings", persona()).await.unwrap();
    assert_eq!(web.queries(), vec!["What about highbacks?"]);
}

#[tokio::test]
async fn test_failing_retrievers_degrade_to_empty_context() {
    let iv = interviewer(
        scripted_llm(),
        StaticRetriever::failing("web"),
        StaticRetriever::failing("wiki"),
        2,
    );
    let record = iv.conduct("bindings", persona()).await.unwrap();

    assert_eq!(record.context.len(), 2);
    assert!(record.context.entries().iter().all(|e| e.is_empty()));
    assert!(record.is_finalized());
}

#[tokio::test]
async fn test_model_failure_is_fatal_with_stage() {
    let mut llm = MockProvider::default();
    llm.add_response(ANALYST, "question?");
    llm.add_response(SEARCH, r#"{"search_query": "q"}"#);
    llm.add_error(PERSONA);

    let iv = interviewer(
        llm,
        StaticRetriever::empty("web"),
        StaticRetriever::empty("wiki"),
        2,
    );
    match iv.conduct("bindings", persona()).await {
        Err(InterviewError::Llm { stage, .. }) => assert_eq!(stage, Stage::Answer),
        other => panic!("Expected Llm error at answer, got {:?}", other),
    }
}

#[tokio::test]
async fn test_section_sources_deduplicated() {
    let iv = interviewer(
        scripted_llm(),
        StaticRetriever::empty("web"),
        StaticRetriever::empty("wiki"),
        1,
    );
    let record = iv.conduct("bindings", persona()).await.unwrap();
    let section = record.section().unwrap();

    assert!(section.contains("stiffness [1] and fast straps [1]."));
    assert_eq!(section.matches("https://example.com/union").count(), 1);
}
