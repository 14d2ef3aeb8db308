//! Builds the model and retrieval clients a command runs against.

use crate::config::Config;
use crate::error::{CliError, Result};
use parley_domain::Document;
use parley_llm::{LlmClient, MockProvider, OllamaProvider, OpenAiProvider, ProviderKind};
use parley_retrieval::{SearchClient, StaticRetriever, TavilySearch, WikipediaSearch};
use std::time::Duration;
use tracing::{info, warn};

const DEMO_PERSONAS: [(&str, &str, u32, &str); 10] = [
    ("Jake Thompson", "Professional Snowboarder", 28, "Competes internationally and needs responsive, durable gear."),
    ("Maria Lopez", "Weekend Rider", 35, "Rides a few times a season and values comfort and easy setup."),
    ("Chen Wei", "Shop Owner", 47, "Stocks gear for a mountain town and cares about margins and returns."),
    ("Aisha Bello", "Ski Instructor", 31, "Teaches beginners and wants forgiving, adjustable equipment."),
    ("Tom Berg", "Parent", 42, "Buys for a family of four and watches every dollar."),
    ("Priya Nair", "Product Reviewer", 29, "Tests gear for a popular blog and compares specs closely."),
    ("Lukas Meyer", "Backcountry Guide", 38, "Needs gear that survives long tours in harsh conditions."),
    ("Sofia Rossi", "University Student", 21, "Buys second-hand and follows trends on social media."),
    ("Ben Carter", "Rental Manager", 45, "Runs a rental fleet and needs fast, foolproof adjustments."),
    ("Hana Sato", "Freestyle Competitor", 24, "Lands big tricks and wants flex with strong support."),
];

/// Build the configured model client.
///
/// `persona_count` sizes the scripted persona set of the mock provider.
pub fn build_model(config: &Config, persona_count: usize) -> Result<LlmClient> {
    let llm = &config.llm;
    let timeout = Duration::from_secs(llm.timeout_secs);

    let client = match llm.provider {
        ProviderKind::Ollama => {
            let endpoint = llm
                .endpoint
                .clone()
                .unwrap_or_else(|| parley_llm::ollama::DEFAULT_ENDPOINT.to_string());
            LlmClient::Ollama(
                OllamaProvider::with_timeout(endpoint, &llm.model, timeout)
                    .with_max_retries(llm.max_retries),
            )
        }
        ProviderKind::OpenAi => {
            let endpoint = llm
                .endpoint
                .clone()
                .unwrap_or_else(|| parley_llm::openai::DEFAULT_BASE_URL.to_string());
            let api_key = std::env::var(&llm.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty());
            if api_key.is_none() {
                warn!(var = %llm.api_key_env, "No API key set, sending unauthenticated requests");
            }
            LlmClient::OpenAi(OpenAiProvider::with_timeout(endpoint, &llm.model, api_key, timeout))
        }
        ProviderKind::Mock => LlmClient::Mock(demo_model(persona_count)?),
    };

    info!(provider = %client.kind(), model = %llm.model, "Model client ready");
    Ok(client)
}

/// Build the web and encyclopedia retrievers.
///
/// The mock provider gets fixed documents. A missing Tavily key degrades web
/// search to no results instead of failing the run.
pub fn build_retrievers(config: &Config) -> (SearchClient, SearchClient) {
    if config.llm.provider == ProviderKind::Mock {
        return (
            SearchClient::Static(StaticRetriever::new("web", demo_documents("web"))),
            SearchClient::Static(StaticRetriever::new("wiki", demo_documents("wiki"))),
        );
    }

    let retrieval = &config.retrieval;
    let web = match TavilySearch::from_env(&retrieval.tavily_endpoint, &retrieval.tavily_api_key_env) {
        Ok(search) => SearchClient::Tavily(search),
        Err(e) => {
            warn!(error = %e, "Web search disabled");
            SearchClient::Static(StaticRetriever::empty("web"))
        }
    };
    let encyclopedia = SearchClient::Wikipedia(WikipediaSearch::new(&retrieval.wikipedia_endpoint));

    (web, encyclopedia)
}

fn demo_model(persona_count: usize) -> Result<MockProvider> {
    if persona_count == 0 || persona_count > DEMO_PERSONAS.len() {
        return Err(CliError::InvalidInput(format!(
            "the mock provider scripts between 1 and {} personas",
            DEMO_PERSONAS.len()
        )));
    }

    let personas: Vec<serde_json::Value> = DEMO_PERSONAS
        .iter()
        .take(persona_count)
        .map(|(name, occupation, age, description)| {
            serde_json::json!({
                "name": name,
                "occupation": occupation,
                "age": age,
                "description": description,
            })
        })
        .collect();

    let mut mock = MockProvider::default();
    mock.add_response(
        "AI customer personas",
        serde_json::json!({ "personas": personas }).to_string(),
    );
    mock.add_sequence(
        "You are an analyst",
        [
            "Hi, I'm Alex from the research desk. What matters most to you in this product?",
            "Which trade-offs would you accept to get that? Thank you so much for your help!",
        ],
    );
    mock.add_response("well-structured query", r#"{"search_query": "product buyer priorities"}"#);
    mock.add_response(
        "You are a customer being interviewed",
        "Reliability comes first for me [1], then price [2].\n\n\
         [1] https://web.example/reviews\n[2] https://wiki.example/pricing",
    );
    mock.add_response(
        "expert technical writer",
        "## Reliability Before Everything\n\
         ### Summary\n\
         Buyers rank reliability above all [1] and weigh price second [2].\n\
         ### Sources\n\
         [1] https://web.example/reviews  \n\
         [2] https://wiki.example/pricing  ",
    );
    Ok(mock)
}

fn demo_documents(prefix: &str) -> Vec<Document> {
    match prefix {
        "wiki" => vec![Document::encyclopedia(
            "https://wiki.example/pricing",
            None,
            "Price sensitivity varies strongly between casual and expert buyers.",
        )],
        _ => vec![Document::web(
            "https://web.example/reviews",
            "Reviewers consistently rank reliability as the top buying criterion.",
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::traits::{ModelClient, Retriever};

    fn mock_config() -> Config {
        let mut config = Config::default();
        config.llm.provider = ProviderKind::Mock;
        config
    }

    #[tokio::test]
    async fn test_mock_model_scripts_requested_count() {
        let client = build_model(&mock_config(), 3).unwrap();
        assert_eq!(client.kind(), ProviderKind::Mock);

        let raw = client
            .complete_structured("You are tasked with creating a set of AI customer personas.", &[], "{}")
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["personas"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_mock_model_rejects_oversized_panel() {
        assert!(build_model(&mock_config(), 11).is_err());
    }

    #[test]
    fn test_ollama_is_default() {
        let client = build_model(&Config::default(), 3).unwrap();
        assert_eq!(client.kind(), ProviderKind::Ollama);
    }

    #[tokio::test]
    async fn test_mock_retrievers_are_static() {
        let (web, wiki) = build_retrievers(&mock_config());
        assert_eq!(web.name(), "web");
        assert_eq!(wiki.retrieve("anything", 2).await.unwrap().len(), 1);
    }
}
