//! Personas command implementation.

use crate::cli::PersonasArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::providers::build_model;
use parley_synthesizer::PersonaSynthesizer;
use std::sync::Arc;

/// Execute the personas command.
pub async fn execute_personas(
    args: PersonasArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let count = args
        .max_personas
        .unwrap_or(config.research.default_personas);
    let model = Arc::new(build_model(config, count)?);
    let synthesizer = PersonaSynthesizer::new(model, config.research.synthesizer());

    let personas = synthesizer
        .synthesize(&args.topic, count, args.feedback.as_deref())
        .await?;

    println!("{}", formatter.format_personas(&personas)?);
    Ok(())
}
