//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use crate::providers::{build_model, build_retrievers};
use crate::review::{AutoApprove, Decision, InteractiveReviewer, Reviewer};
use parley_domain::traits::{ModelClient, Retriever};
use parley_orchestrator::{
    CheckpointStore, InMemoryCheckpointStore, ResearchOrchestrator, RunResult,
};
use std::fs;
use std::sync::Arc;

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut research = config.research.clone();
    if let Some(turns) = args.max_turns {
        research.interview.max_num_turns = turns;
    }
    let count = args.max_personas.unwrap_or(research.default_personas);

    let model = Arc::new(build_model(config, count)?);
    let (web, encyclopedia) = build_retrievers(config);
    let orchestrator = ResearchOrchestrator::new(
        model,
        Arc::new(web),
        Arc::new(encyclopedia),
        Arc::new(InMemoryCheckpointStore::new()),
        research,
    )?;

    let result = if args.yes {
        run_session(&orchestrator, &args.topic, count, &mut AutoApprove, formatter).await?
    } else {
        let mut reviewer = InteractiveReviewer::new()?;
        run_session(&orchestrator, &args.topic, count, &mut reviewer, formatter).await?
    };

    println!("{}", formatter.format_run(&result, args.report)?);

    if let Some(path) = &args.output {
        fs::write(path, result.report().render())?;
        eprintln!(
            "{}",
            formatter.success(&format!("Report written to {}", path.display()))
        );
    }

    eprintln!(
        "{}",
        formatter.info(&format!(
            "{} of {} interviews completed in {}ms",
            result.metrics.interviews_completed,
            result.metrics.interviews_started,
            result.metrics.total_runtime_ms
        ))
    );
    Ok(())
}

/// Synthesize, loop through review until approval, then run the interviews.
///
/// The finished run is dropped from the checkpoint store once its result is
/// in hand.
///
/// Each persona set is shown before the reviewer decides. In JSON mode the
/// sets go to stderr so stdout carries only the final result.
pub async fn run_session<M, W, E, S, R>(
    orchestrator: &ResearchOrchestrator<M, W, E, S>,
    topic: &str,
    count: usize,
    reviewer: &mut R,
    formatter: &Formatter,
) -> Result<RunResult>
where
    M: ModelClient + 'static,
    W: Retriever + 'static,
    E: Retriever + 'static,
    S: CheckpointStore,
    R: Reviewer,
{
    let mut pending = orchestrator.start_synthesis(topic, Some(count)).await?;

    loop {
        let shown = formatter.format_personas(&pending.personas)?;
        if formatter.format() == OutputFormat::Json {
            eprintln!("{}", shown);
        } else {
            println!("{}", shown);
        }

        match reviewer.review(&pending)? {
            Decision::Approve => break,
            Decision::Revise(feedback) => {
                eprintln!("{}", formatter.info("Regenerating personas..."));
                pending = orchestrator
                    .revise_synthesis(pending.run_id, &feedback)
                    .await?;
            }
        }
    }

    eprintln!(
        "{}",
        formatter.info(&format!("Interviewing {} personas...", pending.personas.len()))
    );
    let result = orchestrator.approve_and_run(pending.run_id).await?;
    orchestrator.forget(pending.run_id)?;
    Ok(result)
}
