//! Parley Orchestrator
//!
//! Runs a research session from topic to report.
//!
//! # Overview
//!
//! A run has two phases separated by a human checkpoint:
//! - **Synthesis**: generate a persona panel for the topic, then suspend and
//!   hand the panel back as a [`PendingApproval`]
//! - **Review**: the caller either revises with feedback (re-synthesis
//!   replaces the panel) or approves
//! - **Interviews**: one task per persona in a `JoinSet`, bounded by a
//!   semaphore; sections are collected as tasks finish
//!
//! Between calls the run lives in a [`CheckpointStore`] keyed by [`RunId`].
//!
//! ## Run Lifecycle
//!
//! | Phase | Entered on | Leaves on |
//! |-------|------------|-----------|
//! | `Synthesizing` | start, feedback | personas generated |
//! | `AwaitingApproval` | personas generated | feedback, approval |
//! | `Interviewing` | approval | all interviews joined |
//! | `Completed` | all interviews joined | never |
//!
//! # Usage
//!
//! ```no_run
//! use parley_llm::MockProvider;
//! use parley_orchestrator::{InMemoryCheckpointStore, ResearchConfig, ResearchOrchestrator};
//! use parley_retrieval::StaticRetriever;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = ResearchOrchestrator::new(
//!     Arc::new(MockProvider::default()),
//!     Arc::new(StaticRetriever::empty("web")),
//!     Arc::new(StaticRetriever::empty("wiki")),
//!     Arc::new(InMemoryCheckpointStore::new()),
//!     ResearchConfig::default(),
//! )?;
//!
//! let pending = orchestrator.start_synthesis("latest snowboard binding", Some(2)).await?;
//! let pending = orchestrator
//!     .revise_synthesis(pending.run_id, "focus on budget buyers")
//!     .await?;
//! let result = orchestrator.approve_and_run(pending.run_id).await?;
//!
//! println!("{}", result.report().render());
//! println!("{}", result.metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! [`RunId`]: parley_domain::RunId

#![warn(missing_docs)]

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod types;

pub use checkpoint::{CheckpointStore, InMemoryCheckpointStore, RunEvent, RunPhase, RunState};
pub use config::ResearchConfig;
pub use error::{CheckpointError, OrchestratorError};
pub use metrics::RunMetrics;
pub use orchestrator::ResearchOrchestrator;
pub use report::FinalReport;
pub use types::{InterviewOutcome, PendingApproval, RunResult, Section};
