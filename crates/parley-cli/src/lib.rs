//! Parley CLI library.
//!
//! This library provides the core functionality for the Parley command-line interface,
//! including configuration management, client construction, the persona review loop,
//! and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod providers;
pub mod review;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
