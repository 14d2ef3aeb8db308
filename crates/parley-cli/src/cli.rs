//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parley CLI - Interview synthetic customers and compile a research report.
#[derive(Debug, Parser)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model provider, overriding the config file
    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderArg>,

    /// Model name, overriding the config file
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
}

/// Model provider options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible API
    Openai,
    /// Offline scripted model
    Mock,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full research session: personas, review, interviews, report
    Run(RunArgs),

    /// Generate personas only
    Personas(PersonasArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Product topic to research
    pub topic: String,

    /// Number of personas to interview
    #[arg(short = 'n', long)]
    pub max_personas: Option<usize>,

    /// Persona answers per interview
    #[arg(short = 't', long)]
    pub max_turns: Option<usize>,

    /// Approve the first persona set without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Write the combined report to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the combined report instead of separate sections
    #[arg(long)]
    pub report: bool,
}

/// Arguments for the personas command.
#[derive(Debug, Parser)]
pub struct PersonasArgs {
    /// Product topic
    pub topic: String,

    /// Number of personas to generate
    #[arg(short = 'n', long)]
    pub max_personas: Option<usize>,

    /// Editorial guidance for the generation
    #[arg(long)]
    pub feedback: Option<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Markdown => crate::config::OutputFormat::Markdown,
        }
    }
}

impl From<ProviderArg> for parley_llm::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Ollama => parley_llm::ProviderKind::Ollama,
            ProviderArg::Openai => parley_llm::ProviderKind::OpenAi,
            ProviderArg::Mock => parley_llm::ProviderKind::Mock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from([
            "parley",
            "run",
            "latest snowboard binding",
            "--max-personas",
            "2",
            "--max-turns",
            "1",
            "--yes",
        ]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.topic, "latest snowboard binding");
                assert_eq!(args.max_personas, Some(2));
                assert_eq!(args.max_turns, Some(1));
                assert!(args.yes);
                assert!(!args.report);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "parley",
            "personas",
            "bindings",
            "--provider",
            "mock",
            "--format",
            "json",
            "--feedback",
            "focus on budget buyers",
        ]);
        assert!(matches!(cli.provider, Some(ProviderArg::Mock)));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Personas(args) => {
                assert_eq!(args.feedback.as_deref(), Some("focus on budget buyers"));
            }
            _ => panic!("Expected Personas command"),
        }
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::parse_from(["parley", "config", "init", "--force"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_provider_conversion() {
        let kind: parley_llm::ProviderKind = ProviderArg::Openai.into();
        assert_eq!(kind, parley_llm::ProviderKind::OpenAi);
    }
}
