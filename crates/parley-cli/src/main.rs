//! Parley CLI - synthetic customer interviews from the command line.

use clap::Parser;
use parley_cli::cli::{ConfigAction, ConfigArgs};
use parley_cli::commands;
use parley_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parley=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> parley_cli::Result<()> {
    let cli = Cli::parse();
    let path = Config::resolve_path(cli.config.as_deref())?;

    // `config init` must be able to replace an unreadable file
    let mut config = match Config::load_from(&path) {
        Ok(config) => config,
        Err(_) if matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { .. }
            })
        ) =>
        {
            Config::default()
        }
        Err(e) => return Err(e),
    };

    if let Some(provider) = cli.provider {
        config.llm.provider = provider.into();
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await?,
        Command::Personas(args) => commands::execute_personas(args, &config, &formatter).await?,
        Command::Config(args) => commands::execute_config(args, &config, &path, &formatter)?,
    }

    Ok(())
}
