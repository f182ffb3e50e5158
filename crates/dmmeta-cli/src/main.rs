use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dmmeta_api::{DmmClient, DmmError, MovieProvider};
use dmmeta_core::{AppConfig, CoreError};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dmmeta", version, about = "Look up DMM catalog metadata")]
struct Cli {
    /// Config file to use instead of the user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log provider internals (candidate probing, preview hops).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a content id by probing every catalog section.
    Id { id: String },
    /// Scrape a single detail page.
    Link { url: String },
    /// Search the catalog listing.
    Search { keyword: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Provider(#[from] DmmError),

    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "dmmeta=debug" } else { "dmmeta=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let client = DmmClient::new(&config)?;

    match cli.command {
        Command::Id { id } => print_json(&client.get_movie_info_by_id(&id).await?),
        Command::Link { url } => print_json(&client.get_movie_info_by_link(&url).await?),
        Command::Search { keyword } => print_json(&client.search_movie(&keyword).await?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Lookup failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands_with_global_flags() {
        let cli = Cli::parse_from(["dmmeta", "id", "abc00123", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Id { ref id } if id == "abc00123"));

        let cli = Cli::parse_from(["dmmeta", "--config", "x.toml", "search", "abc"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Search { .. }));
    }
}
