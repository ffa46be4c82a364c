//! `interfone` binary entry point.

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    run(cli).await.map_err(miette::Report::new)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    match cli.command {
        Command::Apartments(args) => commands::apartments::handle(args, &global).await,
        Command::Residents(args) => commands::residents::handle(args, &global).await,
        Command::Apply => commands::apply::handle(&global).await,
        Command::Dashboard => commands::dashboard::handle(&global).await,
        Command::Watch(args) => commands::dashboard::watch(args, &global).await,
        Command::Status => commands::status::handle(&global).await,
        Command::Config(args) => commands::config_cmd::handle(args, &global).await,
    }
}

/// `-v` raises verbosity; `RUST_LOG` wins when set. Logs go to stderr
/// so they never mix with `--output` payloads.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
