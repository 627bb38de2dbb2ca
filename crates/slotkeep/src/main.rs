//! Slotkeep CLI - crash-safe save slots
//!
//! This is the main entry point for the slotkeep command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);
    output::set_quiet(cli.quiet);

    let ctx = commands::Context::new(cli.config, cli.mode.map(Into::into));
    match cli.command {
        Commands::Save(args) => commands::save::run(args, &ctx).await,
        Commands::Load(args) => commands::load::run(args, &ctx).await,
        Commands::List(args) => commands::list::run(args, &ctx).await,
        Commands::Status(args) => commands::status::run(args, &ctx).await,
        Commands::Delete(args) => commands::delete::run(args, &ctx).await,
        Commands::Backup(cmd) => commands::backup::run(cmd, &ctx).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
