mod cli;
mod commands;
mod model;
mod schedule;
mod snapshot;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let locator = snapshot::load_layout(cli.layout.as_deref())?;

    match cli.command {
        Commands::Snapshot(args) => commands::snapshot::run(args, &locator),
        Commands::Status(args) => commands::status::run(args, &locator),
        Commands::Layout(args) => commands::layout::run(args, &locator),
        Commands::Lookup(args) => commands::lookup::run(args, &locator),
        Commands::Vacancy(args) => commands::vacancy::run(args, &locator),
        Commands::Detail(args) => commands::detail::run(args, &locator),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
