// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rvz - local harness for the rendezvous barrier

mod commands;
mod completions;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, run};

#[derive(Parser)]
#[command(
    name = "rvz",
    version,
    about = "Rendezvous - run barrier rounds against an in-process store"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one barrier round with simulated members
    Run(run::RunArgs),
    /// Validate and print the effective barrier configuration
    Config(config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Config(args) => config::config(args),
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays parseable
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
