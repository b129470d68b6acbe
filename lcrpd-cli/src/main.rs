//! lcrpd — harvest Lustre changelogs by running `lcrp_changelog` each cycle.
//!
//! # Usage
//!
//! ```text
//! lcrpd run [--config <path>] [--log-dir <dir>] [--once] [--interval <secs>] [--log-json]
//! lcrpd check [--config <path>] [--json]
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "lcrpd",
    version,
    about = "Lustre changelog reader daemon",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the daemon loop, or a single cycle with `--once`.
    Run(RunArgs),

    /// Load and validate the config and print the command a cycle would run.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Check(args) => args.run().map(|()| ExitCode::SUCCESS),
    }
}
