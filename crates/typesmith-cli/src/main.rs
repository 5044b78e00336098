//! typesmith CLI tool.
//!
//! Usage:
//! ```bash
//! typesmith check [OPTIONS] [PATHS]...
//! typesmith list-rules
//! typesmith init [--force]
//! ```
//!
//! Exit codes: `0` when no warning remains, `1` when at least one warning
//! remains, `2` on parse errors, engine failures or usage errors.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Lints TypeScript for type-system anti-patterns and rewrites them
#[derive(Parser)]
#[command(name = "typesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TYPESMITH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze files and optionally apply fixes
    Check(commands::check::CheckArgs),

    /// List available rules
    ListRules,

    /// Write a starter typesmith.toml
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Rendered diagnostics with source excerpts.
    #[default]
    Text,
    /// The full batch report as JSON.
    Json,
    /// One line per diagnostic.
    Compact,
}

/// Process exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Nothing left to fix.
    Clean,
    /// At least one warning remains.
    Warnings,
    /// A file failed to parse or a rule crashed.
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Clean => ExitCode::SUCCESS,
            Status::Warnings => ExitCode::from(1),
            Status::Failure => ExitCode::from(2),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(&args, cli.config.as_deref()),
        Commands::ListRules => commands::list_rules::run().map(|()| Status::Clean),
        Commands::Init { force } => commands::init::run(force).map(|()| Status::Clean),
    };

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            Status::Failure.into()
        }
    }
}
