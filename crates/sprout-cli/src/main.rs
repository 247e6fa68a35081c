//! # sprout-cli
//!
//! Package descriptor toolchain for setuptools-dialect pyproject.toml files.
//!
//! This is the main entry point for the sprout CLI. It handles command
//! parsing, sets up logging, and dispatches to the command handlers.

use clap::{Parser, Subcommand};
use sprout_core::error::SproutResult;
use std::path::PathBuf;
use tracing::info;

mod commands;
mod output;

use commands::metadata::OutputFormat;
use commands::CommandContext;
use output::OutputHandler;

/// Read, validate, and materialize package descriptors
#[derive(Parser)]
#[command(name = "sprout", version, about = "Package descriptor toolchain")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory to operate on (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the descriptor and everything it references
    Check,
    /// Resolve and print the assembled metadata record
    Metadata {
        /// Output format for the record
        #[arg(long, value_enum, default_value = "toml")]
        format: OutputFormat,
    },
    /// List the packages discovery selects
    Packages,
    /// Scaffold a descriptor and source layout for a new project
    Init { name: String },
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    info!("Starting sprout v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_cli(cli) {
        let output = OutputHandler::new();
        output.error(&e.to_string());
        if let Some(hint) = e.suggestion() {
            output.info(hint);
        }
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> SproutResult<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        sprout_core::error::SproutError::io("Failed to create async runtime".to_string(), e)
    })?;

    rt.block_on(async {
        let ctx = match cli.directory {
            Some(directory) => CommandContext::with_directory(directory),
            None => CommandContext::new()?,
        };

        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "sprout={},sprout_core={},sprout_manifest={},sprout_discover={}",
            level, level, level, level
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
