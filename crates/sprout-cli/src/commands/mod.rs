//! Command implementations and dispatch logic.
//!
//! Each command is implemented as an async function that takes a
//! CommandContext holding the project directory and output handler.

use camino::Utf8PathBuf;
use sprout_core::error::{SproutError, SproutResult};
use sprout_discover::FindConfig;
use sprout_manifest::requires::SETUPTOOLS_COMPAT;
use sprout_manifest::{ProvidedTool, PyProject};
use std::path::PathBuf;
use tracing::info;

pub mod check;
pub mod init;
pub mod metadata;
pub mod packages;


use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: PathBuf,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a context for the current directory
    pub fn new() -> SproutResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            SproutError::io("Failed to get current directory".to_string(), e)
        })?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
        })
    }

    /// Create a context for an explicit project directory
    pub fn with_directory(cwd: PathBuf) -> Self {
        Self {
            cwd,
            output: OutputHandler::new(),
        }
    }

    /// UTF-8 view of the project root
    pub fn root(&self) -> SproutResult<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(self.cwd.clone()).map_err(|p| SproutError::Validation {
            field: "directory".to_string(),
            reason: format!("non UTF-8 project path: {}", p.display()),
        })
    }

    /// Path of the descriptor inside the project root
    pub fn manifest_path(&self) -> SproutResult<Utf8PathBuf> {
        Ok(self.root()?.join("pyproject.toml"))
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> SproutResult<()> {
    match command {
        Commands::Check => {
            info!("Checking descriptor");
            check::execute(ctx).await
        },
        Commands::Metadata { format } => {
            info!("Assembling metadata ({:?})", format);
            metadata::execute(format, ctx).await
        },
        Commands::Packages => {
            info!("Listing discovered packages");
            packages::execute(ctx).await
        },
        Commands::Init { name } => {
            info!("Scaffolding project: {}", name);
            init::execute(name, ctx).await
        },
    }
}

/// Build tools this frontend provides for constraint checking
pub fn provided_tools() -> SproutResult<Vec<ProvidedTool>> {
    Ok(vec![
        ProvidedTool::new("setuptools", SETUPTOOLS_COMPAT.parse()?),
        ProvidedTool::new("sprout", env!("CARGO_PKG_VERSION").parse()?),
    ])
}

/// Discovery configuration taken from a parsed descriptor
pub fn find_config(document: &PyProject) -> FindConfig {
    let find = document.find_section();
    FindConfig {
        where_dirs: find.where_dirs,
        include: find.include,
        exclude: find.exclude,
        namespaces: find.namespaces,
    }
}
