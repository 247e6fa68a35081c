//! `sprout metadata` command implementation.
//!
//! Performs the full resolution pipeline and prints the assembled record.

use super::{find_config, CommandContext};
use clap::ValueEnum;
use sprout_core::error::SproutResult;
use sprout_discover::PackageFinder;
use sprout_manifest::{document, dynamic, metadata};

/// Rendering format for the assembled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Toml,
    Json,
}

/// Execute the `sprout metadata` command
pub async fn execute(format: OutputFormat, ctx: &CommandContext) -> SproutResult<()> {
    let manifest_path = ctx.manifest_path()?;
    let document = document::load_from_file(&manifest_path).await?;

    let root = ctx.root()?;
    let values = dynamic::resolve_all(&root, &document).await?;

    // Assembly cannot tolerate an empty distribution, so discovery is strict.
    let finder = PackageFinder::new(ctx.cwd.clone(), find_config(&document));
    let packages = finder
        .find_nonempty()?
        .into_iter()
        .map(|package| package.name)
        .collect();

    let record = metadata::assemble(&document, values, packages)?;

    let rendered = match format {
        OutputFormat::Toml => metadata::render_toml(&record)?,
        OutputFormat::Json => metadata::render_json(&record)?,
    };

    println!("{}", rendered);
    Ok(())
}
