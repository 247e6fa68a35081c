//! `sprout packages` command implementation.

use super::{find_config, CommandContext};
use sprout_core::error::SproutResult;
use sprout_discover::PackageFinder;
use sprout_manifest::document;

/// Execute the `sprout packages` command
pub async fn execute(ctx: &CommandContext) -> SproutResult<()> {
    let manifest_path = ctx.manifest_path()?;
    let document = document::load_from_file(&manifest_path).await?;

    let finder = PackageFinder::new(ctx.cwd.clone(), find_config(&document));
    let packages = finder.find()?;

    if packages.is_empty() {
        ctx.output.warn("no packages matched");
        return Ok(());
    }

    for package in packages {
        println!("{}", package.name);
    }

    Ok(())
}
