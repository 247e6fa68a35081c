//! `sprout check` command implementation.
//!
//! Runs every descriptor operation short of assembly: parse + validate,
//! build-requirement resolution, dynamic-field resolution, and package
//! discovery. An empty discovery result is downgraded to a warning here.

use super::{find_config, provided_tools, CommandContext};
use sprout_core::error::SproutResult;
use sprout_discover::PackageFinder;
use sprout_manifest::{document, dynamic, requires};

/// Execute the `sprout check` command
pub async fn execute(ctx: &CommandContext) -> SproutResult<()> {
    let manifest_path = ctx.manifest_path()?;
    let document = document::load_from_file(&manifest_path).await?;
    ctx.output.success(&format!(
        "{} parses and validates",
        manifest_path.file_name().unwrap_or("pyproject.toml")
    ));

    requires::check_build_requires(&document.build_system, &provided_tools()?)?;
    ctx.output.success("build requirements satisfied");

    let root = ctx.root()?;
    let values = dynamic::resolve_all(&root, &document).await?;
    if let Some(readme) = &values.readme {
        ctx.output.success(&format!(
            "readme resolved from {} ({})",
            readme.path, readme.content_type
        ));
    }
    if let Some(dependencies) = &values.dependencies {
        ctx.output.success(&format!(
            "{} dependencies resolved",
            dependencies.len()
        ));
    }

    let finder = PackageFinder::new(ctx.cwd.clone(), find_config(&document));
    let packages = finder.find()?;
    if packages.is_empty() {
        ctx.output
            .warn("package discovery matched no packages; the distribution would be empty");
    } else {
        ctx.output.success(&format!(
            "discovered {} package(s): {}",
            packages.len(),
            packages
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    ctx.output.success(&format!("{} is buildable", document.project.name));
    Ok(())
}
