//! `sprout init` command implementation.
//!
//! Scaffolds a descriptor plus the source layout it declares: a src root
//! with one package, a readme, and a requirements file.

use super::CommandContext;
use sprout_core::error::{SproutError, SproutResult};
use sprout_core::types::is_valid_name;
use std::fs;
use std::path::Path;

/// Execute the `sprout init` command
pub async fn execute(name: String, ctx: &CommandContext) -> SproutResult<()> {
    if !is_valid_name(&name) {
        return Err(SproutError::Validation {
            field: "name".to_string(),
            reason: format!(
                "invalid project name '{}': names use letters, digits, '-', '_', '.' and start and end alphanumeric",
                name
            ),
        });
    }

    let manifest_path = ctx.cwd.join("pyproject.toml");
    if manifest_path.exists() {
        ctx.output
            .info("pyproject.toml already exists, skipping initialization");
        return Ok(());
    }

    ctx.output.step("🌱", &format!("Initializing {} project", name));

    let module = module_name(&name);

    write_file(&manifest_path, &descriptor_content(&name, &module))?;

    let package_dir = ctx.cwd.join("src").join(&module);
    fs::create_dir_all(&package_dir).map_err(|e| {
        SproutError::io(
            format!("Failed to create package directory: {}", package_dir.display()),
            e,
        )
    })?;

    let init_path = package_dir.join("__init__.py");
    if !init_path.exists() {
        write_file(&init_path, &format!("\"\"\"{} package.\"\"\"\n", name))?;
    }

    let readme_path = ctx.cwd.join("README.md");
    if !readme_path.exists() {
        write_file(&readme_path, &format!("# {}\n", name))?;
    }

    let requirements_path = ctx.cwd.join("requirements.txt");
    if !requirements_path.exists() {
        write_file(
            &requirements_path,
            "# Runtime dependencies, one requirement per line.\n",
        )?;
    }

    ctx.output.success(&format!("Initialized {} project", name));
    ctx.output.info("");
    ctx.output.info("Next steps:");
    ctx.output.info("  sprout check");
    ctx.output.info("  sprout metadata");

    Ok(())
}

/// Importable module name derived from the project name
fn module_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['-', '.'], "_")
}

fn descriptor_content(name: &str, module: &str) -> String {
    format!(
        r#"[build-system]
requires = ["setuptools>=61.0"]
build-backend = "setuptools.build_meta"

[project]
name = "{}"
dynamic = ["readme", "dependencies"]
version = "0.1.0"
requires-python = ">=3.10"

[tool.setuptools]
package-dir = {{ "" = "src" }}
include-package-data = true

[tool.setuptools.dynamic]
readme = {{ file = "README.md" }}
dependencies = {{ file = "requirements.txt" }}

[tool.setuptools.packages.find]
where = ["src"]
include = ["{}*"]
namespaces = false
"#,
        name, module
    )
}

fn write_file(path: &Path, content: &str) -> SproutResult<()> {
    fs::write(path, content)
        .map_err(|e| SproutError::io(format!("Failed to create {}", path.display()), e))
}
