//! Config Command
//!
//! Inspect and manage the layered configuration.

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged configuration
pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

/// Show configuration file paths and whether each exists
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Open a configuration file in $EDITOR
pub fn edit(global: bool) -> Result<()> {
    ConfigLoader::edit_config(global)
}

/// Write a default global configuration file
pub fn init_global(force: bool) -> Result<()> {
    let out = Output::new();
    let path = ConfigLoader::init_global(force)?;
    out.success(&format!("Created global config: {}", path.display()));
    Ok(())
}

/// Write a default project configuration file
pub fn init_project(endpoint: Option<&str>) -> Result<()> {
    let out = Output::new();
    let path = ConfigLoader::init_project(endpoint)?;
    out.success(&format!("Created project config: {}", path.display()));
    Ok(())
}
