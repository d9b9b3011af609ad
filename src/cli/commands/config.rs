//! Config Command
//!
//! Inspect funcsum configuration.
//!
//! Usage:
//!   funcsum config show [-f json]
//!   funcsum config path

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{FuncsumError, Result};

/// Show the merged effective configuration
pub fn show(format: &str, config_file: Option<&Path>) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" | "text" => false,
        other => {
            return Err(FuncsumError::Config(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    };

    let config = ConfigLoader::load(config_file)?;
    println!("{}", ConfigLoader::render(&config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    let output = Output::new();
    output.header("Configuration paths");

    for (label, path, exists) in ConfigLoader::describe_paths() {
        match path {
            Some(path) => output.path(label, &path, exists),
            None => output.field(label, "(not available)"),
        }
    }
    Ok(())
}
