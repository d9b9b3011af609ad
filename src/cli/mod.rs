pub mod commands;
pub mod ui;

use std::path::{Path, PathBuf};

use crate::config::Config;

/// Input file inside the program directory unless overridden
pub fn input_path(program_dir: &Path, explicit: Option<PathBuf>, default_name: &str) -> PathBuf {
    explicit.unwrap_or_else(|| program_dir.join(default_name))
}

/// Call graph path for a command, honoring `-g` and the `inputs` config section
pub fn call_graph_path(program_dir: &Path, explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    input_path(program_dir, explicit, &config.inputs.call_graph_file)
}

/// Decompilations path for a command, honoring `-d` and the `inputs` config section
pub fn decompilations_path(
    program_dir: &Path,
    explicit: Option<PathBuf>,
    config: &Config,
) -> PathBuf {
    input_path(program_dir, explicit, &config.inputs.decompilations_file)
}
