//! Report Command
//!
//! Render an existing summaries file as HTML.
//!
//! Usage:
//!   funcsum report <PROGDIR> -s SUMMARIES [-d FILE] [-o DIR]

use std::path::{Path, PathBuf};

use crate::cli::decompilations_path;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::report::write_html;
use crate::storage::{SummaryJournal, load_sources};
use crate::types::{FuncsumError, Result};

pub fn run(
    program_dir: &Path,
    summaries: &Path,
    decompilations: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    config_file: Option<&Path>,
) -> Result<()> {
    if !summaries.exists() {
        return Err(FuncsumError::input(summaries, "summaries file not found"));
    }

    let config = ConfigLoader::load(config_file)?;
    let sources = load_sources(&decompilations_path(program_dir, decompilations, &config))?;
    let journal = SummaryJournal::open(summaries)?;

    let output_dir = output_dir.unwrap_or_else(|| program_dir.to_path_buf());
    let path = write_html(journal.store(), &sources, &output_dir)?;

    Output::new().success(&format!(
        "Rendered {} summaries to {}",
        journal.store().len(),
        path.display()
    ));
    Ok(())
}
