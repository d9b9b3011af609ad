//! Graph Commands
//!
//! Inspect a program's call graph without contacting the completion service.
//!
//! Usage:
//!   funcsum order <PROGDIR> [-f FUNCTION] [-g FILE]
//!   funcsum tree <PROGDIR> <FUNCTION> [-g FILE]

use std::path::{Path, PathBuf};

use crate::cli::{call_graph_path, decompilations_path};
use crate::config::ConfigLoader;
use crate::graph::render_call_tree;
use crate::pipeline::plan;
use crate::storage::{load_call_graph, load_sources};
use crate::types::{FunctionSources, Result};

/// Print the processing order, one name per line
///
/// Whole-graph orders include decompilation-only functions when the
/// decompilations file is present.
pub fn order(
    program_dir: &Path,
    function: Option<&str>,
    call_graph: Option<PathBuf>,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = ConfigLoader::load(config_file)?;
    let graph = load_call_graph(&call_graph_path(program_dir, call_graph, &config))?;

    let sources_path = decompilations_path(program_dir, None, &config);
    let sources = if function.is_none() && sources_path.exists() {
        load_sources(&sources_path)?
    } else {
        FunctionSources::new()
    };

    for name in plan(&graph, &sources, function)? {
        println!("{}", name);
    }
    Ok(())
}

/// Print the indented call tree below `function`
pub fn tree(
    program_dir: &Path,
    function: &str,
    call_graph: Option<PathBuf>,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = ConfigLoader::load(config_file)?;
    let graph = load_call_graph(&call_graph_path(program_dir, call_graph, &config))?;

    print!("{}", render_call_tree(&graph, function));
    Ok(())
}
