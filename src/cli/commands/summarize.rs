//! Summarize Command
//!
//! Summarize every function of a program directory in dependency order,
//! resuming from an existing summaries file.
//!
//! Usage:
//!   funcsum summarize <PROGDIR> -m MODEL [-f FUNCTION] [-o FILE] [-l LINES]

use std::path::{Path, PathBuf};

use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::ai::{CompletionClient, RetryPolicy, create_provider};
use crate::cli::ui::Output;
use crate::cli::{call_graph_path, decompilations_path};
use crate::config::{Config, ConfigLoader};
use crate::pipeline::{Orchestrator, RunOptions, RunReport};
use crate::report;
use crate::storage::{SummaryJournal, load_call_graph, load_sources};
use crate::types::{FuncsumError, Result};

/// Summarize run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct SummarizeOptions {
    pub program_dir: PathBuf,
    /// Model override; falls back to `llm.model`
    pub model: Option<String>,
    /// Only this function and its dependencies
    pub function: Option<String>,
    pub call_graph: Option<PathBuf>,
    pub decompilations: Option<PathBuf>,
    /// Summaries file; defaults inside the program directory
    pub output: Option<PathBuf>,
    pub max_lines: Option<usize>,
    pub endpoint: Option<String>,
    /// Retries after the first attempt
    pub max_retries: Option<u32>,
    pub no_report: bool,
    pub log_prompts: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

/// `summaries_<model>.jsonl` or `summaries_<function>_<model>.jsonl`
pub fn default_output_path(program_dir: &Path, model: &str, function: Option<&str>) -> PathBuf {
    let model = model.replace('/', "_");
    let file_name = match function {
        Some(function) => format!("summaries_{}_{}.jsonl", function, model),
        None => format!("summaries_{}.jsonl", model),
    };
    program_dir.join(file_name)
}

/// Fold command-line overrides into the loaded configuration
fn apply_overrides(config: &mut Config, options: &SummarizeOptions) -> Result<()> {
    if let Some(endpoint) = &options.endpoint {
        config.llm.endpoint = endpoint.clone();
    }
    if let Some(model) = &options.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(max_lines) = options.max_lines {
        config.chunking.max_lines = max_lines;
    }
    if let Some(retries) = options.max_retries {
        config.retry.max_attempts = Some(retries.saturating_add(1));
    }
    config.validate()
}

pub fn run(options: SummarizeOptions) -> Result<()> {
    let output = Output::quiet(options.quiet);
    let mut config = ConfigLoader::load(options.config.as_deref())?;
    apply_overrides(&mut config, &options)?;

    let model = config.llm.model.clone().ok_or_else(|| {
        FuncsumError::Config("No model specified. Use --model or set llm.model".to_string())
    })?;

    let program_dir = options.program_dir.as_path();
    let graph_path = call_graph_path(program_dir, options.call_graph.clone(), &config);
    let sources_path = decompilations_path(program_dir, options.decompilations.clone(), &config);
    let summaries_path = options.output.clone().unwrap_or_else(|| {
        default_output_path(program_dir, &model, options.function.as_deref())
    });

    let graph = load_call_graph(&graph_path)?;
    let sources = load_sources(&sources_path)?;
    info!(
        "Loaded {} call graph entries and {} decompiled functions",
        graph.len(),
        sources.len()
    );

    let provider = create_provider(&config.provider_config())?;
    let client = CompletionClient::new(provider.clone(), RetryPolicy::from(&config.retry))
        .with_max_prompt_chars(config.llm.max_prompt_chars)
        .with_log_prompts(options.log_prompts);

    let orchestrator = Orchestrator::new(
        client,
        config.chunking.clone(),
        RunOptions {
            function: options.function.clone(),
            model: model.clone(),
            max_lines: config.chunking.max_lines,
            trace: options.verbose,
        },
    );

    let mut journal = SummaryJournal::open(&summaries_path)?;

    let rt = Runtime::new()?;
    match rt.block_on(provider.health_check(&model)) {
        Ok(true) => {}
        Ok(false) => warn!("Completion service not ready; requests will be retried"),
        Err(e) => warn!("Health check failed: {}", e),
    }

    let result = rt.block_on(orchestrator.run(&graph, &sources, &mut journal))?;

    print_report(&output, &result, &summaries_path);

    if config.output.html_report && !options.no_report {
        let report_dir = summaries_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        match report::write_html(journal.store(), &sources, &report_dir) {
            Ok(path) => output.success(&format!("Report written to {}", path.display())),
            Err(e) => output.warning(&format!("Could not write HTML report: {}", e)),
        }
    }

    Ok(())
}

fn print_report(output: &Output, result: &RunReport, summaries_path: &Path) {
    match &result.stopped_at {
        None => output.header("Summarization complete"),
        Some(_) => output.header("Summarization stopped"),
    }
    output.field("Planned", result.planned);
    output.field("Summarized", result.summarized);
    output.field("Resumed", result.resumed);
    output.field("Missing source", result.missing_source.len());
    output.field("Summaries", summaries_path.display());

    if let Some(name) = &result.stopped_at {
        output.warning(&format!(
            "{} could not be summarized at any window size; later functions were not processed",
            name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let dir = Path::new("/tmp/prog");
        assert_eq!(
            default_output_path(dir, "llama3:8b", None),
            PathBuf::from("/tmp/prog/summaries_llama3:8b.jsonl")
        );
        assert_eq!(
            default_output_path(dir, "library/mistral", Some("png_read_info")),
            PathBuf::from("/tmp/prog/summaries_png_read_info_library_mistral.jsonl")
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        let options = SummarizeOptions {
            model: Some("m".to_string()),
            max_lines: Some(40),
            max_retries: Some(3),
            endpoint: Some("http://127.0.0.1:8080".to_string()),
            ..Default::default()
        };

        apply_overrides(&mut config, &options).unwrap();

        assert_eq!(config.llm.model.as_deref(), Some("m"));
        assert_eq!(config.chunking.max_lines, 40);
        assert_eq!(config.retry.max_attempts, Some(4));
        assert_eq!(config.llm.endpoint, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut config = Config::default();
        let options = SummarizeOptions {
            max_lines: Some(5),
            ..Default::default()
        };
        assert!(apply_overrides(&mut config, &options).is_err());
    }

    #[test]
    fn test_missing_inputs_fail_before_any_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = SummarizeOptions {
            program_dir: dir.path().to_path_buf(),
            model: Some("m".to_string()),
            config: None,
            quiet: true,
            ..Default::default()
        };

        let result = run(options);
        assert!(matches!(result, Err(FuncsumError::Input { .. })));
    }
}
