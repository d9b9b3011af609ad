//! Summarization Pipeline
//!
//! Drives one run over a call graph:
//!
//! ```text
//! scope (whole graph | target subgraph)
//!     → topological order (+ decompilation-only functions)
//!         → skip journaled / missing source
//!             → ChunkingSummarizer → SummaryJournal::record
//! ```
//!
//! Every summary is flushed to the journal before the next function starts,
//! so an interrupted run resumes where it stopped.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::ai::CompletionClient;
use crate::config::ChunkingConfig;
use crate::graph::{CallGraph, subgraph, topological_order};
use crate::storage::SummaryJournal;
use crate::summarize::{ChunkingSummarizer, SummaryRequest};
use crate::types::{FunctionSources, Result};

/// Per-run options
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Restrict the run to this function and its dependencies
    pub function: Option<String>,
    pub model: String,
    /// Starting window size for chunked attempts
    pub max_lines: usize,
    /// Log each function's callees, source and summary at debug level
    pub trace: bool,
}

/// Result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Functions in the processing order
    pub planned: usize,
    /// Already present in the journal
    pub resumed: usize,
    /// Summarized during this run
    pub summarized: usize,
    /// Skipped for lack of decompiled source
    pub missing_source: Vec<String>,
    /// Function no window size could fit; the run stopped there
    pub stopped_at: Option<String>,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        self.stopped_at.is_none()
    }
}

pub struct Orchestrator {
    client: CompletionClient,
    chunking: ChunkingConfig,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(client: CompletionClient, chunking: ChunkingConfig, options: RunOptions) -> Self {
        Self {
            client,
            chunking,
            options,
        }
    }

    /// Processing order for this run's scope
    pub fn plan(&self, graph: &CallGraph, sources: &FunctionSources) -> Result<Vec<String>> {
        plan(graph, sources, self.options.function.as_deref())
    }

    #[instrument(skip_all, fields(model = %self.options.model, function = ?self.options.function))]
    pub async fn run(
        &self,
        graph: &CallGraph,
        sources: &FunctionSources,
        journal: &mut SummaryJournal,
    ) -> Result<RunReport> {
        let start = Instant::now();
        let order = self.plan(graph, sources)?;
        let summarizer = ChunkingSummarizer::new(&self.client, self.chunking.clone());

        let mut report = RunReport {
            planned: order.len(),
            ..Default::default()
        };

        info!(
            "Summarizing {} functions ({} already in {})",
            order.len(),
            order.iter().filter(|name| journal.contains(name)).count(),
            journal.path().display()
        );

        for (index, name) in order.iter().enumerate() {
            if journal.contains(name) {
                report.resumed += 1;
                continue;
            }

            let Some(source) = sources.get(name) else {
                warn!("No decompiled source for {}, skipping", name);
                report.missing_source.push(name.clone());
                continue;
            };

            let callees = graph.callees(name);
            info!("[{}/{}] Summarizing {}", index + 1, order.len(), name);

            let request = SummaryRequest {
                name,
                source,
                callees,
                model: &self.options.model,
                max_lines: self.options.max_lines,
            };

            match summarizer
                .summarize_function(&request, journal.store())
                .await?
            {
                Some(summary) => {
                    journal.record(name, &summary)?;
                    report.summarized += 1;

                    if self.options.trace {
                        debug!(
                            "Function: {}\nCallees: {:?}\nSource:\n{}\nSummary: {}",
                            name, callees, source, summary
                        );
                    }
                }
                None => {
                    warn!(
                        "{} is too large to summarize at any window size; stopping",
                        name
                    );
                    report.stopped_at = Some(name.clone());
                    break;
                }
            }
        }

        let stats = self.client.stats();
        info!(
            "Run finished in {:.1}s: {} summarized, {} resumed, {} without source ({} requests, {} retries)",
            start.elapsed().as_secs_f64(),
            report.summarized,
            report.resumed,
            report.missing_source.len(),
            stats.requests,
            stats.retries
        );

        Ok(report)
    }
}

/// Processing order: dependencies first
///
/// A whole-graph run also includes functions that appear only in the
/// decompilations, sorted by name, after the graph order.
pub fn plan(
    graph: &CallGraph,
    sources: &FunctionSources,
    function: Option<&str>,
) -> Result<Vec<String>> {
    match function {
        Some(root) => topological_order(&subgraph(graph, root)),
        None => {
            let mut order = topological_order(graph)?;
            let known = graph.all_names();
            let mut extra: Vec<&String> = sources
                .keys()
                .filter(|name| !known.contains(name.as_str()))
                .collect();
            extra.sort();
            order.extend(extra.into_iter().cloned());
            Ok(order)
        }
    }
}
