//! funcsum - Dependency-Ordered Function Summaries
//!
//! Turns a decompiled binary's call graph and per-function source into
//! natural-language summaries, where each function's prompt includes the
//! summaries of the functions it calls.
//!
//! ## Core Features
//!
//! - **Dependency Order**: callees are summarized before their callers
//! - **Chunking Ladder**: oversized functions are summarized window by window
//! - **Retrying Client**: transient service failures back off and retry
//! - **Resumable Journal**: every summary is flushed to JSONL as it completes
//!
//! ## Quick Start
//!
//! ```ignore
//! use funcsum::{CompletionClient, Orchestrator, RunOptions, SummaryJournal};
//!
//! let provider = funcsum::ai::create_provider(&config.provider_config())?;
//! let client = CompletionClient::new(provider, RetryPolicy::from(&config.retry));
//! let orchestrator = Orchestrator::new(client, config.chunking.clone(), options);
//! let mut journal = SummaryJournal::open("summaries_llama3.jsonl")?;
//! let report = orchestrator.run(&graph, &sources, &mut journal).await?;
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: call graph, ordering, reachability
//! - [`ai`]: completion provider, retrying client, prompts
//! - [`summarize`]: whole → paragraph → sentence ladder
//! - [`storage`]: JSON inputs, summary store, JSONL journal
//! - [`pipeline`]: the run loop
//! - [`report`]: HTML rendering

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod graph;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod summarize;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::{CompletionError, ErrorCategory, FuncsumError, FunctionSources, Result};

pub use ai::{CompletionClient, CompletionProvider, OllamaProvider, RetryPolicy};
pub use graph::CallGraph;
pub use pipeline::{Orchestrator, RunOptions, RunReport};
pub use storage::{SummaryJournal, SummaryStore};
pub use summarize::{ChunkingSummarizer, SummaryRequest};
