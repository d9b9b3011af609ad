//! Chunking Summarizer
//!
//! Produces one summary for one function, degrading gracefully when the
//! source does not fit the model:
//!
//! 1. **Whole**: the full source in a single prompt
//! 2. **Paragraph chunks**: fixed line windows summarized in paragraphs,
//!    then combined; any rejection retries with a smaller window
//! 3. **Sentence chunks**: the same with one-sentence window summaries
//! 4. **Give up**: no summary
//!
//! Only "too large" rejections move down the ladder. Fatal completion
//! errors propagate unchanged.

use tracing::debug;

use crate::ai::CompletionClient;
use crate::ai::prompt::{PARAGRAPH_INSTRUCTION, PromptTemplates, SENTENCE_INSTRUCTION};
use crate::config::ChunkingConfig;
use crate::storage::SummaryStore;
use crate::types::{CompletionError, Result};

/// Outcome of one rung of the ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Summarized(String),
    NeedsSmallerChunks,
}

/// How each window is summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStyle {
    Paragraph,
    Sentence,
}

impl ChunkStyle {
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Paragraph => PARAGRAPH_INSTRUCTION,
            Self::Sentence => SENTENCE_INSTRUCTION,
        }
    }

    pub fn max_tokens(self, config: &ChunkingConfig) -> u32 {
        match self {
            Self::Paragraph => config.paragraph_max_tokens,
            Self::Sentence => config.sentence_max_tokens,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraphs",
            Self::Sentence => "sentences",
        }
    }
}

/// One function to summarize
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub name: &'a str,
    pub source: &'a str,
    /// Callees in call-graph order
    pub callees: &'a [String],
    pub model: &'a str,
    /// Starting window size for chunked attempts
    pub max_lines: usize,
}

/// Window sizes tried by one chunked stage
///
/// Starts at `start` and shrinks by `decrement` while staying at or above
/// `floor` (and never below one line). Sizes are strictly decreasing, so the
/// sequence always ends.
pub fn window_sizes(start: usize, decrement: usize, floor: usize) -> impl Iterator<Item = usize> {
    let floor = floor.max(1);
    std::iter::successors(Some(start).filter(|s| *s >= floor), move |&size| {
        size.checked_sub(decrement)
            .filter(|next| *next >= floor && *next < size)
    })
}

/// Strip leading/trailing newlines and split into lines
fn source_lines(source: &str) -> Vec<&str> {
    source.trim_matches(|c| c == '\n' || c == '\r').lines().collect()
}

pub struct ChunkingSummarizer<'a> {
    client: &'a CompletionClient,
    config: ChunkingConfig,
}

impl<'a> ChunkingSummarizer<'a> {
    pub fn new(client: &'a CompletionClient, config: ChunkingConfig) -> Self {
        Self { client, config }
    }

    /// Summarize one function, or `None` when every rung was too large
    pub async fn summarize_function(
        &self,
        request: &SummaryRequest<'_>,
        store: &SummaryStore,
    ) -> Result<Option<String>> {
        let lines = source_lines(request.source);
        let callees: Vec<(&str, Option<&str>)> = request
            .callees
            .iter()
            .map(|callee| (callee.as_str(), store.get(callee)))
            .collect();

        if let Attempt::Summarized(summary) = self.whole(request, &callees, &lines).await? {
            return Ok(Some(summary));
        }

        for style in [ChunkStyle::Paragraph, ChunkStyle::Sentence] {
            for size in window_sizes(
                request.max_lines,
                self.config.line_decrement,
                self.config.min_lines,
            ) {
                debug!(
                    "Trying to summarize {} in chunks of {} lines with {}",
                    request.name,
                    size,
                    style.name()
                );
                if let Attempt::Summarized(summary) = self
                    .chunked(request, &callees, &lines, size, style)
                    .await?
                {
                    return Ok(Some(summary));
                }
            }
        }

        debug!("No window size fits the model for {}", request.name);
        Ok(None)
    }

    async fn whole(
        &self,
        request: &SummaryRequest<'_>,
        callees: &[(&str, Option<&str>)],
        lines: &[&str],
    ) -> Result<Attempt> {
        let prompt = PromptTemplates::whole_function(callees.iter().copied(), &lines.join("\n"));
        self.attempt(&prompt, request.model, self.config.sentence_max_tokens)
            .await
    }

    async fn chunked(
        &self,
        request: &SummaryRequest<'_>,
        callees: &[(&str, Option<&str>)],
        lines: &[&str],
        size: usize,
        style: ChunkStyle,
    ) -> Result<Attempt> {
        let max_tokens = style.max_tokens(&self.config);
        let mut parts: Vec<String> = Vec::new();

        for window in lines.chunks(size) {
            let prompt = PromptTemplates::chunk(
                callees.iter().copied(),
                &parts,
                style.instruction(),
                &window.join("\n"),
            );
            match self.attempt(&prompt, request.model, max_tokens).await? {
                Attempt::Summarized(text) => parts.push(text),
                Attempt::NeedsSmallerChunks => return Ok(Attempt::NeedsSmallerChunks),
            }
        }

        let prompt = PromptTemplates::combine(&parts);
        self.attempt(&prompt, request.model, self.config.sentence_max_tokens)
            .await
    }

    async fn attempt(&self, prompt: &str, model: &str, max_tokens: u32) -> Result<Attempt> {
        match self.client.complete(prompt, model, max_tokens).await {
            Ok(text) => Ok(Attempt::Summarized(text)),
            Err(CompletionError::PromptTooLarge { .. }) => Ok(Attempt::NeedsSmallerChunks),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RetryPolicy;
    use crate::ai::provider::scripted::{RecordingSleeper, ScriptedProvider};
    use crate::types::{ErrorCategory, FuncsumError};
    use proptest::prelude::*;
    use std::sync::Arc;

    const COMBINE_HEADER: &str = "Given the following summaries of the code:";

    fn client(provider: Arc<ScriptedProvider>) -> CompletionClient {
        CompletionClient::new(
            provider,
            RetryPolicy {
                jitter: false,
                ..Default::default()
            },
        )
        .with_sleeper(Arc::new(RecordingSleeper::default()))
    }

    fn numbered_source(lines: usize) -> String {
        (1..=lines)
            .map(|i| format!("line{};", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of source lines inside the prompt's code fence
    fn fenced_lines(prompt: &str) -> usize {
        prompt
            .split("```\n")
            .nth(1)
            .map(|code| code.lines().count())
            .unwrap_or(0)
    }

    fn request<'a>(source: &'a str, callees: &'a [String]) -> SummaryRequest<'a> {
        SummaryRequest {
            name: "target",
            source,
            callees,
            model: "test-model",
            max_lines: 100,
        }
    }

    #[tokio::test]
    async fn test_whole_function_first() {
        let provider = Arc::new(ScriptedProvider::new().with_reply(|_| "Adds.".to_string()));
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let mut store = SummaryStore::new();
        store.insert("helper", "Helps.");
        let callees = vec!["helper".to_string(), "puts".to_string()];
        let source = "\n\nint target() {\n  return helper();\n}\n\n";

        let summary = summarizer
            .summarize_function(&request(source, &callees), &store)
            .await
            .unwrap();
        assert_eq!(summary.as_deref(), Some("Adds."));

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("helper: Helps.\n"));
        assert!(prompts[0].contains("puts: [summary not available]\n"));
        assert!(prompts[0].contains("```\nint target() {\n  return helper();\n}\n```"));
        assert_eq!(provider.seen()[0].max_tokens, 256);
    }

    #[tokio::test]
    async fn test_paragraph_chunks_after_whole_rejected() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .too_large_when(|prompt| fenced_lines(prompt) > 12)
                .with_reply(|prompt| {
                    if prompt.starts_with(COMBINE_HEADER) {
                        "Combined.".to_string()
                    } else {
                        format!("covers {} lines", fenced_lines(prompt))
                    }
                }),
        );
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let source = numbered_source(25);
        let summary = summarizer
            .summarize_function(&request(&source, &[]), &SummaryStore::new())
            .await
            .unwrap();
        assert_eq!(summary.as_deref(), Some("Combined."));

        // whole + windows 100..=20 (one rejected request each) + 3 chunks + combine
        let seen = provider.seen();
        assert_eq!(seen.len(), 1 + 9 + 3 + 1);

        let chunk_prompts: Vec<&str> = seen[10..13].iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(
            chunk_prompts.iter().map(|p| fenced_lines(p)).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
        assert!(chunk_prompts.iter().all(|p| p.contains(PARAGRAPH_INSTRUCTION)));
        assert!(!chunk_prompts[0].contains("leading up to this snippet"));
        assert!(chunk_prompts[2].contains("Part 1: covers 10 lines\nPart 2: covers 10 lines\n"));
        assert!(seen[10..13].iter().all(|r| r.max_tokens == 512));

        let combine = &seen[13];
        assert!(combine.prompt.contains("Part 3/3: covers 5 lines"));
        assert_eq!(combine.max_tokens, 256);
    }

    #[tokio::test]
    async fn test_rejected_combine_prompt_shrinks_window() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .too_large_when(|prompt| fenced_lines(prompt) > 20 || prompt.contains("Part 1/2"))
                .with_reply(|_| "Part summary.".to_string()),
        );
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let source = numbered_source(30);
        let summary = summarizer
            .summarize_function(&request(&source, &[]), &SummaryStore::new())
            .await
            .unwrap();
        assert!(summary.is_some());

        // whole + windows 100..=30 + (2 chunks + rejected combine) + (3 chunks + combine)
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1 + 8 + 3 + 4);
        assert!(prompts[11].contains("Part 2/2"));
        assert!(prompts[15].contains("Part 3/3"));
    }

    #[tokio::test]
    async fn test_sentence_stage_after_paragraphs_exhausted() {
        let provider = Arc::new(ScriptedProvider::new().too_large_when(|prompt| {
            prompt.contains(PARAGRAPH_INSTRUCTION) || fenced_lines(prompt) > 30
        }));
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let source = numbered_source(40);
        let summary = summarizer
            .summarize_function(&request(&source, &[]), &SummaryStore::new())
            .await
            .unwrap();
        assert!(summary.is_some());

        let seen = provider.seen();
        // whole + 10 paragraph sizes + sentence sizes 100..=40 rejected + 30: 2 chunks + combine
        assert_eq!(seen.len(), 1 + 10 + 7 + 3);
        assert!(seen[18].prompt.contains(SENTENCE_INSTRUCTION));
        assert_eq!(seen[18].max_tokens, 256);
    }

    #[tokio::test]
    async fn test_gives_up_when_nothing_fits() {
        let provider = Arc::new(ScriptedProvider::new().too_large_above(0));
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let source = numbered_source(30);
        let summary = summarizer
            .summarize_function(&request(&source, &[]), &SummaryStore::new())
            .await
            .unwrap();
        assert_eq!(summary, None);

        let seen = provider.seen();
        assert_eq!(seen.len(), 1 + 10 + 10);
        assert!(seen[1..11].iter().all(|r| r.max_tokens == 512));
        assert!(seen[11..].iter().all(|r| r.max_tokens == 256));

        let sizes: Vec<usize> = seen[1..11].iter().map(|r| fenced_lines(&r.prompt)).collect();
        assert_eq!(sizes, vec![30, 30, 30, 30, 30, 30, 30, 30, 20, 10]);
    }

    #[tokio::test]
    async fn test_fatal_error_propagates() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .too_large_above(0)
                .then_fail(ErrorCategory::TokenLimit, "too long")
                .then_fail(ErrorCategory::Auth, "unauthorized"),
        );
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let source = numbered_source(5);
        let err = summarizer
            .summarize_function(&request(&source, &[]), &SummaryStore::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FuncsumError::Llm(ref e) if e.category == ErrorCategory::Auth));
        assert_eq!(provider.request_count(), 2);
    }

    #[tokio::test]
    async fn test_start_below_floor_skips_chunking() {
        let provider = Arc::new(ScriptedProvider::new().too_large_above(0));
        let client = client(provider.clone());
        let summarizer = ChunkingSummarizer::new(&client, ChunkingConfig::default());

        let source = numbered_source(5);
        let req = SummaryRequest {
            max_lines: 5,
            ..request(&source, &[])
        };
        let summary = summarizer
            .summarize_function(&req, &SummaryStore::new())
            .await
            .unwrap();
        assert_eq!(summary, None);
        assert_eq!(provider.request_count(), 1);
    }

    #[test]
    fn test_window_sizes_defaults() {
        let sizes: Vec<usize> = window_sizes(100, 10, 10).collect();
        assert_eq!(sizes, vec![100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
    }

    #[test]
    fn test_window_sizes_edge_cases() {
        assert_eq!(window_sizes(5, 10, 10).count(), 0);
        assert_eq!(window_sizes(15, 10, 10).collect::<Vec<_>>(), vec![15]);
        assert_eq!(window_sizes(50, 0, 10).collect::<Vec<_>>(), vec![50]);
    }

    #[test]
    fn test_source_lines_strips_outer_newlines() {
        assert_eq!(source_lines("\n\na\n\nb\n\n"), vec!["a", "", "b"]);
        assert!(source_lines("\n\n").is_empty());
    }

    proptest! {
        #[test]
        fn prop_window_sizes_shrink_to_floor(
            start in 0usize..500,
            decrement in 0usize..60,
            floor in 0usize..60,
        ) {
            let sizes: Vec<usize> = window_sizes(start, decrement, floor).collect();

            prop_assert!(sizes.len() <= start + 1);
            prop_assert!(sizes.iter().all(|s| *s >= floor.max(1) && *s <= start));
            prop_assert!(sizes.windows(2).all(|w| w[1] < w[0]));
            if start >= floor.max(1) {
                prop_assert_eq!(sizes.first().copied(), Some(start));
            }
        }
    }
}
