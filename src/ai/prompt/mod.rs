//! Prompt Builder System
//!
//! Plain-text prompt construction for function summarization. Sections
//! render as flat lines with fenced code and no markup headers.

/// Whole-function and final-combination instruction
pub const FUNCTION_INSTRUCTION: &str = "You are a function summarizer. Summarize the given function by describing its logic and operations. Describe what this function does in a single sentence.";

/// Per-window instruction for paragraph chunks
pub const PARAGRAPH_INSTRUCTION: &str = "Describe what this code does in a paragraph:";

/// Per-window instruction for sentence chunks
pub const SENTENCE_INSTRUCTION: &str = "Describe what this code does in a single sentence:";

/// Placeholder for a callee that has no summary
pub const MISSING_SUMMARY: &str = "[summary not available]";

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Summaries of called functions, `None` when unavailable
    CalleeSummaries(Vec<(String, Option<String>)>),
    /// Summaries of the windows preceding the current one
    PriorParts(Vec<String>),
    /// All window summaries, numbered `i/n`
    Parts(Vec<String>),
    /// Instruction line
    Instruction(String),
    /// Fenced code block
    Code(String),
}

/// Prompt builder for consistent prompt construction
///
/// Empty list sections render nothing.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callee_summaries<'a, I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        self.sections.push(PromptSection::CalleeSummaries(
            entries
                .into_iter()
                .map(|(name, summary)| (name.to_string(), summary.map(String::from)))
                .collect(),
        ));
        self
    }

    pub fn prior_parts(mut self, parts: &[String]) -> Self {
        self.sections.push(PromptSection::PriorParts(parts.to_vec()));
        self
    }

    pub fn parts(mut self, parts: &[String]) -> Self {
        self.sections.push(PromptSection::Parts(parts.to_vec()));
        self
    }

    pub fn instruction(mut self, text: &str) -> Self {
        self.sections
            .push(PromptSection::Instruction(text.to_string()));
        self
    }

    pub fn code(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Code(content.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::CalleeSummaries(entries) => {
                    if entries.is_empty() {
                        continue;
                    }
                    prompt.push_str("Given the following summaries:\n");
                    for (name, summary) in entries {
                        let summary = summary.as_deref().unwrap_or(MISSING_SUMMARY);
                        prompt.push_str(&format!("{}: {}\n", name, summary));
                    }
                }
                PromptSection::PriorParts(parts) => {
                    if parts.is_empty() {
                        continue;
                    }
                    prompt.push_str(
                        "And the following summaries of the code leading up to this snippet:\n",
                    );
                    for (i, part) in parts.iter().enumerate() {
                        prompt.push_str(&format!("Part {}: {}\n", i + 1, part));
                    }
                }
                PromptSection::Parts(parts) => {
                    if parts.is_empty() {
                        continue;
                    }
                    prompt.push_str("Given the following summaries of the code:\n");
                    let total = parts.len();
                    for (i, part) in parts.iter().enumerate() {
                        prompt.push_str(&format!("Part {}/{}: {}\n", i + 1, total, part));
                    }
                }
                PromptSection::Instruction(text) => {
                    prompt.push_str(&text);
                    prompt.push('\n');
                }
                PromptSection::Code(content) => {
                    prompt.push_str("```\n");
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n");
                }
            }
        }

        prompt
    }
}

/// Preset prompts for the summarization ladder
pub struct PromptTemplates;

impl PromptTemplates {
    /// Whole-function prompt
    pub fn whole_function<'a, I>(callees: I, source: &str) -> String
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        PromptBuilder::new()
            .callee_summaries(callees)
            .instruction(FUNCTION_INSTRUCTION)
            .code(source)
            .build()
    }

    /// Prompt for one window of a chunked attempt
    pub fn chunk<'a, I>(callees: I, prior: &[String], instruction: &str, window: &str) -> String
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        PromptBuilder::new()
            .callee_summaries(callees)
            .prior_parts(prior)
            .instruction(instruction)
            .code(window)
            .build()
    }

    /// Prompt combining every window summary into one sentence
    pub fn combine(parts: &[String]) -> String {
        PromptBuilder::new()
            .parts(parts)
            .instruction(FUNCTION_INSTRUCTION)
            .build()
    }
}
