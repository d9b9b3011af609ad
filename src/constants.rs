//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Chunked summarization constants
pub mod chunking {
    /// Starting window size (lines) for chunked attempts
    pub const DEFAULT_MAX_LINES: usize = 100;

    /// Lines removed from the window after a "too large" rejection
    pub const LINE_DECREMENT: usize = 10;

    /// Smallest window ever issued
    pub const MIN_LINES: usize = 10;

    /// Completion budget for per-chunk paragraph summaries
    pub const PARAGRAPH_MAX_TOKENS: u32 = 512;

    /// Completion budget for one-sentence summaries
    pub const SENTENCE_MAX_TOKENS: u32 = 256;
}

/// Completion retry constants
pub mod retry {
    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 60;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Network constants
pub mod network {
    /// Local completion service
    pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// Input and output file names
pub mod files {
    pub const CALL_GRAPH: &str = "call_graph.json";
    pub const DECOMPILATIONS: &str = "decompilations.json";
    pub const HTML_REPORT: &str = "function_summaries.html";
    pub const PROJECT_CONFIG: &str = "funcsum.toml";
}
