//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::ai::ProviderConfig;
use crate::ai::provider::validate_endpoint;
use crate::constants::{chunking, files, network, retry};
use crate::types::{FuncsumError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion service settings
    pub llm: LlmConfig,

    /// Transient-failure retry settings
    pub retry: RetryConfig,

    /// Chunked summarization settings
    pub chunking: ChunkingConfig,

    /// Input file names inside the program directory
    pub inputs: InputsConfig,

    /// Output settings
    pub output: OutputConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `FuncsumError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(FuncsumError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(FuncsumError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_prompt_chars == Some(0) {
            return Err(FuncsumError::Config(
                "LLM max_prompt_chars must be greater than 0 when set".to_string(),
            ));
        }

        validate_endpoint(&self.llm.endpoint)?;

        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 1.0 {
            return Err(FuncsumError::Config(format!(
                "Retry backoff_factor must be a finite number of at least 1.0, got {}",
                self.retry.backoff_factor
            )));
        }

        if self.retry.max_delay_secs == 0 {
            return Err(FuncsumError::Config(
                "Retry max_delay_secs must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == Some(0) {
            return Err(FuncsumError::Config(
                "Retry max_attempts must be greater than 0 when set".to_string(),
            ));
        }

        self.chunking.validate()
    }

    /// Provider settings derived from the `llm` section
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.llm.provider.clone(),
            endpoint: self.llm.endpoint.clone(),
            timeout_secs: self.llm.timeout_secs,
            temperature: self.llm.temperature,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type
    pub provider: String,

    /// Service base URL
    pub endpoint: String,

    /// Model name; usually given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    /// Prompts longer than this many characters are treated as too large
    /// without contacting the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_prompt_chars: Option<usize>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: network::DEFAULT_ENDPOINT.to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_prompt_chars: None,
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub base_delay_ms: u64,

    pub max_delay_secs: u64,

    pub backoff_factor: f32,

    /// Total attempts per completion; unset retries until success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Randomize delays by up to 25%
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: retry::BASE_DELAY_MS,
            max_delay_secs: retry::MAX_DELAY_SECS,
            backoff_factor: retry::BACKOFF_FACTOR,
            max_attempts: None,
            jitter: true,
        }
    }
}

// =============================================================================
// Chunking Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Starting window size in lines
    pub max_lines: usize,

    /// Lines removed from the window after each rejection
    pub line_decrement: usize,

    /// Smallest window tried
    pub min_lines: usize,

    /// Completion budget for paragraph window summaries
    pub paragraph_max_tokens: u32,

    /// Completion budget for sentence summaries and final combinations
    pub sentence_max_tokens: u32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_lines: chunking::DEFAULT_MAX_LINES,
            line_decrement: chunking::LINE_DECREMENT,
            min_lines: chunking::MIN_LINES,
            paragraph_max_tokens: chunking::PARAGRAPH_MAX_TOKENS,
            sentence_max_tokens: chunking::SENTENCE_MAX_TOKENS,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.line_decrement == 0 {
            return Err(FuncsumError::Config(
                "Chunking line_decrement must be greater than 0".to_string(),
            ));
        }

        if self.min_lines == 0 {
            return Err(FuncsumError::Config(
                "Chunking min_lines must be greater than 0".to_string(),
            ));
        }

        if self.max_lines < self.min_lines {
            return Err(FuncsumError::Config(format!(
                "Chunking max_lines ({}) must be at least min_lines ({})",
                self.max_lines, self.min_lines
            )));
        }

        if self.paragraph_max_tokens == 0 || self.sentence_max_tokens == 0 {
            return Err(FuncsumError::Config(
                "Chunking token budgets must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Input / Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub call_graph_file: String,
    pub decompilations_file: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            call_graph_file: files::CALL_GRAPH.to_string(),
            decompilations_file: files::DECOMPILATIONS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Render the HTML report after a summarization run
    pub html_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { html_report: true }
    }
}
