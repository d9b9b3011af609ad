//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for the completion client's routing:
//!
//! - **Transient / Network / RateLimit / Unavailable**: retry with backoff
//! - **TokenLimit**: prompt too large, hand back to the summarizer
//! - **Auth / BadRequest / ParseError / Unknown**: fail fast

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for completion routing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Context/token limit exceeded - needs a smaller prompt
    TokenLimit,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Service unavailable or model still loading - retry with backoff
    Unavailable,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Response could not be understood
    ParseError,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Failures of the communication channel rather than of the request
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::Unavailable
        )
    }

    /// The prompt must shrink before it can succeed
    pub fn is_too_large(&self) -> bool {
        matches!(self, Self::TokenLimit)
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Completion-service error with category, context, and retry hints
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Suggested wait time before retry (if applicable)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.category.is_transient()
    }

    pub fn is_too_large(&self) -> bool {
        self.category.is_too_large()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw service failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from the completion service
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        // Token/context limit patterns
        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("context window")
            || lower.contains("too long")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("rate limit")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30));
        }

        if lower.contains("unauthorized")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("permission denied")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("connection")
            || lower.contains("network")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider)
                .retry_after(Duration::from_secs(5));
        }

        if lower.contains("service unavailable")
            || lower.contains("overloaded")
            || lower.contains("loading model")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("malformed") || lower.contains("parse") || lower.contains("json") {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify a non-success HTTP response
    ///
    /// Status codes route first; the body is only consulted to recognise a
    /// context-length rejection hidden behind a generic 4xx/5xx.
    pub fn classify_http_status(status: u16, body: &str, provider: &str) -> LlmError {
        let message = format!("HTTP {}: {}", status, body.trim());

        if status == 413 || Self::classify(body, provider).is_too_large() {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        match status {
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30)),
            500..=599 => LlmError::with_provider(ErrorCategory::Transient, message, provider)
                .retry_after(Duration::from_secs(2)),
            // Any other non-2xx is a transport hiccup from the pipeline's view
            _ => LlmError::with_provider(ErrorCategory::Transient, message, provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum FuncsumError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    // -------------------------------------------------------------------------
    // Completion Errors
    // -------------------------------------------------------------------------
    /// Structured completion-service error with category and retry hints
    #[error("LLM error: {0}")]
    Llm(LlmError),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Call graph contains a cycle: {}", cycle.join(" -> "))]
    CallGraphCycle { cycle: Vec<String> },

    #[error("Invalid input {path}: {message}")]
    Input { path: String, message: String },

    #[error("Journal {path} line {line}: {message}")]
    Journal {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl From<LlmError> for FuncsumError {
    fn from(err: LlmError) -> Self {
        FuncsumError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, FuncsumError>;

impl FuncsumError {
    /// Create an input error for a file
    pub fn input(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Error category when this error came from the completion service
    pub fn llm_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Llm(e) => Some(e.category),
            _ => None,
        }
    }
}

// =============================================================================
// Completion Client Error
// =============================================================================

/// Failure of one logical completion call
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The prompt does not fit the model; never retried
    #[error("Prompt too large ({prompt_chars} chars): {reason}")]
    PromptTooLarge { prompt_chars: usize, reason: String },

    /// The configured retry cap was reached on transient failures
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: LlmError },

    /// No recovery exists for this failure
    #[error(transparent)]
    Fatal(#[from] FuncsumError),
}

impl From<CompletionError> for FuncsumError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Fatal(inner) => inner,
            CompletionError::RetriesExhausted { last, .. } => FuncsumError::Llm(last),
            CompletionError::PromptTooLarge {
                prompt_chars,
                reason,
            } => FuncsumError::Llm(LlmError::new(
                ErrorCategory::TokenLimit,
                format!("prompt of {} chars rejected: {}", prompt_chars, reason),
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
