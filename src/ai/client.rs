//! Completion Client
//!
//! Retrying adapter around a [`CompletionProvider`]. Every failure lands in
//! one of three buckets:
//!
//! - **Transient** (network, timeout, 5xx, 429, other non-2xx): exponential
//!   backoff, then the same request again
//! - **Too large**: returned at once as [`CompletionError::PromptTooLarge`]
//!   so the summarizer can shrink its input
//! - **Everything else**: returned at once as [`CompletionError::Fatal`]

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::provider::{CompletionRequest, SharedProvider};
use crate::config::RetryConfig;
use crate::constants::retry;
use crate::types::{CompletionError, LlmError};

// =============================================================================
// Sleeping
// =============================================================================

/// Where backoff delays are spent
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping on the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =============================================================================
// Retry Policy
// =============================================================================

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f32,
    /// Total attempts per request, including the first; `None` retries forever
    pub max_attempts: Option<u32>,
    /// Add up to 25% random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
            max_delay: Duration::from_secs(retry::MAX_DELAY_SECS),
            backoff_factor: retry::BACKOFF_FACTOR,
            max_attempts: None,
            jitter: true,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_secs(config.max_delay_secs),
            backoff_factor: config.backoff_factor,
            max_attempts: config.max_attempts,
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt
    ///
    /// Honors a service-suggested `retry_after` when it is longer than the
    /// backoff step; never exceeds `max_delay`.
    fn delay_for(&self, current: Duration, err: &LlmError) -> Duration {
        let mut delay = current;
        if self.jitter {
            delay += random_jitter(current);
        }
        if let Some(hint) = err.retry_after {
            delay = delay.max(hint);
        }
        delay.min(self.max_delay)
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Generate random jitter using thread-local RNG for efficiency
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    let jitter_ms = rand::rng().random_range(0..max_jitter_ms);
    Duration::from_millis(jitter_ms)
}

/// Calculate exponential backoff with cap
///
/// A product that overflows `Duration` or is not a number saturates at `max`.
fn calculate_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    Duration::try_from_secs_f32(current.as_secs_f32() * factor)
        .map_or(max, |next| next.min(max))
}

// =============================================================================
// Client
// =============================================================================

/// Request counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Provider requests issued, retries included
    pub requests: u64,
    /// Transient failures that were retried
    pub retries: u64,
    /// Prompts rejected as too large
    pub too_large: u64,
}

pub struct CompletionClient {
    provider: SharedProvider,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    max_prompt_chars: Option<usize>,
    log_prompts: bool,
    requests: AtomicU64,
    retries: AtomicU64,
    too_large: AtomicU64,
}

impl CompletionClient {
    pub fn new(provider: SharedProvider, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            sleeper: Arc::new(TokioSleeper),
            max_prompt_chars: None,
            log_prompts: false,
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            too_large: AtomicU64::new(0),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Reject prompts longer than `limit` characters without sending them
    pub fn with_max_prompt_chars(mut self, limit: Option<usize>) -> Self {
        self.max_prompt_chars = limit;
        self
    }

    /// Echo every prompt and completion at info level
    pub fn with_log_prompts(mut self, enabled: bool) -> Self {
        self.log_prompts = enabled;
        self
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            requests: self.requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            too_large: self.too_large.load(Ordering::Relaxed),
        }
    }

    /// One logical completion, retried across transient failures
    #[instrument(skip(self, prompt), fields(provider = %self.provider.name(), prompt_chars = prompt.len()))]
    pub async fn complete(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let prompt_chars = prompt.chars().count();

        if let Some(limit) = self.max_prompt_chars
            && prompt_chars > limit
        {
            self.too_large.fetch_add(1, Ordering::Relaxed);
            debug!(prompt_chars, limit, "Prompt over client-side limit");
            return Err(CompletionError::PromptTooLarge {
                prompt_chars,
                reason: format!("exceeds the {} character limit", limit),
            });
        }

        if self.log_prompts {
            info!("Prompt ({} chars):\n{}", prompt_chars, prompt);
        }

        let request = CompletionRequest {
            prompt,
            model,
            max_tokens,
        };
        let mut current_delay = self.policy.base_delay;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            self.requests.fetch_add(1, Ordering::Relaxed);

            let err = match self.provider.generate(&request).await {
                Ok(text) => {
                    if self.log_prompts {
                        info!("Completion:\n{}", text);
                    }
                    return Ok(text);
                }
                Err(err) => err,
            };

            if err.is_too_large() {
                self.too_large.fetch_add(1, Ordering::Relaxed);
                debug!(prompt_chars, error = %err, "Prompt rejected as too large");
                return Err(CompletionError::PromptTooLarge {
                    prompt_chars,
                    reason: err.message,
                });
            }

            if !err.is_transient() {
                return Err(CompletionError::Fatal(err.into()));
            }

            if self.policy.exhausted(attempts) {
                warn!(attempts, error = %err, "Retry limit reached");
                return Err(CompletionError::RetriesExhausted {
                    attempts,
                    last: err,
                });
            }

            let delay = self.policy.delay_for(current_delay, &err);
            warn!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                category = %err.category,
                error = %err,
                "Transient completion failure, retrying"
            );
            self.retries.fetch_add(1, Ordering::Relaxed);
            self.sleeper.sleep(delay).await;

            current_delay = calculate_backoff(
                current_delay,
                self.policy.backoff_factor,
                self.policy.max_delay,
            );
        }
    }
}
