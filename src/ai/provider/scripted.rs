//! In-memory provider and sleeper for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{CompletionProvider, CompletionRequest, ProviderResult};
use crate::ai::client::Sleeper;
use crate::types::{ErrorCategory, LlmError, Result};

type Reply = Arc<dyn Fn(&str) -> String + Send + Sync>;
type Rejects = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A request as the provider saw it
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

/// Deterministic provider
///
/// Queued outcomes are returned first, one per request. After the queue
/// drains, prompts matching the rejection predicate fail as too large and
/// everything else gets the reply function's output.
pub struct ScriptedProvider {
    queue: Mutex<VecDeque<ProviderResult<String>>>,
    reply: Reply,
    rejects: Option<Rejects>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            reply: Arc::new(|_| "A scripted summary.".to_string()),
            rejects: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, reply: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.reply = Arc::new(reply);
        self
    }

    /// Reject prompts longer than `chars` with a token-limit error
    pub fn too_large_above(self, chars: usize) -> Self {
        self.too_large_when(move |prompt| prompt.chars().count() > chars)
    }

    /// Reject prompts matching `predicate` with a token-limit error
    pub fn too_large_when(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.rejects = Some(Arc::new(predicate));
        self
    }

    pub fn then(self, outcome: ProviderResult<String>) -> Self {
        self.queue.lock().unwrap().push_back(outcome);
        self
    }

    pub fn then_fail(self, category: ErrorCategory, message: &str) -> Self {
        self.then(Err(LlmError::with_provider(category, message, "scripted")))
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.seen().into_iter().map(|r| r.prompt).collect()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn generate(&self, request: &CompletionRequest<'_>) -> ProviderResult<String> {
        self.seen.lock().unwrap().push(SeenRequest {
            prompt: request.prompt.to_string(),
            max_tokens: request.max_tokens,
        });

        if let Some(outcome) = self.queue.lock().unwrap().pop_front() {
            return outcome;
        }

        if let Some(rejects) = &self.rejects
            && rejects(request.prompt)
        {
            return Err(LlmError::with_provider(
                ErrorCategory::TokenLimit,
                "prompt exceeds the context length",
                "scripted",
            ));
        }

        Ok((self.reply)(request.prompt))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self, _model: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Records requested delays without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
