//! Completion Integration Layer
//!
//! Provider abstraction, retrying client, and prompt construction.

pub mod client;
pub mod prompt;
pub mod provider;

pub use client::{ClientStats, CompletionClient, RetryPolicy, Sleeper, TokioSleeper};
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    CompletionProvider, CompletionRequest, OllamaProvider, ProviderConfig, SharedProvider,
    create_provider,
};
