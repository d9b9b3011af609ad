//! Completion Provider Abstraction
//!
//! Defines the `CompletionProvider` trait: a stateless prompt → text
//! function. Providers classify their own failures into [`LlmError`] so the
//! client can route them without inspecting transport details.

mod ollama;
#[cfg(test)]
pub mod scripted;

pub use ollama::{OllamaProvider, validate_endpoint};

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::network;
use crate::types::{FuncsumError, Result};

/// Outcome of a single provider request
pub type ProviderResult<T> = std::result::Result<T, LlmError>;

/// One completion request
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Shared provider type; the client and health checks hold the same instance.
pub type SharedProvider = Arc<dyn CompletionProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for completion providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "ollama"
    pub provider: String,
    /// Service base URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: network::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
        }
    }
}

// =============================================================================
// Completion Provider Trait
// =============================================================================

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue exactly one request and return the trimmed completion text
    async fn generate(&self, request: &CompletionRequest<'_>) -> ProviderResult<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Check if the service is reachable and `model` is available
    async fn health_check(&self, model: &str) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        _ => Err(FuncsumError::Config(format!(
            "Unknown provider: {}. Supported: ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_provider() {
        let provider = create_provider(&ProviderConfig::default()).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ProviderConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, FuncsumError::Config(_)));
    }
}
