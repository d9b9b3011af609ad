//! Ollama Completion Provider
//!
//! Plain-text completions from a locally-running Ollama server via
//! `POST /api/generate` with streaming disabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CompletionProvider, CompletionRequest, ProviderConfig, ProviderResult};
use crate::constants::network;
use crate::types::{ErrorCategory, ErrorClassifier, FuncsumError, LlmError, Result};

const PROVIDER: &str = "ollama";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    endpoint: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        // Validate endpoint URL for security (SSRF prevention)
        let endpoint = validate_endpoint(&config.endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| FuncsumError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            temperature: config.temperature,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, request: &CompletionRequest<'_>) -> OllamaRequest {
        OllamaRequest {
            model: request.model.to_string(),
            prompt: request.prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_tokens,
                temperature: self.temperature,
            },
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::with_provider(
                ErrorCategory::Network,
                format!(
                    "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                    self.endpoint
                ),
                PROVIDER,
            )
        } else if e.is_timeout() || e.is_request() || e.is_body() {
            LlmError::with_provider(
                ErrorCategory::Network,
                format!("Ollama request failed: {}", e),
                PROVIDER,
            )
        } else {
            ErrorClassifier::classify(&format!("Ollama request failed: {}", e), PROVIDER)
        }
    }
}

/// Validate endpoint URL for security (SSRF prevention)
///
/// Only allows http/https schemes and warns for non-localhost endpoints.
pub fn validate_endpoint(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        FuncsumError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FuncsumError::Config(format!(
            "Ollama endpoint must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    if let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
    {
        warn!(
            "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
            host
        );
    }

    // Remove trailing slash for consistency
    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn generate(&self, request: &CompletionRequest<'_>) -> ProviderResult<String> {
        debug!(
            "Generating with Ollama (model: {}, max_tokens: {}, prompt_chars: {})",
            request.model,
            request.max_tokens,
            request.prompt.len()
        );

        let start_time = Instant::now();
        let body = self.build_request(request);
        let url = format!("{}/api/generate", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read Ollama error body (HTTP {}): {}", status, e);
                    String::new()
                }
            };
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &body,
                PROVIDER,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response_body: OllamaResponse = serde_json::from_slice(&bytes).map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::ParseError,
                format!("Failed to parse Ollama response: {}", e),
                PROVIDER,
            )
        })?;

        let text = response_body.response.trim();
        if text.is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::ParseError,
                "Ollama returned an empty completion",
                PROVIDER,
            ));
        }

        debug!(
            "Received {} chars from Ollama in {}ms (eval_count: {:?})",
            text.len(),
            start_time.elapsed().as_millis(),
            response_body.eval_count
        );

        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    async fn health_check(&self, model: &str) -> Result<bool> {
        let url = format!("{}/api/tags", self.endpoint);

        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(tags) = resp.json::<OllamaTagsResponse>().await {
                    let base = model.strip_suffix(":latest").unwrap_or(model);
                    let model_available = tags
                        .models
                        .iter()
                        .any(|m| m.name == model || m.name.starts_with(base));

                    if model_available {
                        info!("Ollama is available with model: {}", model);
                        Ok(true)
                    } else {
                        warn!(
                            "Ollama is running but model '{}' not found. Pull with: ollama pull {}",
                            model, model
                        );
                        Ok(false)
                    }
                } else {
                    info!("Ollama is available");
                    Ok(true)
                }
            }
            Ok(resp) => {
                warn!("Ollama API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama not available: {}. Start with: ollama serve", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
