//! Pluggable narrative backend abstraction
//!
//! Narrative analysis sends a rendered prompt to a text-generation model and
//! keeps the reply verbatim. The reply is opaque to the rest of the crate.
//!
//! # Architecture
//!
//! - `NarrativeBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// System prompt framing every narrative request
pub const ANALYST_SYSTEM_PROMPT: &str = "You are a professional financial analyst with expertise \
in business finance, accounting, and data analysis. Provide clear, actionable insights based on \
the financial data presented.";

/// Default generation budget
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Upper bound on a single narrative call
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A single narrative generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl NarrativeRequest {
    /// Request with the analyst system prompt and default generation settings
    pub fn analyst(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: ANALYST_SYSTEM_PROMPT.to_string(),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Trait defining the interface for all narrative backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    /// Generate free text for a prompt (trimmed of surrounding whitespace)
    async fn generate(&self, request: &NarrativeRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Build the shared HTTP client with the narrative timeout applied
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, hosted APIs)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Backend name for logs and stored results
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Ollama(_) => "ollama",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }
}

// Delegate to the inner backend
#[async_trait]
impl NarrativeBackend for AIClient {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.generate(request).await,
            AIClient::OpenAICompatible(b) => b.generate(request).await,
            AIClient::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyst_request_defaults() {
        let request = NarrativeRequest::analyst("Analyze this");
        assert_eq!(request.prompt, "Analyze this");
        assert_eq!(request.max_tokens, 1500);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert!(request.system_prompt.starts_with("You are a professional financial analyst"));
    }

    #[test]
    fn test_mock_client_names() {
        let client = AIClient::mock();
        assert_eq!(client.backend_name(), "mock");
        assert_eq!(client.model(), "mock");
    }

    #[tokio::test]
    async fn test_client_delegates_generate() {
        let client = AIClient::mock();
        let text = client
            .generate(&NarrativeRequest::analyst("Summary:\n- Total Revenue: $10.00"))
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
