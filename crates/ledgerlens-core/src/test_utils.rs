//! Test utilities for ledgerlens-core
//!
//! This module provides a mock model server that speaks both the Ollama
//! generate API and the OpenAI chat completions API, for integration tests
//! and development without a running model.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock Ollama/OpenAI server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Clone, Copy)]
struct MockState {
    /// Generation endpoints answer 500 when set (health stays green)
    fail_generation: bool,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(MockState {
            fail_generation: false,
        })
        .await
    }

    /// Start a server whose generation endpoints always return 500
    pub async fn start_failing() -> Self {
        Self::start_with(MockState {
            fail_generation: true,
        })
        .await
    }

    async fn start_with(state: MockState) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Canned narrative chosen from the prompt's opening instruction
fn narrative_for(prompt: &str) -> String {
    let p = prompt.to_lowercase();
    let text = if p.contains("analyze the financial trends") {
        "Revenue trend is steady with a healthy margin. Watch expense growth."
    } else if p.contains("assess the financial health") {
        "Financial health is moderate. Profitability is the main lever."
    } else if p.contains("comparative analysis") {
        "Revenue comfortably exceeds expenses across categories."
    } else if p.contains("assess the financial risks") {
        "Primary risk is revenue concentration. Build a cash buffer."
    } else if p.contains("forecasting insights") {
        "Expect modest growth over the next two quarters."
    } else if p.contains("user request:") {
        "Custom analysis: the requested breakdown is attached."
    } else {
        "General financial commentary."
    };
    text.to_string()
}

async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

async fn handle_generate(
    State(state): State<MockState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if state.fail_generation {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }

    Json(GenerateResponse {
        model: request.model,
        response: narrative_for(&request.prompt),
        done: true,
    })
    .into_response()
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "object": "list",
        "data": [{ "id": "mock-gpt", "object": "model" }]
    }))
}

async fn handle_chat(
    State(state): State<MockState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if state.fail_generation {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }

    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    Json(serde_json::json!({
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": narrative_for(prompt) },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{NarrativeBackend, NarrativeRequest, OllamaBackend, OpenAICompatibleBackend};

    #[tokio::test]
    async fn test_mock_server_ollama_health() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "test-model");
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_server_openai_chat() {
        let server = MockOllamaServer::start().await;
        let client = OpenAICompatibleBackend::with_api_key(&server.url(), "mock-gpt", "sk-test");

        assert!(client.health_check().await);
        let text = client
            .generate(&NarrativeRequest::analyst(
                "Assess the financial risks based on this data:",
            ))
            .await
            .unwrap();
        assert!(text.contains("risk"));
    }

    #[tokio::test]
    async fn test_mock_server_failing_generation() {
        let server = MockOllamaServer::start_failing().await;
        let ollama = OllamaBackend::new(&server.url(), "test-model");
        let openai = OpenAICompatibleBackend::new(&server.url(), "mock-gpt");
        let request = NarrativeRequest::analyst("Analyze the financial trends");

        assert!(ollama.generate(&request).await.is_err());
        assert!(openai.generate(&request).await.is_err());
    }

    #[test]
    fn test_narrative_for_custom() {
        assert!(narrative_for("User Request: split by quarter").starts_with("Custom"));
    }
}
