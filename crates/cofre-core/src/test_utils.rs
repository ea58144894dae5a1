//! Test utilities for cofre-core
//!
//! A mock Ollama server that answers classification prompts with the same
//! heuristic as [`MockOracle`](crate::ai::MockOracle), so the HTTP oracle path
//! can be exercised without a model.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::ai::heuristic_classification;

/// Marker line in the classify_message prompt
const MESSAGE_MARKER: &str = "Classify this message: \"";

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> std::io::Result<Self> {
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route(
                "/api/generate",
                post(move |body: Json<GenerateRequest>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    handle_generate(body)
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await;
            if let Err(e) = served {
                tracing::warn!(error = %e, "Mock Ollama server stopped with an error");
            }
        });

        Ok(Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of `/api/generate` requests served
    pub fn generate_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
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

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 2_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let response = match message_from_prompt(&request.prompt) {
        Some(message) => {
            let answer = heuristic_classification(message);
            // Wrapped in prose, like a real model tends to do
            format!(
                "Here is the classification:\n{}",
                serde_json::to_string(&answer).unwrap_or_default()
            )
        }
        None => "I can only classify transaction messages.".to_string(),
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

fn message_from_prompt(prompt: &str) -> Option<&str> {
    prompt.lines().find_map(|line| {
        line.trim()
            .strip_prefix(MESSAGE_MARKER)
            .and_then(|rest| rest.strip_suffix('"'))
    })
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(default)]
    #[allow(dead_code)]
    system: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{OllamaBackend, TextClassifierOracle};
    use crate::models::TransactionKind;
    use crate::prompts::PromptLibrary;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_message_from_prompt() {
        let prompt = "Rules...\nClassify this message: \"paguei \"vinte\" no bar\"\n{{categories}}";
        assert_eq!(message_from_prompt(prompt), Some("paguei \"vinte\" no bar"));
        assert_eq!(message_from_prompt("nothing here"), None);
    }

    #[tokio::test]
    async fn test_mock_server_health() {
        let server = MockOllamaServer::start().await.unwrap();
        let backend =
            OllamaBackend::with_prompts(&server.url(), "llama3.2", PromptLibrary::embedded_only());
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_ollama_backend_against_mock_server() {
        let server = MockOllamaServer::start().await.unwrap();
        let backend =
            OllamaBackend::with_prompts(&server.url(), "llama3.2", PromptLibrary::embedded_only());

        let answer = backend
            .classify_message(
                "gastei trinta no cinema",
                "- variable_expense: Food, Leisure",
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(answer.amount, Some(dec!(30)));
        assert_eq!(answer.kind, TransactionKind::VariableExpense);
        assert_eq!(answer.category, "Leisure");
        assert_eq!(server.generate_requests(), 1);
    }

    #[tokio::test]
    async fn test_stopped_server_is_unhealthy() {
        let mut server = MockOllamaServer::start().await.unwrap();
        let backend =
            OllamaBackend::with_prompts(&server.url(), "llama3.2", PromptLibrary::embedded_only());
        server.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!backend.health_check().await);
    }
}
