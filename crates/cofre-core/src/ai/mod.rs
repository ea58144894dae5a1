//! Pluggable classification oracle
//!
//! The keyword classifier handles most messages. When it cannot find an
//! amount (or, optionally, when its confidence is low) it may ask an external
//! language model to read the message instead. That model is an opaque
//! oracle behind [`TextClassifierOracle`].
//!
//! # Architecture
//!
//! - `TextClassifierOracle` trait: the single classification capability
//! - `OracleClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockOracle`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, groq, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: llama-3.1-8b-instant)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::MockOracle;
#[cfg(any(test, feature = "test-utils"))]
pub(crate) use mock::heuristic_classification;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::prompts::{PromptId, PromptLibrary};

/// External natural-language classifier
///
/// `categories` is the category catalogue to choose from, one line per kind.
/// Implementations must give up after `timeout`.
#[async_trait]
pub trait TextClassifierOracle: Send + Sync {
    async fn classify_message(
        &self,
        message: &str,
        categories: &str,
        timeout: Duration,
    ) -> Result<OracleClassification>;
}

/// Concrete oracle client enum
#[derive(Clone)]
pub enum OracleClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (Groq, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockOracle),
}

impl OracleClient {
    /// Create an oracle client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST, OPENAI_COMPATIBLE_MODEL
    ///   and OPENAI_COMPATIBLE_API_KEY
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(OracleClient::Ollama),
            "openai_compatible" | "openai" | "groq" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(OracleClient::OpenAICompatible)
            }
            "mock" => Some(OracleClient::Mock(MockOracle::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(OracleClient::Ollama)
            }
        }
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        OracleClient::Ollama(OllamaBackend::new(host, model))
    }

    pub fn mock() -> Self {
        OracleClient::Mock(MockOracle::new())
    }

    pub fn info(&self) -> OracleInfo {
        match self {
            OracleClient::Ollama(b) => OracleInfo {
                backend: "ollama",
                host: b.host().to_string(),
                model: b.model().to_string(),
            },
            OracleClient::OpenAICompatible(b) => OracleInfo {
                backend: "openai_compatible",
                host: b.host().to_string(),
                model: b.model().to_string(),
            },
            OracleClient::Mock(_) => OracleInfo {
                backend: "mock",
                host: "mock".to_string(),
                model: "mock".to_string(),
            },
        }
    }

    /// Check if the backend is reachable
    pub async fn health_check(&self) -> bool {
        match self {
            OracleClient::Ollama(b) => b.health_check().await,
            OracleClient::OpenAICompatible(b) => b.health_check().await,
            OracleClient::Mock(b) => b.healthy,
        }
    }
}

#[async_trait]
impl TextClassifierOracle for OracleClient {
    async fn classify_message(
        &self,
        message: &str,
        categories: &str,
        timeout: Duration,
    ) -> Result<OracleClassification> {
        match self {
            OracleClient::Ollama(b) => b.classify_message(message, categories, timeout).await,
            OracleClient::OpenAICompatible(b) => {
                b.classify_message(message, categories, timeout).await
            }
            OracleClient::Mock(b) => b.classify_message(message, categories, timeout).await,
        }
    }
}

/// Rendered classify_message prompt
pub(crate) struct RenderedPrompt {
    pub system: Option<String>,
    pub user: String,
}

pub(crate) fn render_classify_prompt(
    prompts: &RwLock<PromptLibrary>,
    message: &str,
    categories: &str,
) -> Result<RenderedPrompt> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let template = prompts.get(PromptId::ClassifyMessage)?;

    let mut vars = HashMap::new();
    vars.insert("message", message);
    vars.insert("categories", categories);

    Ok(RenderedPrompt {
        system: template.system_section().map(|s| s.to_string()),
        user: template.render_user(&vars),
    })
}
