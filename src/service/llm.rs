//! Shared LLM client and the text generation capability
//!
//! Extraction and composition only need "prompt in, text out"; `TextGenerator`
//! is that seam, and `GeminiGenerator` is the production implementation.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
}

/// Trait for text generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, used for logging
    fn model(&self) -> &str;

    /// Send `prompt` once and return the raw completion text
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: gemini::Client,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str) -> Result<Self, String> {
        let client = gemini::Client::new(api_key)
            .map_err(|e| format!("Failed to create Gemini client: {}", e))?;

        Ok(Self { client })
    }

    /// Create a generator bound to `model`
    pub fn generator(&self, model: &str) -> GeminiGenerator {
        GeminiGenerator {
            client: self.client.clone(),
            model: model.to_string(),
        }
    }
}

/// Gemini-backed text generator
#[derive(Clone)]
pub struct GeminiGenerator {
    client: gemini::Client,
    model: String,
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let agent = self.client.agent(&self.model).build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))
    }
}
