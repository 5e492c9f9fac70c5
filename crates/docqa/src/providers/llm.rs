//! Completion provider trait

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for text completion
///
/// Implementations:
/// - `OllamaLlm`: local Ollama server (llama3.2, etc.)
/// - `OpenAiCompatClient`: Groq or any OpenAI-compatible chat API
/// - `GeminiClient`: Google Generative Language API
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a fully rendered prompt and return the model's reply
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// Re-label a provider failure as a generation failure, keeping existing ones as-is
pub(crate) fn generation_failure(provider: &str, error: Error) -> Error {
    match error {
        Error::Generation { .. } => error,
        other => Error::generation(provider, other.to_string()),
    }
}
