//! Provider abstractions for embeddings and text completion
//!
//! The pipeline only sees the two traits; concrete clients are picked from
//! configuration by [`from_config`].

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;
pub mod openai_compat;
pub mod probe;

use std::sync::Arc;

use crate::config::{LlmBackend, LlmConfig, RagConfig};
use crate::error::Result;

pub use embedding::{EmbedderId, EmbeddingProvider};
pub use gemini::GeminiClient;
pub use llm::CompletionProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use openai_compat::OpenAiCompatClient;
pub use probe::{probe_models, ProbeAttempt, ProbeReport};

/// Build the configured embedding and completion providers
pub fn from_config(
    config: &RagConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn CompletionProvider>)> {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
    let llm: Arc<dyn CompletionProvider> = Arc::from(completion_for_model(
        &llm_config_for(config),
        config.llm.model_name(),
    )?);

    tracing::info!(
        "Providers: embeddings {}/{}, completion {}/{}",
        embedder.name(),
        embedder.model(),
        llm.name(),
        llm.model()
    );

    Ok((embedder, llm))
}

/// Completion settings with the Ollama URL inherited from the embedding
/// section when the LLM section does not set one
pub fn llm_config_for(config: &RagConfig) -> LlmConfig {
    let mut llm = config.llm.clone();
    if llm.provider == LlmBackend::Ollama && llm.base_url.is_none() {
        llm.base_url = Some(config.embeddings.base_url.clone());
    }
    llm
}

/// Build a completion provider for `config`'s backend using `model`
pub fn completion_for_model(config: &LlmConfig, model: &str) -> Result<Box<dyn CompletionProvider>> {
    let config = LlmConfig {
        model: Some(model.to_string()),
        ..config.clone()
    };

    Ok(match config.provider {
        LlmBackend::Groq | LlmBackend::OpenAi => Box::new(OpenAiCompatClient::new(&config)?),
        LlmBackend::Ollama => Box::new(OllamaLlm::new(&config)?),
        LlmBackend::Gemini => Box::new(GeminiClient::new(&config)?),
    })
}
