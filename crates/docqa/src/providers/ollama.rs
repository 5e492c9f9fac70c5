//! Ollama client and the embedding / completion providers built on it

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::CompletionProvider;

const PROVIDER: &str = "ollama";

/// Default Ollama server address
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama HTTP API client
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Server base URL, without trailing slash
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Embed one text with `model`
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbedRequest { model, prompt: text };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(PROVIDER, format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(
                PROVIDER,
                format!("Embedding failed: HTTP {}: {}", status, body),
            ));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            Error::embedding(PROVIDER, format!("Failed to parse embedding response: {}", e))
        })?;

        Ok(embed_response.embedding)
    }

    /// Non-streaming completion with `model`
    pub async fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(PROVIDER, format!("Generate request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(
                PROVIDER,
                format!("Generation failed: HTTP {}: {}", status, body),
            ));
        }

        let gen_response: GenerateResponse = response.json().await.map_err(|e| {
            Error::generation(PROVIDER, format!("Failed to parse generate response: {}", e))
        })?;

        Ok(gen_response.response)
    }
}

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self::from_client(
            Arc::new(OllamaClient::new(&config.base_url)?),
            config.model.clone(),
            config.dimensions,
        ))
    }

    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, model: String, dimensions: usize) -> Self {
        Self {
            client,
            model,
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ollama completion provider
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
}

impl OllamaLlm {
    /// Create a completion provider; `base_url` falls back to the local default
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
        Ok(Self::from_client(
            Arc::new(OllamaClient::new(base_url)?),
            config.model_name().to_string(),
            config.temperature,
        ))
    }

    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client
            .generate(&self.model, prompt, self.temperature)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}
