//! Embedding provider trait and embedder identity

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// The same provider embeds chunk text at index time and questions at query
/// time. Implementations:
/// - `OllamaEmbedder`: local Ollama server (nomic-embed-text)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Length of every vector this provider returns
    fn dimensions(&self) -> usize;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the embedding model
    fn model(&self) -> &str;
}

/// Identity of an embedding function, stored with every index
///
/// Two indexes are comparable only when their ids are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbedderId {
    /// Provider name
    pub provider: String,
    /// Model name
    pub model: String,
    /// Vector length
    pub dimensions: usize,
}

impl EmbedderId {
    /// Create an id from its parts
    pub fn new(provider: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            dimensions,
        }
    }

    /// Id of a live provider
    pub fn of(provider: &dyn EmbeddingProvider) -> Self {
        Self::new(provider.name(), provider.model(), provider.dimensions())
    }
}

impl fmt::Display for EmbedderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}d)", self.provider, self.model, self.dimensions)
    }
}

/// Re-label a provider failure as an embedding failure, keeping existing ones as-is
pub(crate) fn embedding_failure(provider: &str, error: Error) -> Error {
    match error {
        Error::Embedding { .. } => error,
        other => Error::embedding(provider, other.to_string()),
    }
}

/// Run a batch through `provider`, checking the count and every vector's length
pub(crate) async fn embed_checked(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    let name = provider.name();
    let vectors = provider
        .embed_batch(texts)
        .await
        .map_err(|e| embedding_failure(name, e))?;

    if vectors.len() != texts.len() {
        return Err(Error::embedding(
            name,
            format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
        ));
    }

    let expected = provider.dimensions();
    if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
        return Err(Error::embedding(
            name,
            format!("expected {} dimensions, got {}", expected, bad.len()),
        ));
    }

    if vectors.iter().flatten().any(|x| !x.is_finite()) {
        return Err(Error::embedding(name, "embedding contains non-finite values"));
    }

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_id_display() {
        let id = EmbedderId::new("ollama", "nomic-embed-text", 768);
        assert_eq!(id.to_string(), "ollama/nomic-embed-text (768d)");
    }

    struct Constant(Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for Constant {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "constant"
        }

        fn model(&self) -> &str {
            "c1"
        }
    }

    #[tokio::test]
    async fn test_embed_checked_rejects_nan() {
        let texts = vec!["a".to_string()];
        let err = embed_checked(&Constant(vec![0.5, f32::NAN]), &texts)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding { .. }));

        let ok = embed_checked(&Constant(vec![0.5, 0.5]), &texts).await.unwrap();
        assert_eq!(ok, vec![vec![0.5, 0.5]]);
    }

    #[test]
    fn test_ids_differ_by_model() {
        let a = EmbedderId::new("ollama", "nomic-embed-text", 768);
        let b = EmbedderId::new("ollama", "all-minilm", 768);
        assert_ne!(a, b);
    }
}
