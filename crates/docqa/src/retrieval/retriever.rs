//! Top-k similarity search against a built index

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::providers::embedding::embed_checked;
use crate::providers::{EmbedderId, EmbeddingProvider};
use crate::types::RetrievalResult;

/// Chunks returned per question unless configured otherwise
pub const DEFAULT_TOP_K: usize = 3;

/// Embeds questions and finds the closest indexed chunks
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever; `embedder` must be the one the index was built with
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Return the `min(k, index.len())` chunks closest to `question`
    pub async fn search(
        &self,
        index: &VectorIndex,
        question: &str,
        k: usize,
    ) -> Result<RetrievalResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }
        if k == 0 {
            return Err(Error::InvalidInput("k must be at least 1".to_string()));
        }
        if index.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let active = EmbedderId::of(self.embedder.as_ref());
        if index.embedder() != &active {
            return Err(Error::EmbedderMismatch {
                index: index.embedder().to_string(),
                active: active.to_string(),
            });
        }

        let query = embed_checked(self.embedder.as_ref(), &[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding(active.provider.as_str(), "no embedding returned"))?;

        let hits = index.nearest(&query, k);
        if let Some(best) = hits.first() {
            debug!("Closest chunk distance {:.4}", best.distance);
        }
        info!(
            "Retrieved {} chunks for a {}-char question",
            hits.len(),
            question.chars().count()
        );

        Ok(RetrievalResult::new(hits))
    }
}
