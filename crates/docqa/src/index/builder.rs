//! Index construction from chunks

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::vector::{IndexEntry, VectorIndex};
use crate::error::{Error, Result};
use crate::providers::embedding::embed_checked;
use crate::providers::{EmbedderId, EmbeddingProvider};
use crate::types::Chunk;

/// Number of chunk texts sent to the embedder per call
const DEFAULT_BATCH_SIZE: usize = 32;

/// Embeds chunks and assembles a [`VectorIndex`]
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl IndexBuilder {
    /// Create a builder around an embedding provider
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set how many texts go to the embedder per call
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed every chunk and build an index
    ///
    /// Either every chunk is embedded or no index is returned.
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<VectorIndex> {
        if chunks.is_empty() {
            return Err(Error::InvalidInput(
                "cannot build an index from zero chunks".to_string(),
            ));
        }

        let embedder_id = EmbedderId::of(self.embedder.as_ref());
        info!("Embedding {} chunks with {}", chunks.len(), embedder_id);

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let vectors = embed_checked(self.embedder.as_ref(), batch).await?;
            embeddings.extend(vectors);
            debug!("Embedded {}/{} chunks", embeddings.len(), texts.len());
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        let index = VectorIndex::from_parts(embedder_id, entries, Utc::now());
        info!("Built index with {} entries", index.len());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds by text length; fails on the nth call when configured
    struct LengthEmbedder {
        dims: usize,
        fail_on_call: Option<usize>,
        calls: AtomicUsize,
    }

    impl LengthEmbedder {
        fn new(dims: usize) -> Self {
            Self {
                dims,
                fail_on_call: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_call == Some(call) {
                return Err(Error::Io(std::io::Error::other("connection reset")));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "length"
        }

        fn model(&self) -> &str {
            "len-v1"
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::from_text(*t, i))
            .collect()
    }

    #[tokio::test]
    async fn test_builds_in_chunk_order() {
        let builder = IndexBuilder::new(Arc::new(LengthEmbedder::new(2))).with_batch_size(2);
        let index = builder.build(chunks(&["a", "bb", "ccc"])).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.embedder(), &EmbedderId::new("length", "len-v1", 2));
        assert_eq!(index.entries()[2].embedding, vec![3.0, 1.0]);
        assert_eq!(index.entries()[2].chunk.text, "ccc");
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let builder = IndexBuilder::new(Arc::new(LengthEmbedder::new(2)));
        let err = builder.build(Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_yields_no_index() {
        let embedder = LengthEmbedder {
            fail_on_call: Some(2),
            ..LengthEmbedder::new(2)
        };
        let builder = IndexBuilder::new(Arc::new(embedder)).with_batch_size(1);
        let err = builder.build(chunks(&["a", "b", "c", "d"])).await.unwrap_err();

        match err {
            Error::Embedding { provider, message } => {
                assert_eq!(provider, "length");
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_embedding_error() {
        let builder = IndexBuilder::new(Arc::new(LengthEmbedder::new(768)));
        let err = builder.build(chunks(&["a"])).await.unwrap_err();
        assert!(matches!(err, Error::Embedding { .. }));
    }
}
