//! Retrieval and answer types

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// A retrieved chunk with its vector distance to the question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine distance (0.0 = identical direction, lower is closer)
    pub distance: f32,
}

impl ScoredChunk {
    /// Cosine similarity derived from the distance
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Chunks retrieved for a question, closest first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    /// Wrap hits that are already sorted closest-first
    pub fn new(hits: Vec<ScoredChunk>) -> Self {
        Self { hits }
    }

    /// Number of retrieved chunks
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True when nothing was retrieved
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Scored hits, closest first
    pub fn hits(&self) -> &[ScoredChunk] {
        &self.hits
    }

    /// Retrieved chunks, closest first
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.hits.iter().map(|h| &h.chunk)
    }

    /// Retrieved chunk texts, closest first
    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.chunk.text.as_str()).collect()
    }
}

impl IntoIterator for RetrievalResult {
    type Item = ScoredChunk;
    type IntoIter = std::vec::IntoIter<ScoredChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

/// Generated answer together with the chunks it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// Answer text
    pub text: String,
    /// Chunks supplied to the model as context
    pub supporting_chunks: RetrievalResult,
}
