//! In-memory vector index with exact cosine search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::providers::EmbedderId;
use crate::types::{Chunk, ScoredChunk};

/// A chunk together with its embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Chunks and their embeddings, tagged with the embedding function that produced them
#[derive(Debug, Clone)]
pub struct VectorIndex {
    embedder: EmbedderId,
    entries: Vec<IndexEntry>,
    created_at: DateTime<Utc>,
}

impl VectorIndex {
    /// Create an empty index for vectors from `embedder`
    pub fn new(embedder: EmbedderId) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn from_parts(
        embedder: EmbedderId,
        entries: Vec<IndexEntry>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            embedder,
            entries,
            created_at,
        }
    }

    /// Add a chunk; the embedding must have the index's dimension
    pub fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.embedder.dimensions {
            return Err(Error::InvalidInput(format!(
                "embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.embedder.dimensions
            )));
        }
        self.entries.push(IndexEntry { chunk, embedding });
        Ok(())
    }

    /// Embedding function this index was built with
    pub fn embedder(&self) -> &EmbedderId {
        &self.embedder
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// When the index was built
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The `min(k, len)` entries closest to `query`, closest first
    ///
    /// Equal distances keep insertion order.
    pub fn nearest(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_distance(query, &entry.embedding)))
            .collect();

        // Stable sort
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        scored
            .into_iter()
            .take(k)
            .map(|(i, distance)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                distance,
            })
            .collect()
    }
}

/// Cosine distance `1 - cos(a, b)`
///
/// A zero vector is treated as orthogonal to everything. Non-finite input
/// yields `f32::INFINITY` so such entries rank last.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 1.0;
    }

    let distance = 1.0 - dot / denom;
    if distance.is_finite() {
        distance
    } else {
        f32::INFINITY
    }
}
