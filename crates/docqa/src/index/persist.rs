//! On-disk index storage
//!
//! A persisted index is a directory holding a single `index.json`. Writes go
//! to a sibling temp file that is renamed over the old one.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::vector::{IndexEntry, VectorIndex};
use crate::error::{Error, Result};
use crate::providers::{EmbedderId, EmbeddingProvider};

/// File name inside the index directory
pub const INDEX_FILE: &str = "index.json";

/// Current on-disk format version
pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    version: u32,
    embedder: &'a EmbedderId,
    created_at: DateTime<Utc>,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct PersistedIndex {
    version: u32,
    embedder: EmbedderId,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Write the index to `dir/index.json`, creating `dir` if needed
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let state = PersistedIndexRef {
            version: INDEX_FORMAT_VERSION,
            embedder: self.embedder(),
            created_at: self.created_at(),
            entries: self.entries(),
        };
        let data = serde_json::to_vec(&state)?;

        let path = dir.join(INDEX_FILE);
        let tmp_path = dir.join(format!("{}.tmp", INDEX_FILE));
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        info!("Saved {} entries to {}", self.len(), path.display());
        Ok(path)
    }

    /// Load an index saved by [`VectorIndex::save`]
    ///
    /// The index must have been built by the same embedding function as
    /// `embedder`, otherwise [`Error::EmbedderMismatch`] is returned.
    pub async fn load_existing(
        dir: impl AsRef<Path>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let path = dir.join(INDEX_FILE);

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(&path));
            }
            Err(e) => return Err(e.into()),
        };

        let index = Self::decode(&path, &data)?;

        let active = EmbedderId::of(embedder);
        if index.embedder() != &active {
            return Err(Error::EmbedderMismatch {
                index: index.embedder().to_string(),
                active: active.to_string(),
            });
        }

        info!(
            "Loaded {} entries from {} (built {})",
            index.len(),
            path.display(),
            index.created_at().to_rfc3339()
        );
        Ok(index)
    }

    fn decode(path: &Path, data: &[u8]) -> Result<Self> {
        let persisted: PersistedIndex = serde_json::from_slice(data)
            .map_err(|e| Error::storage(format!("{} is unreadable: {}", path.display(), e)))?;

        if persisted.version != INDEX_FORMAT_VERSION {
            return Err(Error::storage(format!(
                "{} has format version {}, expected {}",
                path.display(),
                persisted.version,
                INDEX_FORMAT_VERSION
            )));
        }

        let dims = persisted.embedder.dimensions;
        if let Some(entry) = persisted.entries.iter().find(|e| e.embedding.len() != dims) {
            return Err(Error::storage(format!(
                "chunk {} has {} dimensions, index declares {}",
                entry.chunk.metadata.chunk_index,
                entry.embedding.len(),
                dims
            )));
        }

        debug!("Decoded index version {}", persisted.version);
        Ok(Self::from_parts(
            persisted.embedder,
            persisted.entries,
            persisted.created_at,
        ))
    }
}
