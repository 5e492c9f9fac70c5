//! Document loading: file bytes to tagged chunks

use std::path::Path;

use tracing::{debug, info};

use super::chunker::RecursiveTextSplitter;
use super::parser::FileParser;
use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

/// Loads a document from disk and splits it into chunks
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    splitter: RecursiveTextSplitter,
}

impl DocumentLoader {
    /// Create a loader around an existing splitter
    pub fn new(splitter: RecursiveTextSplitter) -> Self {
        Self { splitter }
    }

    /// Create a loader from chunking configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Ok(Self::new(RecursiveTextSplitter::new(
            config.chunk_size,
            config.chunk_overlap,
        )?))
    }

    /// Load a document and split every page into chunks
    ///
    /// Chunks come back in page order with a document-wide `chunk_index`.
    /// A missing file is [`Error::NotFound`]; unreadable or text-less content
    /// is [`Error::Parse`].
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Vec<Chunk>> {
        let path = path.as_ref();

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(path));
            }
            Err(e) => return Err(Error::parse(path, format!("failed to read file: {}", e))),
        };

        let parsed = FileParser::parse(path, &data)?;
        info!(
            "Parsed {} ({}, {} pages)",
            path.display(),
            parsed.file_type.display_name(),
            parsed.total_pages
        );

        let source = path.display().to_string();
        let chunks = self
            .splitter
            .split_pages(&parsed.pages, &source, parsed.total_pages);

        if chunks.is_empty() {
            return Err(Error::parse(path, "document produced no chunks"));
        }

        debug!(
            "Chunked with size {} / overlap {}",
            self.splitter.chunk_size(),
            self.splitter.chunk_overlap()
        );
        info!("Created {} chunks from {}", chunks.len(), source);

        Ok(chunks)
    }
}
