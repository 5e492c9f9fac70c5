//! Core types for the pipeline

pub mod document;
pub mod response;

pub use document::{Chunk, ChunkMetadata, FileType, PageText};
pub use response::{Answer, RetrievalResult, ScoredChunk};
