//! docqa: question answering over a single document
//!
//! A document is loaded and split into overlapping chunks, the chunks are
//! embedded into a vector index, and questions are answered by retrieving the
//! closest chunks and asking a language model to answer from them alone.
//! Every answer carries the chunks it was grounded on.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{AnswerSynthesizer, PromptBuilder};
pub use index::{IndexBuilder, VectorIndex};
pub use ingestion::DocumentLoader;
pub use pipeline::{DocumentSession, QaPipeline};
pub use providers::{CompletionProvider, EmbedderId, EmbeddingProvider};
pub use retrieval::Retriever;
pub use types::{
    document::{Chunk, ChunkMetadata},
    response::{Answer, RetrievalResult, ScoredChunk},
};
