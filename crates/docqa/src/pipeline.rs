//! Document session and the end-to-end question-answering pipeline
//!
//! One document is active at a time. Processing a document replaces the
//! previous session entirely; questions are answered against the active
//! session's index only.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{AnswerSynthesizer, PromptBuilder};
use crate::index::{IndexBuilder, VectorIndex};
use crate::ingestion::DocumentLoader;
use crate::providers::{self, CompletionProvider, EmbeddingProvider};
use crate::retrieval::Retriever;
use crate::types::{Answer, RetrievalResult};

/// The processed document questions are answered against
#[derive(Debug, Clone)]
pub struct DocumentSession {
    /// Document the index was built from
    pub source: PathBuf,
    /// Embedded chunks
    pub index: VectorIndex,
    /// Number of chunks in the index
    pub chunk_count: usize,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Where the index was persisted, if it was
    pub persisted_to: Option<PathBuf>,
}

/// Load → index → retrieve → answer, over a single active document
pub struct QaPipeline {
    config: RagConfig,
    loader: DocumentLoader,
    embedder: Arc<dyn EmbeddingProvider>,
    builder: IndexBuilder,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    session: Option<DocumentSession>,
}

impl QaPipeline {
    /// Create a pipeline with explicit providers
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let loader = DocumentLoader::from_config(&config.chunking)?;
        let mut prompts = PromptBuilder::new(config.llm.refusal_phrase.clone());
        if let Some(template) = &config.llm.prompt_template {
            prompts = prompts.with_template(template.clone())?;
        }

        Ok(Self {
            loader,
            builder: IndexBuilder::new(Arc::clone(&embedder)),
            retriever: Retriever::new(Arc::clone(&embedder)),
            synthesizer: AnswerSynthesizer::new(llm, prompts),
            embedder,
            config,
            session: None,
        })
    }

    /// Create a pipeline with the providers named in `config`
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let (embedder, llm) = providers::from_config(&config)?;
        Self::new(config, embedder, llm)
    }

    /// Load, chunk, and index a document, replacing the current session
    ///
    /// The previous session is dropped before work starts, so a failure
    /// leaves no document loaded. With `index.persist` set the index is also
    /// written to `index.directory`.
    pub async fn process_document(&mut self, path: impl AsRef<Path>) -> Result<&DocumentSession> {
        let path = path.as_ref();
        if self.session.take().is_some() {
            info!("Discarding previous document session");
        }

        let chunks = self.loader.load(path).await?;
        let chunk_count = chunks.len();
        let index = self.builder.build(chunks).await?;

        let persisted_to = if self.config.index.persist {
            Some(index.save(&self.config.index.directory).await?)
        } else {
            None
        };

        info!("Document {} ready ({} chunks)", path.display(), chunk_count);

        Ok(&*self.session.insert(DocumentSession {
            source: path.to_path_buf(),
            index,
            chunk_count,
            created_at: Utc::now(),
            persisted_to,
        }))
    }

    /// Install a session from an index persisted in `dir`
    pub async fn open_existing(&mut self, dir: impl AsRef<Path>) -> Result<&DocumentSession> {
        let dir = dir.as_ref();
        self.session = None;

        let index = VectorIndex::load_existing(dir, self.embedder.as_ref()).await?;
        let source = match index.entries().first() {
            Some(entry) if !entry.chunk.metadata.source.is_empty() => {
                PathBuf::from(&entry.chunk.metadata.source)
            }
            _ => {
                warn!("Index in {} does not record its source document", dir.display());
                dir.to_path_buf()
            }
        };

        Ok(&*self.session.insert(DocumentSession {
            source,
            chunk_count: index.len(),
            created_at: index.created_at(),
            persisted_to: Some(dir.join(crate::index::INDEX_FILE)),
            index,
        }))
    }

    /// Answer a question with the configured `top_k`
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        self.ask_with_k(question, self.config.retrieval.top_k).await
    }

    /// Answer a question from the `k` closest chunks
    pub async fn ask_with_k(&self, question: &str, k: usize) -> Result<Answer> {
        let retrieval = self.retrieve(question, k).await?;
        self.synthesizer.answer(question, retrieval).await
    }

    /// Retrieval only, without calling the completion model
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        let session = self.session.as_ref().ok_or(Error::NoDocument)?;
        self.retriever.search(&session.index, question, k).await
    }

    /// The active session, if a document has been processed
    pub fn session(&self) -> Option<&DocumentSession> {
        self.session.as_ref()
    }

    /// Drop the active session
    pub fn clear(&mut self) {
        self.session = None;
    }
}
