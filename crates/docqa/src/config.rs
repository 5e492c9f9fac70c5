//! Configuration for the question-answering pipeline
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! then environment variables. [`RagConfig::validate`] runs last.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::DEFAULT_TOP_K;

/// Default phrase the model is told to use when the context lacks the answer
pub const DEFAULT_REFUSAL_PHRASE: &str = "I cannot find this information in the document.";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Completion model configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Index persistence configuration
    #[serde(default)]
    pub index: IndexConfig,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Completion backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Groq's OpenAI-compatible API
    #[default]
    Groq,
    /// Any other OpenAI-compatible chat-completions API
    OpenAi,
    /// Local Ollama server
    Ollama,
    /// Google Generative Language API
    Gemini,
}

impl LlmBackend {
    /// Provider name used in errors and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Gemini => "gemini",
        }
    }

    /// Environment variable holding this backend's credential
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Gemini => Some("GOOGLE_API_KEY"),
            Self::Ollama => None,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.2",
            Self::Gemini => "gemini-1.5-flash",
        }
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "gemini" => Ok(Self::Gemini),
            other => Err(Error::Config(format!("unknown LLM provider '{}'", other))),
        }
    }
}

/// Completion model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider
    pub provider: LlmBackend,
    /// Model name; `None` uses the backend default
    pub model: Option<String>,
    /// API base URL override
    pub base_url: Option<String>,
    /// API credential (never serialized)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature (0 = greedy)
    pub temperature: f32,
    /// Phrase the model must answer with when the context lacks the answer
    pub refusal_phrase: String,
    /// Custom prompt template with `{context}`, `{question}` and optionally
    /// `{refusal_phrase}` placeholders; `None` uses the built-in one
    pub prompt_template: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::Groq,
            model: None,
            base_url: None,
            api_key: None,
            temperature: 0.0,
            refusal_phrase: DEFAULT_REFUSAL_PHRASE.to_string(),
            prompt_template: None,
        }
    }
}

impl LlmConfig {
    /// Effective model name
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Index persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Persist built indexes to `directory`
    pub persist: bool,
    /// Directory for the persisted index
    pub directory: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let directory = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docqa")
            .join("index");

        Self {
            persist: false,
            directory,
        }
    }
}

impl RagConfig {
    /// Load defaults, overlay an optional TOML file and the process environment,
    /// then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file; missing sections fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(path));
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overlay values from an environment lookup function
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DOCQA_EMBED_MODEL") {
            self.embeddings.model = v;
        }
        if let Some(v) = lookup("DOCQA_EMBED_DIMENSIONS") {
            self.embeddings.dimensions = parse_value("DOCQA_EMBED_DIMENSIONS", &v)?;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            self.embeddings.base_url = v;
        }

        if let Some(v) = lookup("DOCQA_LLM_PROVIDER") {
            self.llm.provider = v.parse()?;
        }
        if let Some(v) = lookup("DOCQA_LLM_MODEL") {
            self.llm.model = Some(v);
        }
        if let Some(v) = lookup("DOCQA_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Some(v) = lookup("DOCQA_TEMPERATURE") {
            self.llm.temperature = parse_value("DOCQA_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("DOCQA_REFUSAL_PHRASE") {
            self.llm.refusal_phrase = v;
        }
        if let Some(v) = lookup("DOCQA_PROMPT_TEMPLATE") {
            self.llm.prompt_template = Some(v);
        }
        if let Some(var) = self.llm.provider.api_key_var() {
            if let Some(v) = lookup(var).filter(|v| !v.trim().is_empty()) {
                self.llm.api_key = Some(v);
            }
        }

        if let Some(v) = lookup("DOCQA_CHUNK_SIZE") {
            self.chunking.chunk_size = parse_value("DOCQA_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("DOCQA_CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = parse_value("DOCQA_CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = lookup("DOCQA_TOP_K") {
            self.retrieval.top_k = parse_value("DOCQA_TOP_K", &v)?;
        }
        if let Some(v) = lookup("DOCQA_PERSIST") {
            self.index.persist = parse_bool("DOCQA_PERSIST", &v)?;
        }
        if let Some(v) = lookup("DOCQA_INDEX_DIR") {
            self.index.directory = PathBuf::from(v);
        }

        Ok(())
    }

    /// Check that parameters are consistent
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be greater than zero".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be greater than zero".to_string()));
        }
        if self.llm.refusal_phrase.trim().is_empty() {
            return Err(Error::Config("refusal_phrase must not be empty".to_string()));
        }
        if let Some(template) = &self.llm.prompt_template {
            for required in ["{context}", "{question}"] {
                if !template.contains(required) {
                    return Err(Error::Config(format!(
                        "prompt_template is missing the {} placeholder",
                        required
                    )));
                }
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Config(format!(
                "temperature ({}) must be between 0 and 2",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{} has an invalid value '{}'", key, value))),
    }
}
