//! Error types for the question-answering pipeline

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Input file or index directory does not exist
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Document could not be parsed
    #[error("Failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Embedding capability failed
    #[error("Embedding error ({provider}): {message}")]
    Embedding { provider: String, message: String },

    /// Search against an index that holds no chunks
    #[error("The index holds no chunks")]
    EmptyIndex,

    /// Completion capability failed
    #[error("Generation error ({provider}): {message}")]
    Generation { provider: String, message: String },

    /// Index was built with a different embedding function than the active one
    #[error("Index was built with embedder '{index}' but the active embedder is '{active}'")]
    EmbedderMismatch { index: String, active: String },

    /// A question was asked before any document was processed
    #[error("No document has been processed yet")]
    NoDocument,

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted index is unreadable
    #[error("Index storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not-found error
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::NotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a parse error
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Embedding {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a generation error
    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Short remediation hint for the end user, if one applies
    pub fn remediation(&self) -> Option<String> {
        match self {
            Error::NotFound { .. } => Some("Check the path and try again.".to_string()),
            Error::Parse { .. } => Some(
                "Make sure the file is a text-based PDF, .txt or .md document (scanned PDFs need OCR first)."
                    .to_string(),
            ),
            Error::Embedding { provider, .. } if provider == "ollama" => Some(
                "Make sure Ollama is running (`ollama serve`) and the embedding model is pulled (`ollama pull nomic-embed-text`)."
                    .to_string(),
            ),
            Error::Embedding { .. } => {
                Some("Check the embedding service configuration.".to_string())
            }
            Error::EmptyIndex | Error::NoDocument => {
                Some("Process a document before asking questions.".to_string())
            }
            Error::Generation { provider, .. } => Some(match provider.as_str() {
                "groq" => "Make sure you've added GROQ_API_KEY to your .env file!".to_string(),
                "openai" => "Make sure you've added OPENAI_API_KEY to your .env file!".to_string(),
                "gemini" => "Make sure you've added GOOGLE_API_KEY to your .env file!".to_string(),
                "ollama" => "Make sure Ollama is running (`ollama serve`) and the model is pulled.".to_string(),
                _ => "Check your credential configuration.".to_string(),
            }),
            Error::EmbedderMismatch { .. } => Some(
                "Re-process the document with the current embedding model, or switch back to the model the index was built with."
                    .to_string(),
            ),
            Error::Storage(_) => {
                Some("Delete the index directory and process the document again.".to_string())
            }
            Error::Config(_) => Some("Check your configuration file and environment.".to_string()),
            Error::InvalidInput(_) | Error::Io(_) | Error::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_hint_names_credential() {
        let err = Error::generation("groq", "HTTP 401 Unauthorized");
        let hint = err.remediation().unwrap();
        assert!(hint.contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("data/missing.pdf");
        assert_eq!(err.to_string(), "Not found: data/missing.pdf");
    }

    #[test]
    fn test_invalid_input_has_no_hint() {
        assert!(Error::InvalidInput("k must be at least 1".into())
            .remediation()
            .is_none());
    }
}
