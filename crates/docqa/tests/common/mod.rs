//! Deterministic providers shared by the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docqa::config::RagConfig;
use docqa::{CompletionProvider, EmbeddingProvider, Error, Result};

/// Bag-of-words embedder over a fixed vocabulary
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
    model: String,
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self::with_model(vocabulary, "bag-v1")
    }

    pub fn with_model(vocabulary: &[&str], model: &str) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
            model: model.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Vocabulary used by the capital-cities scenarios
    pub fn geography() -> Self {
        Self::new(&["paris", "france", "tokyo", "japan", "capital", "river", "seine"])
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            if let Some(i) = self.vocabulary.iter().position(|w| *w == token) {
                vector[i] += 1.0;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keyword"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Completion fake that follows the prompt's instructions literally
///
/// It answers with the context paragraph that mentions the question's last
/// word, or with the refusal phrase quoted in the prompt when none does.
pub struct GroundedLlm {
    pub calls: AtomicUsize,
}

impl GroundedLlm {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let to = text[from..].find(end)? + from;
    Some(&text[from..to])
}

#[async_trait]
impl CompletionProvider for GroundedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let refusal = between(prompt, "say \"", "\"\n").unwrap_or_default();
        let context = between(prompt, "Context:\n", "\n\nQuestion: ").unwrap_or_default();
        let question = between(prompt, "\n\nQuestion: ", "\n\n").unwrap_or_default();

        let keyword = question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .last()
            .unwrap_or_default()
            .to_lowercase();

        let reply = context
            .split("\n\n")
            .find(|paragraph| paragraph.to_lowercase().contains(&keyword))
            .unwrap_or(refusal);

        Ok(format!("  {}\n", reply))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "grounded"
    }

    fn model(&self) -> &str {
        "grounded-1"
    }
}

/// Completion fake that always fails like a rejected credential
pub struct RejectingLlm;

#[async_trait]
impl CompletionProvider for RejectingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::generation("groq", "API returned 401 Unauthorized: Invalid API Key"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        "llama-3.3-70b-versatile"
    }
}

/// Completion fake that replies with the prompt it was given
pub struct EchoLlm;

#[async_trait]
impl CompletionProvider for EchoLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }
}

/// Config with small chunks and an index directory under `dir`
pub fn test_config(dir: &Path) -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size = 40;
    config.chunking.chunk_overlap = 0;
    config.index.directory = dir.join("index");
    config
}

/// Write a text document and return its path
pub fn write_doc(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write test document");
    path
}

pub const CAPITALS: &str = "Paris is the capital of France.\n\nTokyo is the capital of Japan.";
