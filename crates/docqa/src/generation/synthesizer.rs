//! Grounded answer synthesis

use std::sync::Arc;

use tracing::{debug, info};

use super::prompt::PromptBuilder;
use crate::error::{Error, Result};
use crate::providers::llm::generation_failure;
use crate::providers::CompletionProvider;
use crate::types::{Answer, RetrievalResult};

/// Turns a question and its retrieved chunks into an [`Answer`]
pub struct AnswerSynthesizer {
    llm: Arc<dyn CompletionProvider>,
    prompts: PromptBuilder,
}

impl AnswerSynthesizer {
    /// Create a synthesizer
    pub fn new(llm: Arc<dyn CompletionProvider>, prompts: PromptBuilder) -> Self {
        Self { llm, prompts }
    }

    /// Answer `question` from `retrieval` alone
    ///
    /// With nothing retrieved the refusal phrase is returned without calling
    /// the model.
    pub async fn answer(&self, question: &str, retrieval: RetrievalResult) -> Result<Answer> {
        if retrieval.is_empty() {
            info!("No context retrieved, answering with the refusal phrase");
            return Ok(Answer {
                text: self.prompts.refusal_phrase().to_string(),
                supporting_chunks: retrieval,
            });
        }

        let prompt = self.prompts.build(question, &retrieval);
        debug!(
            "Prompt for {}/{}: {} chars from {} chunks",
            self.llm.name(),
            self.llm.model(),
            prompt.len(),
            retrieval.len()
        );

        let reply = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| generation_failure(self.llm.name(), e))?;

        let text = reply.trim();
        if text.is_empty() {
            return Err(Error::generation(
                self.llm.name(),
                "model returned an empty response",
            ));
        }

        info!("Generated answer ({} chars)", text.chars().count());
        Ok(Answer {
            text: text.to_string(),
            supporting_chunks: retrieval,
        })
    }
}
