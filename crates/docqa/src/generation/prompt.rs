//! Prompt templates for grounded answering

use crate::config::DEFAULT_REFUSAL_PHRASE;
use crate::error::{Error, Result};
use crate::types::RetrievalResult;

/// Default template
///
/// Placeholders: `{context}`, `{question}`, `{refusal_phrase}`.
pub const DEFAULT_TEMPLATE: &str = "Use the following context from a document to answer the question.
If you cannot find the answer in the context, say \"{refusal_phrase}\"

Context:
{context}

Question: {question}

Answer concisely and directly:";

/// Join retrieved chunk texts, in retrieval order, with a blank line between them
pub fn build_context(retrieval: &RetrievalResult) -> String {
    retrieval.texts().join("\n\n")
}

/// Fill a template's placeholders in a single pass
///
/// Placeholder-looking text inside the substituted values is left alone, and
/// unknown `{...}` sequences are copied through unchanged.
pub fn render_prompt(template: &str, context: &str, question: &str, refusal_phrase: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        let value = [
            ("{context}", context),
            ("{question}", question),
            ("{refusal_phrase}", refusal_phrase),
        ]
        .into_iter()
        .find(|(placeholder, _)| tail.starts_with(placeholder));

        match value {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Prompt builder holding the template and refusal phrase
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    refusal_phrase: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_REFUSAL_PHRASE)
    }
}

impl PromptBuilder {
    /// Builder with the default template
    pub fn new(refusal_phrase: impl Into<String>) -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            refusal_phrase: refusal_phrase.into(),
        }
    }

    /// Use a custom template; it must contain `{context}` and `{question}`
    pub fn with_template(mut self, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for required in ["{context}", "{question}"] {
            if !template.contains(required) {
                return Err(Error::Config(format!(
                    "prompt template is missing the {} placeholder",
                    required
                )));
            }
        }
        self.template = template;
        Ok(self)
    }

    /// Phrase the model is told to use when the context lacks the answer
    pub fn refusal_phrase(&self) -> &str {
        &self.refusal_phrase
    }

    /// Build the full prompt for a question and its retrieved chunks
    pub fn build(&self, question: &str, retrieval: &RetrievalResult) -> String {
        render_prompt(
            &self.template,
            &build_context(retrieval),
            question,
            &self.refusal_phrase,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ScoredChunk};

    fn retrieval(texts: &[&str]) -> RetrievalResult {
        RetrievalResult::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| ScoredChunk {
                    chunk: Chunk::from_text(*t, i),
                    distance: i as f32 * 0.1,
                })
                .collect(),
        )
    }

    #[test]
    fn test_context_joined_with_blank_line() {
        assert_eq!(build_context(&retrieval(&["first", "second"])), "first\n\nsecond");
        assert_eq!(build_context(&RetrievalResult::default()), "");
    }

    #[test]
    fn test_default_prompt() {
        let prompt = PromptBuilder::default().build(
            "What is the capital of France?",
            &retrieval(&["Paris is the capital of France."]),
        );

        assert_eq!(
            prompt,
            "Use the following context from a document to answer the question.\n\
             If you cannot find the answer in the context, say \"I cannot find this information in the document.\"\n\
             \n\
             Context:\n\
             Paris is the capital of France.\n\
             \n\
             Question: What is the capital of France?\n\
             \n\
             Answer concisely and directly:"
        );
    }

    #[test]
    fn test_render_is_single_pass() {
        let rendered = render_prompt("C={context} Q={question}", "{question}", "why?", "no");
        assert_eq!(rendered, "C={question} Q=why?");
    }

    #[test]
    fn test_unknown_braces_pass_through() {
        let rendered = render_prompt("{\"json\": {context}} {other}", "x", "q", "r");
        assert_eq!(rendered, "{\"json\": x} {other}");
    }

    #[test]
    fn test_custom_template_requires_placeholders() {
        assert!(PromptBuilder::default().with_template("Answer: {question}").is_err());

        let builder = PromptBuilder::new("Not in the document.")
            .with_template("{context}\n---\n{question}\n(else: {refusal_phrase})")
            .unwrap();
        assert_eq!(
            builder.build("q", &retrieval(&["a", "b"])),
            "a\n\nb\n---\nq\n(else: Not in the document.)"
        );
    }
}
