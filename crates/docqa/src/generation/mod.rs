//! Answer generation from retrieved context

mod prompt;
mod synthesizer;

pub use prompt::{build_context, render_prompt, PromptBuilder, DEFAULT_TEMPLATE};
pub use synthesizer::AnswerSynthesizer;
