//! Completion-model connectivity probe
//!
//! Tries candidate models in order with a trivial prompt and stops at the
//! first one that answers.

use tracing::{info, warn};

use crate::config::LlmBackend;
use crate::error::Result;

use super::llm::CompletionProvider;

/// Prompt sent to each candidate
pub const PROBE_PROMPT: &str = "Say hi";

/// Outcome of one candidate
#[derive(Debug)]
pub struct ProbeAttempt {
    /// Model name as given
    pub model: String,
    /// Model reply, or why it failed
    pub outcome: Result<String>,
}

/// All attempts made, in order
#[derive(Debug, Default)]
pub struct ProbeReport {
    pub attempts: Vec<ProbeAttempt>,
}

impl ProbeReport {
    /// First model that answered
    pub fn working_model(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.outcome.is_ok())
            .map(|a| a.model.as_str())
    }
}

/// Candidate model names worth trying for a backend
pub fn default_candidates(backend: LlmBackend) -> Vec<String> {
    let names: &[&str] = match backend {
        LlmBackend::Gemini => &[
            "models/gemini-1.5-flash",
            "gemini-1.5-flash",
            "models/gemini-1.5-pro",
            "gemini-1.5-pro",
            "models/gemini-pro",
            "gemini-pro",
        ],
        LlmBackend::Groq => &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"],
        LlmBackend::OpenAi => &["gpt-4o-mini", "gpt-4o"],
        LlmBackend::Ollama => &["llama3.2", "llama3.1", "mistral"],
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// Probe `candidates` in order, building each provider with `factory`
///
/// Stops after the first success; construction failures count as failed attempts.
pub async fn probe_models<F>(candidates: &[String], mut factory: F) -> ProbeReport
where
    F: FnMut(&str) -> Result<Box<dyn CompletionProvider>>,
{
    let mut report = ProbeReport::default();

    for model in candidates {
        info!("Testing: {}", model);

        let outcome = match factory(model) {
            Ok(provider) => provider.complete(PROBE_PROMPT).await,
            Err(e) => Err(e),
        };

        let succeeded = outcome.is_ok();
        match &outcome {
            Ok(reply) => info!("Model {} answered: {}", model, reply.trim()),
            Err(e) => warn!("Model {} failed: {}", model, e),
        }

        report.attempts.push(ProbeAttempt {
            model: model.clone(),
            outcome,
        });

        if succeeded {
            break;
        }
    }

    report
}
