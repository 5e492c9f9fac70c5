//! OpenAI-compatible chat-completions client (Groq, OpenAI, and compatible servers)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::{LlmBackend, LlmConfig};
use crate::error::{Error, Result};

use super::llm::CompletionProvider;

/// Groq's OpenAI-compatible API
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI API
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions provider with bearer-token auth
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    /// Provider name reported in errors ("groq", "openai")
    provider: String,
    base_url: String,
    api_key: Option<String>,
    /// Variable the credential is read from, for error messages
    api_key_var: Option<&'static str>,
    model: String,
    temperature: f32,
}

impl OpenAiCompatClient {
    /// Create a client for a Groq or OpenAI backend
    ///
    /// A missing credential is not an error here; it surfaces on the first call.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let default_base = match config.provider {
            LlmBackend::OpenAi => OPENAI_BASE_URL,
            _ => GROQ_BASE_URL,
        };
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(default_base)
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            provider: config.provider.name().to_string(),
            base_url,
            api_key: config.api_key.clone(),
            api_key_var: config.provider.api_key_var(),
            model: config.model_name().to_string(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                let var = self.api_key_var.unwrap_or("the API key");
                Error::generation(&self.provider, format!("{} is not set", var))
            })
    }
}

// ── Chat-completions request/response types ────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.credential()?;

        debug!(provider = %self.provider, model = %self.model, prompt_len = prompt.len(), "chat completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(&self.provider, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = %self.provider, %status, "API error");
            return Err(Error::generation(
                &self.provider,
                format!("API returned {status}: {detail}"),
            ));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            Error::generation(&self.provider, format!("failed to parse response: {e}"))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::generation(&self.provider, "response contained no message"))
    }

    async fn health_check(&self) -> Result<bool> {
        let Ok(api_key) = self.credential() else {
            return Ok(false);
        };

        match self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }
}
