//! Gemini client via the Google Generative Language API

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::CompletionProvider;

const PROVIDER: &str = "gemini";

/// Generative Language API base
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key; kept out of the URL so it never shows up in errors
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini completion provider authenticated with an API key
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key.clone(),
            model: config.model_name().to_string(),
            temperature: config.temperature,
        })
    }

    /// Model path segment; accepts both "gemini-pro" and "models/gemini-pro"
    fn model_path(&self) -> &str {
        self.model.trim_start_matches("models/")
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_path())
    }

    fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::generation(PROVIDER, "GOOGLE_API_KEY is not set"))
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.credential()?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                Error::generation(PROVIDER, format!("Gemini request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(
                PROVIDER,
                format!("Gemini generation failed ({}): {}", status, body),
            ));
        }

        let gen_response: GenerateResponse = response.json().await.map_err(|e| {
            Error::generation(PROVIDER, format!("Failed to parse Gemini response: {}", e))
        })?;

        gen_response
            .into_text()
            .ok_or_else(|| Error::generation(PROVIDER, "No text in Gemini response"))
    }

    async fn health_check(&self) -> Result<bool> {
        let Ok(api_key) = self.credential() else {
            return Ok(false);
        };

        match self
            .client
            .get(format!("{}/models/{}", self.base_url, self.model_path()))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}
