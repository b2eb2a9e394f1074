//! Language-model client.
//!
//! The pipeline talks to the model through the [`Summarizer`] trait so the
//! orchestrator can be exercised with canned responses. [`GeminiClient`] is
//! the production implementation, speaking the Generative Language REST API:
//!
//! ```text
//! POST {endpoint}/models/{model}:generateContent
//! x-goog-api-key: <key>
//! { "contents": [...], "generationConfig": { "temperature": .., "responseMimeType": "application/json" } }
//! ```
//!
//! There is no retry here. A quota error surfaces as
//! [`PipelineError::RateLimited`] and the category is skipped until the next
//! scheduled run.

use crate::config::ModelConfig;
use crate::error::PipelineError;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Sends a prompt to a language model and returns its raw text answer.
pub trait Summarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Client for Gemini's `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: ModelConfig,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.config.name)
            .field("endpoint", &self.config.endpoint)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Build a client for the `generateContent` endpoint.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client; its timeout bounds each model call
    /// * `api_key` - Gemini API key, sent in the `x-goog-api-key` header
    /// * `config` - Model name, endpoint and generation settings
    ///
    /// # Returns
    ///
    /// A summarizer ready to use. No request is made until
    /// [`Summarizer::summarize`] is called.
    pub fn new(client: Client, api_key: String, config: ModelConfig) -> Self {
        Self {
            client,
            api_key,
            config,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.name
        )
    }
}

impl Summarizer for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.config.name))]
    async fn summarize(&self, prompt: &str) -> Result<String, PipelineError> {
        let t0 = Instant::now();
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                %status,
                elapsed_ms = dt.as_millis() as u128,
                body = %truncate_for_log(&raw, 300),
                "Model endpoint returned an error"
            );
            return Err(classify_failure(status, &raw));
        }

        let text = extract_text(&raw)?;
        info!(
            elapsed_ms = dt.as_millis() as u128,
            bytes = text.len(),
            "Model call succeeded"
        );
        Ok(text)
    }
}

/// Map a non-success answer to the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> PipelineError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
        PipelineError::RateLimited(format!("HTTP {status}"))
    } else {
        PipelineError::Model(format!("HTTP {status}: {}", truncate_for_log(body, 200)))
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(raw: &str) -> Result<String, PipelineError> {
    let parsed: GenerateResponse = serde_json::from_str(raw)
        .map_err(|e| PipelineError::Model(format!("unreadable response envelope: {e}")))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PipelineError::Model("response contained no text".to_string()));
    }
    Ok(text)
}
