//! Generation client: the `TextGenerator` seam and its Gemini implementation.
//!
//! We only call `models/{model}:generateContent` and ask for plain text; the
//! extractor deals with whatever shape comes back.
//! Calls log model name, latency, token usage and response size (not contents).
//!
//! NOTE: the API key travels in a header and is never logged.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::error::GatewayError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Prompt in, raw text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// Model identifier, for logs and health.
  fn model(&self) -> &str;

  /// Any failure, including blank output, is `GenerationUnavailable`.
  async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
}

impl Gemini {
  /// Construct the client if the config carries an API key; otherwise None.
  pub fn from_config(cfg: &AppConfig) -> Option<Self> {
    let api_key = cfg.api_key.clone()?;
    let client = reqwest::Client::builder()
      .timeout(cfg.timeout)
      .connect_timeout(cfg.timeout.min(Duration::from_secs(10)))
      .build()
      .map_err(|e| tracing::error!(target: "pae_quiz_backend", error = %e, "Failed to build HTTP client for Gemini"))
      .ok()?;

    Some(Self {
      client,
      api_key,
      base_url: cfg.base_url.clone(),
      model: cfg.model.clone(),
      temperature: cfg.temperature,
    })
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.base_url, self.model)
  }
}

#[async_trait]
impl TextGenerator for Gemini {
  fn model(&self) -> &str {
    &self.model
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
      generation_config: GenerationConfig { temperature: self.temperature },
    };

    let start = Instant::now();
    let res = self.client.post(self.endpoint())
      .header(USER_AGENT, "pae-quiz-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req).send().await
      .map_err(|e| GatewayError::GenerationUnavailable(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(GatewayError::GenerationUnavailable(format!("Gemini HTTP {}: {}", status, msg)));
    }

    let body: GenerateContentResponse = res.json().await
      .map_err(|e| GatewayError::GenerationUnavailable(format!("response decode: {e}")))?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, completion_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }

    let text = candidate_text(&body);
    info!(elapsed = ?start.elapsed(), text_len = text.len(), "Gemini response received");
    if text.trim().is_empty() {
      return Err(GatewayError::GenerationUnavailable("empty model output".into()));
    }
    Ok(text)
  }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(body: &GenerateContentResponse) -> String {
  body.candidates.first()
    .and_then(|c| c.content.as_ref())
    .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<Vec<_>>().join(""))
    .unwrap_or_default()
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  generation_config: GenerationConfig,
}
#[derive(Serialize)]
struct Content { parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }
#[derive(Serialize)]
struct GenerationConfig { temperature: f32 }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate { #[serde(default)] content: Option<CandidateContent> }
#[derive(Deserialize)]
struct CandidateContent { #[serde(default)] parts: Vec<CandidatePart> }
#[derive(Deserialize)]
struct CandidatePart { #[serde(default)] text: Option<String> }
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Google API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
