//! Minimal OpenAI-compatible chat client used as the problem generator.
//!
//! We only call chat.completions and request a JSON object back.
//! Calls are instrumented and log model name, latency and response size (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{GenerationError, PipelineError};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// External text generator. Returns the raw completion text, which is expected
/// to contain a JSON object (possibly fenced).
#[async_trait]
pub trait Generator: Send + Sync {
  async fn generate(&self, system: &str, prompt: &str, temperature: f32) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client from env. A missing OPENAI_API_KEY is fatal for generation.
  /// The per-call deadline is enforced by the retry loop, not by reqwest.
  pub fn from_env() -> Result<Self, PipelineError> {
    let api_key = std::env::var(API_KEY_VAR)
      .ok()
      .filter(|k| !k.trim().is_empty())
      .ok_or(PipelineError::MissingCredential(API_KEY_VAR))?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    Ok(Self { client: reqwest::Client::new(), api_key, base_url, model })
  }
}

#[async_trait]
impl Generator for OpenAI {
  #[instrument(level = "info", skip(self, system, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn generate(&self, system: &str, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: prompt.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "daily-math-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(GenerationError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();

    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
    if text.trim().is_empty() {
      return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
