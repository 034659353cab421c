//! Generation client: builds the prompt from the generation context, calls the
//! generator under a per-call deadline, and retries with capped exponential backoff.
//!
//! Every failure of a single attempt (transport, HTTP status, timeout, payload that
//! is not a JSON object) is absorbed here. Only exhaustion leaves this module.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{GeneratorSettings, Prompts, RetrySettings};
use crate::context::GenerationContext;
use crate::domain::Category;
use crate::error::{GenerationError, PipelineError};
use crate::openai::Generator;
use crate::themes::themes_for;
use crate::util::{fill_template, strip_code_fences, trunc_for_log};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub base_delay: Duration,
  pub delay_cap: Duration,
  pub call_timeout: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::from(&RetrySettings::default())
  }
}

impl From<&RetrySettings> for RetryPolicy {
  fn from(s: &RetrySettings) -> Self {
    Self {
      max_attempts: s.max_attempts.max(1),
      base_delay: s.base_delay(),
      delay_cap: s.delay_cap(),
      call_timeout: s.call_timeout(),
    }
  }
}

impl RetryPolicy {
  /// Wait after failed attempt number `attempt` (1-based): `min(2^attempt * base, cap)`.
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    self.base_delay.checked_mul(factor).unwrap_or(self.delay_cap).min(self.delay_cap)
  }
}

/// Render the user prompt: per-category theme choices and a bounded ban list.
pub fn build_prompt(prompts: &Prompts, ctx: &GenerationContext, banned_limit: usize) -> String {
  let themes = Category::ALL
    .iter()
    .enumerate()
    .map(|(i, &c)| format!("{}. {}: Choose from [{}]", i + 1, c.name(), themes_for(c).join(", ")))
    .collect::<Vec<_>>()
    .join("\n");

  let banned: Vec<&String> = ctx.banned_topics.iter().take(banned_limit).collect();
  let banned = serde_json::to_string(&banned).unwrap_or_else(|_| "[]".into());

  fill_template(&prompts.user_template, &[("themes", &themes), ("banned_topics", &banned)])
}

/// Strip fences and parse; anything but a JSON object is a malformed payload.
/// Text that does not parse is retried once as the span from the first `{`
/// to the last `}`, which recovers objects wrapped in prose.
pub fn parse_payload(text: &str) -> Result<Map<String, Value>, GenerationError> {
  let cleaned = strip_code_fences(text);
  match serde_json::from_str::<Value>(&cleaned) {
    Ok(Value::Object(map)) => Ok(map),
    Ok(other) => Err(GenerationError::Malformed(format!("expected a JSON object, got {}", kind_of(&other)))),
    Err(e) => braced_object(&cleaned).ok_or_else(|| GenerationError::Malformed(format!("JSON parse error: {e}"))),
  }
}

fn braced_object(text: &str) -> Option<Map<String, Value>> {
  let (start, end) = (text.find('{')?, text.rfind('}')?);
  if end <= start {
    return None;
  }
  match serde_json::from_str::<Value>(&text[start..=end]).ok()? {
    Value::Object(map) => {
      debug!(target: "generation", skipped = text.len() - (end - start + 1), "Recovered JSON object from surrounding text");
      Some(map)
    }
    _ => None,
  }
}

fn kind_of(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

pub struct GenerationClient {
  generator: Arc<dyn Generator>,
  prompts: Prompts,
  settings: GeneratorSettings,
  policy: RetryPolicy,
}

impl GenerationClient {
  pub fn new(generator: Arc<dyn Generator>, prompts: Prompts, settings: GeneratorSettings, policy: RetryPolicy) -> Self {
    Self { generator, prompts, settings, policy }
  }

  /// One bounded call: deadline, then fence-stripping and JSON parsing.
  async fn attempt(&self, prompt: &str) -> Result<Map<String, Value>, GenerationError> {
    let call = self.generator.generate(&self.prompts.system, prompt, self.settings.temperature);
    let text = tokio::time::timeout(self.policy.call_timeout, call)
      .await
      .map_err(|_| GenerationError::Timeout(self.policy.call_timeout))??;
    debug!(target: "generation", preview = %trunc_for_log(&text, 120), "Raw completion");
    parse_payload(&text)
  }

  /// Produce raw candidate data, or a terminal failure once every attempt is spent.
  #[instrument(level = "info", skip_all, fields(max_attempts = self.policy.max_attempts, banned = ctx.banned_topics.len()))]
  pub async fn generate(&self, ctx: &GenerationContext) -> Result<Map<String, Value>, PipelineError> {
    let prompt = build_prompt(&self.prompts, ctx, self.settings.banned_topics_limit);
    let max = self.policy.max_attempts;

    for attempt in 1..max {
      match self.attempt(&prompt).await {
        Ok(raw) => return Ok(succeeded(attempt, raw)),
        Err(err) => {
          let delay = self.policy.backoff(attempt);
          warn!(target: "generation", attempt, max, error = %err, ?delay, "Generation attempt failed; backing off");
          tokio::time::sleep(delay).await;
        }
      }
    }

    match self.attempt(&prompt).await {
      Ok(raw) => Ok(succeeded(max, raw)),
      Err(last) => {
        error!(target: "generation", attempts = max, error = %last, "Generation attempts exhausted");
        Err(PipelineError::AttemptsExhausted { attempts: max, last })
      }
    }
  }
}

fn succeeded(attempt: u32, raw: Map<String, Value>) -> Map<String, Value> {
  info!(target: "generation", attempt, keys = raw.len(), "Generation attempt succeeded");
  raw
}
