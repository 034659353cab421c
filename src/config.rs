//! Loading pipeline configuration (prompts, retry policy, storage) from TOML.
//!
//! Every section is optional; anything missing falls back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
  pub generator: GeneratorSettings,
  pub retry: RetrySettings,
  pub storage: StorageSettings,
  pub prompts: Prompts,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
  pub temperature: f32,
  /// How many of yesterday's topics are spelled out in the prompt.
  pub banned_topics_limit: usize,
}

impl Default for GeneratorSettings {
  fn default() -> Self {
    Self { temperature: 0.8, banned_topics_limit: 15 }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
  pub max_attempts: u32,
  pub base_delay_ms: u64,
  pub delay_cap_ms: u64,
  pub call_timeout_secs: u64,
}

impl Default for RetrySettings {
  fn default() -> Self {
    Self { max_attempts: 5, base_delay_ms: 1_000, delay_cap_ms: 30_000, call_timeout_secs: 120 }
  }
}

impl RetrySettings {
  pub fn base_delay(&self) -> Duration { Duration::from_millis(self.base_delay_ms) }
  pub fn delay_cap(&self) -> Duration { Duration::from_millis(self.delay_cap_ms) }
  pub fn call_timeout(&self) -> Duration { Duration::from_secs(self.call_timeout_secs) }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
  pub data_file: PathBuf,
}

impl Default for StorageSettings {
  fn default() -> Self {
    Self { data_file: PathBuf::from("data/problems.json") }
  }
}

/// Prompts sent to the generator. `{themes}` and `{banned_topics}` are filled per run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  pub user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: "You are an enthusiastic Mathematics Professor for CIE A-Level Mathematics (9709) and Further Mathematics (9231). Respond ONLY with strict JSON.".into(),
      user_template: r#"Create a daily challenge set of 12 problems (4 Categories x 3 Difficulties).

### CATEGORIES & THEMES:
{themes}

### AVOID REPETITION:
Do NOT generate questions exactly matching these recent topics: {banned_topics}.

### DATA STRUCTURE (JSON ONLY):
Return a single object. Keys are the exact Category Names above. Inside each, keys are "Easy", "Medium", "Hard".

Each Problem Object must have:
- "problemLatex": the question string.
- "possibleAnswers": ARRAY of STRINGS with ALL valid ways a student could type the answer.
  Example if answer is 1/2: ["1/2", "0.5", "50%", "1 over 2", "0.50"]
- "fullSolutionLatex": step-by-step solution.
- "hintsLatex": array of 3 strings.
- "topicsCovered": array of strings (the specific theme used).
- "funFact": one interesting sentence about the concept or its real-world use.

### DIFFICULTY GUIDE:
- Easy: direct application of a formula.
- Medium: 2-3 steps or combining two concepts.
- Hard: word problem, real-world scenario, or a trick / obscure identity.

### FORMATTING RULES:
Output JSON only, no prose and no markdown fences.
ALWAYS use double backslashes (\\) for LaTeX commands so the JSON stays valid."#.into(),
    }
  }
}

impl AppConfig {
  /// Load from PIPELINE_CONFIG_PATH when set; IO or parse errors fall back to defaults.
  /// DATA_FILE overrides the storage path either way.
  pub fn from_env() -> Self {
    let mut cfg = match std::env::var("PIPELINE_CONFIG_PATH") {
      Ok(path) => Self::from_file(&path).unwrap_or_default(),
      Err(_) => Self::default(),
    };
    if let Ok(file) = std::env::var("DATA_FILE") {
      cfg.storage.data_file = PathBuf::from(file);
    }
    cfg
  }

  fn from_file(path: &str) -> Option<Self> {
    match std::fs::read_to_string(path) {
      Ok(s) => match toml::from_str::<AppConfig>(&s) {
        Ok(cfg) => {
          info!(target: "daily_math", %path, "Loaded pipeline config (TOML)");
          Some(cfg)
        }
        Err(e) => {
          error!(target: "daily_math", %path, error = %e, "Failed to parse TOML config");
          None
        }
      },
      Err(e) => {
        error!(target: "daily_math", %path, error = %e, "Failed to read TOML config file");
        None
      }
    }
  }
}
