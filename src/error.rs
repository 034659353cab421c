//! Error types for one generator call, one pipeline run, and the problem store.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single generator attempt. Every variant is retryable.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("Generator HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("Generator call timed out after {0:?}")]
  Timeout(Duration),

  #[error("Generator returned an empty completion")]
  EmptyResponse,

  #[error("Malformed generator payload: {0}")]
  Malformed(String),
}

impl From<reqwest::Error> for GenerationError {
  fn from(err: reqwest::Error) -> Self {
    GenerationError::Request(err.to_string())
  }
}

/// Terminal outcome of a run that produced no new problem set.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Missing credential: {0} is not set")]
  MissingCredential(&'static str),

  #[error("Generation failed after {attempts} attempts: {last}")]
  AttemptsExhausted { attempts: u32, last: GenerationError },

  #[error("Storage error: {0}")]
  Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Storage I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Storage JSON error: {0}")]
  Json(#[from] serde_json::Error),
}
