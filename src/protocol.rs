//! HTTP request/response DTOs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  #[serde(rename = "problemId")]
  pub problem_id: String,
  pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
  pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub error: String,
}
