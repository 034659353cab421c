//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{info, instrument};

use crate::logic::evaluate_answer;
use crate::protocol::*;
use crate::state::AppState;

fn not_found(msg: String) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: msg })).into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_problems(State(state): State<Arc<AppState>>) -> Response {
  match state.current() {
    Some(stored) => {
      info!(target: "daily_math", last_update = %stored.last_update, "HTTP problem set served");
      Json(stored).into_response()
    }
    None => not_found("No problem set has been generated yet.".into()),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_problem(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  match state.get_problem(&id) {
    Some(p) => Json(p).into_response(),
    None => not_found(format!("Unknown problemId: {id}")),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(State(state): State<Arc<AppState>>, Json(body): Json<AnswerIn>) -> Response {
  match evaluate_answer(&state, &body.problem_id, &body.answer) {
    Some(correct) => {
      info!(target: "daily_math", id = %body.problem_id, %correct, "HTTP answer evaluated");
      Json(AnswerOut { correct }).into_response()
    }
    None => not_found(format!("Unknown problemId: {}", body.problem_id)),
  }
}
