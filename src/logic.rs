//! Answer checking shared by the HTTP handlers.

use tracing::{debug, instrument};

use crate::domain::Problem;
use crate::state::AppState;
use crate::util::normalize_answer;

/// Correct when the typed answer equals any accepted answer, ignoring case and spacing.
pub fn is_correct(problem: &Problem, answer: &str) -> bool {
  let typed = normalize_answer(answer);
  !typed.is_empty() && problem.possible_answers.iter().any(|a| normalize_answer(a) == typed)
}

/// `None` when the problem id is unknown.
#[instrument(level = "info", skip(state, answer), fields(%problem_id, answer_len = answer.len()))]
pub fn evaluate_answer(state: &AppState, problem_id: &str, answer: &str) -> Option<bool> {
  let problem = state.get_problem(problem_id)?;
  let correct = is_correct(&problem, answer);
  debug!(target: "daily_math", %problem_id, correct, "Answer evaluated");
  Some(correct)
}
