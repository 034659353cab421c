//! Application state for serve mode.
//!
//! The daily run rewrites the store out-of-process, so handlers read it per
//! request instead of caching a copy.

use tracing::{error, instrument};

use crate::config::AppConfig;
use crate::domain::Problem;
use crate::store::{ProblemStore, StoredProblems};

#[derive(Clone)]
pub struct AppState {
  pub store: ProblemStore,
}

impl AppState {
  pub fn new(cfg: &AppConfig) -> Self {
    Self { store: ProblemStore::new(cfg.storage.data_file.clone()) }
  }

  /// Current stored set; storage errors are logged and reported as absence.
  #[instrument(level = "debug", skip(self))]
  pub fn current(&self) -> Option<StoredProblems> {
    self.store.load().unwrap_or_else(|e| {
      error!(target: "daily_math", error = %e, "Failed to read problem store");
      None
    })
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  pub fn get_problem(&self, id: &str) -> Option<Problem> {
    self.current()?.problem_set.find(id).cloned()
  }
}
