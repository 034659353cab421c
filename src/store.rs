//! JSON file persistence for the current problem set.
//!
//! File layout: `{ "lastUpdate": "YYYY-MM-DD", "problemSet": { ... } }`.
//! Writes go to a sibling temp file that is then renamed over the target.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::domain::ProblemSet;
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProblems {
  pub last_update: NaiveDate,
  pub problem_set: ProblemSet,
}

#[derive(Clone, Debug)]
pub struct ProblemStore {
  path: PathBuf,
}

impl ProblemStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Missing file is `None`. A file that no longer parses is also treated as
  /// absent (logged), so a corrupt blob never blocks the next generation.
  #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
  pub fn load(&self) -> Result<Option<StoredProblems>, StoreError> {
    let text = match std::fs::read_to_string(&self.path) {
      Ok(t) => t,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    match serde_json::from_str::<StoredProblems>(&text) {
      Ok(stored) => Ok(Some(stored)),
      Err(e) => {
        warn!(target: "daily_math", path = %self.path.display(), error = %e, "Stored problem set is unreadable; ignoring it");
        Ok(None)
      }
    }
  }

  #[instrument(level = "info", skip(self, problem_set), fields(path = %self.path.display(), problems = problem_set.len()))]
  pub fn save(&self, problem_set: &ProblemSet, date: NaiveDate) -> Result<(), StoreError> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir)?;
    }
    let stored = StoredProblems { last_update: date, problem_set: problem_set.clone() };
    let body = serde_json::to_string_pretty(&stored)?;

    let tmp = self.path.with_extension("json.tmp");
    std::fs::write(&tmp, body)?;
    std::fs::rename(&tmp, &self.path)?;
    info!(target: "daily_math", %date, "Saved problem set");
    Ok(())
  }
}
