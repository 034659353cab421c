//! The daily generation run: context extraction -> generation client -> normalizer,
//! plus the once-per-day driver around the problem store.

use chrono::{NaiveDate, SecondsFormat, Utc};
use tracing::{info, instrument};

use crate::context::GenerationContext;
use crate::domain::ProblemSet;
use crate::error::PipelineError;
use crate::generation::GenerationClient;
use crate::normalize::normalize;
use crate::store::ProblemStore;

pub struct Pipeline {
  client: GenerationClient,
}

impl Pipeline {
  pub fn new(client: GenerationClient) -> Self {
    Self { client }
  }

  /// Produce a brand-new set from the (borrowed, unmodified) previous one.
  #[instrument(level = "info", skip_all, fields(has_previous = previous.is_some()))]
  pub async fn run(&self, previous: Option<&ProblemSet>) -> Result<ProblemSet, PipelineError> {
    let ctx = GenerationContext::from_previous(previous);
    let raw = self.client.generate(&ctx).await?;

    let mut last_indices = ctx.last_indices;
    let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    Ok(normalize(&raw, &mut last_indices, &date))
  }
}

#[derive(Debug)]
pub enum RunOutcome {
  /// The stored set is already dated today; nothing was generated.
  AlreadyCurrent,
  Generated(ProblemSet),
}

/// Once-per-day driver. The pipeline is only built (and its credential checked)
/// when a new set is actually needed; failures leave the stored set untouched.
#[instrument(level = "info", skip(store, make_pipeline), fields(path = %store.path().display()))]
pub async fn run_daily<F>(store: &ProblemStore, today: NaiveDate, make_pipeline: F) -> Result<RunOutcome, PipelineError>
where
  F: FnOnce() -> Result<Pipeline, PipelineError>,
{
  let stored = store.load()?;
  match &stored {
    Some(s) => info!(target: "daily_math", last_update = %s.last_update, "Found stored problem set"),
    None => info!(target: "daily_math", "No stored problem set; starting fresh"),
  }

  if stored.as_ref().is_some_and(|s| s.last_update == today) {
    info!(target: "daily_math", %today, "Problems already updated for today");
    return Ok(RunOutcome::AlreadyCurrent);
  }

  let pipeline = make_pipeline()?;
  let set = pipeline.run(stored.as_ref().map(|s| &s.problem_set)).await?;
  store.save(&set, today)?;

  info!(target: "daily_math", problems = set.len(), categories = set.0.len(), "Daily problems generated");
  Ok(RunOutcome::Generated(set))
}
