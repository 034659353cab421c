//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,generation=debug,daily_math=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Two targets are used across the crate: `daily_math` for process lifecycle,
//! storage and serving, `generation` for prompting, attempts and normalization.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,generation=debug,daily_math=debug,tower_http=info,axum=info";

pub fn init_tracing() {
  let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  // The daily run is usually scheduled by cron/CI, where JSON is easier to ship.
  match std::env::var("LOG_FORMAT").as_deref() {
    Ok("json") => builder.json().init(),
    _ => builder.init(),
  }
}
