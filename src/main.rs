//! Daily Math · problem generation backend
//!
//! Modes (first CLI argument):
//!   generate (default) : once-per-day run that generates and stores a new problem set
//!   serve              : Axum HTTP API over the stored set (problems + answer checking)
//!
//! Important env variables:
//!   OPENAI_API_KEY       : required for `generate`
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_MODEL         : default "gpt-4o"
//!   PIPELINE_CONFIG_PATH : path to TOML config (prompts, retry policy, storage)
//!   DATA_FILE            : overrides the stored problem set path
//!   PORT                 : u16 (default 3000), `serve` only
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod config;
mod context;
mod domain;
mod error;
mod generation;
mod logic;
mod normalize;
mod openai;
mod pipeline;
mod protocol;
mod routes;
mod state;
mod store;
mod telemetry;
mod themes;
mod util;

use std::{net::SocketAddr, sync::Arc};

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::generation::{GenerationClient, RetryPolicy};
use crate::openai::OpenAI;
use crate::pipeline::{run_daily, Pipeline, RunOutcome};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::ProblemStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();
  let cfg = AppConfig::from_env();

  match std::env::args().nth(1).as_deref() {
    None | Some("generate") => generate(cfg).await,
    Some("serve") => serve(cfg).await,
    Some(other) => Err(format!("unknown mode '{other}' (expected 'generate' or 'serve')").into()),
  }
}

async fn generate(cfg: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
  let today = Utc::now().date_naive();
  let store = ProblemStore::new(cfg.storage.data_file.clone());
  info!(target: "daily_math", %today, path = %store.path().display(), "Starting daily problem generation");

  let make_pipeline = || -> Result<Pipeline, PipelineError> {
    let openai = OpenAI::from_env()?;
    info!(target: "daily_math", base_url = %openai.base_url, model = %openai.model, "Generator configured");
    let client = GenerationClient::new(
      Arc::new(openai),
      cfg.prompts.clone(),
      cfg.generator.clone(),
      RetryPolicy::from(&cfg.retry),
    );
    Ok(Pipeline::new(client))
  };

  match run_daily(&store, today, make_pipeline).await {
    Ok(RunOutcome::AlreadyCurrent) => Ok(()),
    Ok(RunOutcome::Generated(set)) => {
      info!(target: "daily_math", problems = set.len(), "Daily problems generated successfully");
      Ok(())
    }
    Err(e) => {
      error!(target: "daily_math", error = %e, "Failed to generate new problem set");
      Err(e.into())
    }
  }
}

async fn serve(cfg: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
  let state = Arc::new(AppState::new(&cfg));
  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "daily_math", %addr, data_file = %cfg.storage.data_file.display(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "daily_math", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
