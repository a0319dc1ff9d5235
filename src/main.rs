//! AutoJudge · difficulty dashboard backend
//!
//! - Axum HTTP API (`/api/v1/analyze`, `/api/v1/model`, `/api/v1/health`)
//! - Static dashboard fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   MODEL_DIR             : directory with tfidf/classifier/regressor JSON (default data/processed)
//!   STATIC_DIR            : dashboard files (default static)
//!   AUTOJUDGE_CONFIG_PATH : optional TOML config
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

use std::{net::SocketAddr, process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use autojudge::config::AppConfig;
use autojudge::routes::build_router;
use autojudge::state::AppState;
use autojudge::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
  telemetry::init_tracing();

  let config = AppConfig::from_env();
  let port = config.server.port;

  // Artifacts are required; without them there is nothing to serve.
  let state = match AppState::load(config) {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "autojudge", error = %e, "Startup aborted");
      return ExitCode::FAILURE;
    }
  };

  let app = build_router(state);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  if let Err(e) = serve(addr, app).await {
    error!(target: "autojudge", error = %e, "HTTP server failed");
    return ExitCode::FAILURE;
  }
  ExitCode::SUCCESS
}

async fn serve(addr: SocketAddr, app: axum::Router) -> Result<(), Box<dyn std::error::Error>> {
  let listener = TcpListener::bind(addr).await?;
  info!(target: "autojudge", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "autojudge", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
