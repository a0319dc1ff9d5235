//! HTTP endpoint handlers. These are thin wrappers that forward to the analyzer.
//! Each handler is instrumented and logs basic request and result info.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{error, info, instrument, warn};

use crate::error::AnalyzeError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(ModelInfoOut::from(state.analyzer.bundle()))
}

#[instrument(level = "info", skip(state, body), fields(desc_len = body.description.len(), in_len = body.input_description.len(), out_len = body.output_description.len()))]
pub async fn http_post_analyze(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnalyzeIn>,
) -> Response {
  match state.analyzer.analyze(&body.into()) {
    Ok(analysis) => {
      let out = AnalyzeOut::from(analysis);
      info!(target: "analyze", label = %out.label, score = %out.score_text, "HTTP analyze served");
      Json(out).into_response()
    }
    Err(e @ AnalyzeError::EmptyDescription) => {
      warn!(target: "analyze", "HTTP analyze rejected: empty description");
      (StatusCode::UNPROCESSABLE_ENTITY, Json(WarningOut { warning: e.to_string() })).into_response()
    }
    Err(e) => {
      error!(target: "analyze", error = %e, "HTTP analyze failed");
      (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: e.to_string() })).into_response()
    }
  }
}
