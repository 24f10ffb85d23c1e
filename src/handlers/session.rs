use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DURATION_MINUTES;
use crate::domain::{GeneratedSession, QuizResult};
use crate::error::Result;
use crate::state::AppState;

fn default_duration() -> i64 {
  DEFAULT_DURATION_MINUTES
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
  pub subject_id: i64,
  #[serde(default)]
  pub topic_id: Option<i64>,
  #[serde(default = "default_duration")]
  pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
  pub message: &'static str,
  pub session_id: i64,
}

pub async fn generate_session(
  State(state): State<AppState>,
  Json(request): Json<SessionRequest>,
) -> Result<Json<GeneratedSession>> {
  let session = state
    .agent
    .generate_study_session(request.subject_id, request.topic_id, request.duration)
    .await?;
  Ok(Json(session))
}

pub async fn complete_session(
  State(state): State<AppState>,
  Json(result): Json<QuizResult>,
) -> Result<Json<CompletionResponse>> {
  let session = state.agent.record_completion(result)?;
  Ok(Json(CompletionResponse {
    message: "Session recorded successfully",
    session_id: session.id,
  }))
}
