use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;

use crate::config::RECOMMENDATION_LIMIT;
use crate::db::{self, try_lock};
use crate::domain::{HistoryEntry, Recommendation};
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
  pub recommendations: Vec<Recommendation>,
}

/// Completed sessions of a subject, newest first
pub async fn study_history(
  State(state): State<AppState>,
  Path(subject_id): Path<i64>,
) -> Result<Json<Vec<HistoryEntry>>> {
  let conn = try_lock(&state.pool)?;
  Ok(Json(db::get_study_history(&conn, subject_id)?))
}

pub async fn recommendations(
  State(state): State<AppState>,
  Path(subject_id): Path<i64>,
) -> Result<Json<RecommendationsResponse>> {
  let recommendations = state
    .agent
    .recommend_next_topics(subject_id, RECOMMENDATION_LIMIT)?;
  Ok(Json(RecommendationsResponse { recommendations }))
}
