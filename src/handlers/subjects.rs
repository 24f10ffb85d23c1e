use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;

use crate::db::{self, try_lock};
use crate::domain::Subject;
use crate::error::{Result, StudyError};
use crate::state::AppState;
use crate::validation::{normalize_description, validate_name};

#[derive(Debug, Deserialize)]
pub struct SubjectCreate {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
}

pub async fn create_subject(
  State(state): State<AppState>,
  Json(body): Json<SubjectCreate>,
) -> Result<Json<Subject>> {
  let name = validate_name("name", &body.name)?;
  let description = normalize_description(body.description.as_deref());

  let conn = try_lock(&state.pool)?;
  let subject = db::create_subject(&conn, &name, description.as_deref())?;
  tracing::info!(subject_id = subject.id, name = %subject.name, "Subject created");
  Ok(Json(subject))
}

pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>> {
  let conn = try_lock(&state.pool)?;
  Ok(Json(db::get_all_subjects(&conn)?))
}

pub async fn get_subject(
  State(state): State<AppState>,
  Path(subject_id): Path<i64>,
) -> Result<Json<Subject>> {
  let conn = try_lock(&state.pool)?;
  db::get_subject(&conn, subject_id)?
    .map(Json)
    .ok_or_else(|| StudyError::not_found("Subject"))
}
