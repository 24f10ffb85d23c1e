use axum::{
  Json,
  extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};

use crate::db::{self, try_lock};
use crate::domain::Topic;
use crate::error::{LogOnError, Result, StudyError};
use crate::pdf;
use crate::state::AppState;
use crate::validation::{normalize_description, validate_name, validate_pdf_filename};

#[derive(Debug, Deserialize)]
pub struct TopicCreate {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
  pub message: &'static str,
  pub filename: String,
  pub characters: usize,
}

pub async fn create_topic(
  State(state): State<AppState>,
  Path(subject_id): Path<i64>,
  Json(body): Json<TopicCreate>,
) -> Result<Json<Topic>> {
  let name = validate_name("name", &body.name)?;
  let description = normalize_description(body.description.as_deref());

  let conn = try_lock(&state.pool)?;
  if db::get_subject(&conn, subject_id)?.is_none() {
    return Err(StudyError::not_found("Subject"));
  }
  let topic = db::create_topic(&conn, subject_id, &name, description.as_deref())?;
  tracing::info!(subject_id, topic_id = topic.id, name = %topic.name, "Topic created");
  Ok(Json(topic))
}

/// Unknown subjects simply have no topics
pub async fn list_topics(
  State(state): State<AppState>,
  Path(subject_id): Path<i64>,
) -> Result<Json<Vec<Topic>>> {
  let conn = try_lock(&state.pool)?;
  Ok(Json(db::get_topics_by_subject(&conn, subject_id)?))
}

/// First multipart field named `file`, as (filename, bytes)
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| StudyError::validation(format!("Invalid upload: {}", e)))?
  {
    if field.name() == Some("file") {
      let filename = field.file_name().unwrap_or_default().to_string();
      let bytes = field
        .bytes()
        .await
        .map_err(|e| StudyError::validation(format!("Failed to read upload: {}", e)))?;
      return Ok((filename, bytes.to_vec()));
    }
  }
  Err(StudyError::validation("No file uploaded"))
}

pub async fn upload_material(
  State(state): State<AppState>,
  Path((subject_id, topic_id)): Path<(i64, i64)>,
  mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
  {
    let conn = try_lock(&state.pool)?;
    match db::get_topic(&conn, topic_id)? {
      Some(topic) if topic.subject_id == subject_id => {}
      _ => return Err(StudyError::not_found("Topic")),
    }
  }

  let (filename, bytes) = read_file_field(&mut multipart).await?;
  validate_pdf_filename(&filename)?;

  let size = bytes.len();
  let text = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
    .await
    .log_warn_default("PDF extraction task failed");
  if text.is_empty() {
    return Err(StudyError::Extraction(filename));
  }

  let conn = try_lock(&state.pool)?;
  let saved = db::save_topic_content(&conn, topic_id, &text, &filename)?;
  tracing::info!(
    topic_id,
    filename = %filename,
    bytes = size,
    characters = saved.content.chars().count(),
    "Reference material stored"
  );

  Ok(Json(UploadResponse {
    message: "Material uploaded successfully",
    filename,
    characters: saved.content.chars().count(),
  }))
}
