//! Topics and their uploaded reference material

use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use super::{now_timestamp, parse_timestamp};
use crate::domain::{Topic, TopicContent};

const TOPIC_COLUMNS: &str = r#"
  t.id, t.subject_id, t.name, t.description, t.created_at,
  EXISTS (SELECT 1 FROM topic_content tc WHERE tc.topic_id = t.id) AS has_content
"#;

pub fn create_topic(
  conn: &Connection,
  subject_id: i64,
  name: &str,
  description: Option<&str>,
) -> Result<Topic> {
  conn.execute(
    "INSERT INTO topics (subject_id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
    params![subject_id, name, description, now_timestamp()],
  )?;
  let id = conn.last_insert_rowid();
  get_topic(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn get_topic(conn: &Connection, id: i64) -> Result<Option<Topic>> {
  conn
    .query_row(
      &format!("SELECT {} FROM topics t WHERE t.id = ?1", TOPIC_COLUMNS),
      params![id],
      row_to_topic,
    )
    .optional()
}

/// Topics of a subject, newest first
pub fn get_topics_by_subject(conn: &Connection, subject_id: i64) -> Result<Vec<Topic>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM topics t WHERE t.subject_id = ?1 ORDER BY t.created_at DESC, t.id DESC",
    TOPIC_COLUMNS
  ))?;

  let topics = stmt
    .query_map(params![subject_id], row_to_topic)?
    .collect::<Result<Vec<_>>>()?;
  Ok(topics)
}

/// Store extracted text for a topic. Earlier uploads are kept.
pub fn save_topic_content(
  conn: &Connection,
  topic_id: i64,
  content: &str,
  source_file: &str,
) -> Result<TopicContent> {
  let created_at = now_timestamp();
  conn.execute(
    "INSERT INTO topic_content (topic_id, content, source_file, created_at) VALUES (?1, ?2, ?3, ?4)",
    params![topic_id, content, source_file, created_at],
  )?;

  Ok(TopicContent {
    id: conn.last_insert_rowid(),
    topic_id,
    content: content.to_string(),
    source_file: source_file.to_string(),
    created_at: parse_timestamp(4, &created_at)?,
  })
}

/// Most recently uploaded material for a topic
pub fn get_latest_topic_content(conn: &Connection, topic_id: i64) -> Result<Option<TopicContent>> {
  conn
    .query_row(
      r#"
      SELECT id, topic_id, content, source_file, created_at
      FROM topic_content
      WHERE topic_id = ?1
      ORDER BY created_at DESC, id DESC
      LIMIT 1
      "#,
      params![topic_id],
      |row| {
        let created_at: String = row.get(4)?;
        Ok(TopicContent {
          id: row.get(0)?,
          topic_id: row.get(1)?,
          content: row.get(2)?,
          source_file: row.get(3)?,
          created_at: parse_timestamp(4, &created_at)?,
        })
      },
    )
    .optional()
}

fn row_to_topic(row: &Row) -> Result<Topic> {
  let created_at: String = row.get(4)?;
  Ok(Topic {
    id: row.get(0)?,
    subject_id: row.get(1)?,
    name: row.get(2)?,
    description: row.get(3)?,
    created_at: parse_timestamp(4, &created_at)?,
    has_content: row.get(5)?,
  })
}
