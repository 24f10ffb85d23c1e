use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
  pub id: i64,
  pub subject_id: i64,
  pub name: String,
  pub description: Option<String>,
  /// True when at least one reference material record exists for the topic
  pub has_content: bool,
  pub created_at: DateTime<Utc>,
}

/// Extracted text of an uploaded reference file.
///
/// A topic may own several of these; the newest one is the material used
/// when generating sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicContent {
  pub id: i64,
  pub topic_id: i64,
  pub content: String,
  pub source_file: String,
  pub created_at: DateTime<Utc>,
}
