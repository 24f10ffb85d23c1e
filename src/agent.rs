//! Study agent: picks what to study, has the LLM write the session and
//! records how it went.

use chrono::Utc;
use rusqlite::Connection;

use crate::config::QUIZ_QUESTION_COUNT;
use crate::db::{self, DbPool, try_lock};
use crate::domain::{GeneratedSession, QuizResult, Recommendation, StudySession, Topic, TopicStatistics};
use crate::error::{Result, StudyError};
use crate::llm::ContentService;
use crate::planner::{self, PriorityWeights};
use crate::validation::{validate_duration, validate_quiz_result};

pub struct StudyAgent {
  pool: DbPool,
  content: ContentService,
  weights: PriorityWeights,
}

/// Every topic of a subject paired with its statistics, store order kept
fn topics_with_stats(conn: &Connection, subject_id: i64) -> Result<Vec<(Topic, TopicStatistics)>> {
  db::get_topics_by_subject(conn, subject_id)?
    .into_iter()
    .map(|topic| -> Result<(Topic, TopicStatistics)> {
      let stats = db::get_topic_statistics(conn, topic.id)?;
      Ok((topic, stats))
    })
    .collect()
}

/// Load a topic, rejecting one that belongs to another subject
fn topic_in_subject(conn: &Connection, subject_id: i64, topic_id: i64) -> Result<Topic> {
  let topic = db::get_topic(conn, topic_id)?.ok_or_else(|| StudyError::not_found("Topic"))?;
  if topic.subject_id != subject_id {
    return Err(StudyError::validation(format!(
      "Topic {} does not belong to subject {}",
      topic_id, subject_id
    )));
  }
  Ok(topic)
}

impl StudyAgent {
  pub fn new(pool: DbPool, content: ContentService, weights: PriorityWeights) -> Self {
    Self {
      pool,
      content,
      weights,
    }
  }

  /// Build a lesson and quiz for `topic_id`, or for the most urgent topic
  /// of the subject when none is given. Nothing is persisted.
  pub async fn generate_study_session(
    &self,
    subject_id: i64,
    topic_id: Option<i64>,
    duration: i64,
  ) -> Result<GeneratedSession> {
    validate_duration(duration)?;

    let topic_id = match topic_id {
      Some(id) => id,
      None => self
        .select_next_topic(subject_id)?
        .ok_or_else(|| StudyError::not_found("Topics for this subject"))?,
    };

    // Guard scope ends before the first await
    let (topic, reference) = {
      let conn = try_lock(&self.pool)?;
      let topic = topic_in_subject(&conn, subject_id, topic_id)?;
      let reference = db::get_latest_topic_content(&conn, topic.id)?.map(|c| c.content);
      (topic, reference)
    };

    tracing::info!(
      topic_id = topic.id,
      topic = %topic.name,
      duration,
      reference_chars = reference.as_deref().map_or(0, |r| r.chars().count()),
      "Generating study session"
    );

    let lesson = self
      .content
      .generate_session_content(
        &topic.name,
        topic.description.as_deref(),
        duration,
        reference.as_deref(),
      )
      .await
      .map_err(StudyError::Generation)?;

    let quiz = self
      .content
      .generate_quiz(&topic.name, &lesson.content, QUIZ_QUESTION_COUNT)
      .await
      .map_err(StudyError::Generation)?;

    tracing::info!(
      topic_id = topic.id,
      words = lesson.word_count(),
      key_concepts = lesson.key_concepts.len(),
      questions = quiz.len(),
      "Study session ready"
    );

    Ok(GeneratedSession {
      topic_id: topic.id,
      topic_name: topic.name,
      duration,
      learning_objective: lesson.learning_objective,
      content: lesson.content,
      key_concepts: lesson.key_concepts,
      quiz,
    })
  }

  /// Most urgent topic of a subject, None when it has no topics
  pub fn select_next_topic(&self, subject_id: i64) -> Result<Option<i64>> {
    let conn = try_lock(&self.pool)?;
    if db::get_subject(&conn, subject_id)?.is_none() {
      return Err(StudyError::not_found("Subject"));
    }
    let candidates = topics_with_stats(&conn, subject_id)?;
    Ok(planner::select_next_topic(candidates, Utc::now(), &self.weights))
  }

  /// Top `limit` topics by priority with the reason for each
  pub fn recommend_next_topics(&self, subject_id: i64, limit: usize) -> Result<Vec<Recommendation>> {
    let conn = try_lock(&self.pool)?;
    let candidates = topics_with_stats(&conn, subject_id)?;
    drop(conn);

    let now = Utc::now();
    Ok(
      planner::rank_topics(candidates, now, &self.weights)
        .iter()
        .take(limit)
        .map(|scored| scored.to_recommendation(now))
        .collect(),
    )
  }

  /// Append a finished session; the topic must exist
  pub fn record_completion(&self, result: QuizResult) -> Result<StudySession> {
    validate_quiz_result(&result)?;

    let conn = try_lock(&self.pool)?;
    if db::get_topic(&conn, result.topic_id)?.is_none() {
      return Err(StudyError::not_found("Topic"));
    }
    let session = db::record_session_completion(&conn, &result)?;

    tracing::info!(
      topic_id = result.topic_id,
      score = result.score,
      total = result.total_questions,
      "Study session recorded"
    );
    Ok(session)
  }
}
