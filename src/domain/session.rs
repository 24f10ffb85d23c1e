use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed study session. History is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
  pub id: i64,
  pub topic_id: i64,
  /// Minutes
  pub duration: i64,
  pub score: i64,
  pub total_questions: i64,
  pub completed_at: DateTime<Utc>,
}

impl StudySession {
  pub fn performance(&self) -> f64 {
    if self.total_questions > 0 {
      self.score as f64 / self.total_questions as f64
    } else {
      0.0
    }
  }
}

/// History listing row: a session joined with its topic and subject names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
  #[serde(flatten)]
  pub session: StudySession,
  pub topic_name: String,
  pub subject_name: String,
}

/// Quiz outcome reported by the client when a session is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
  pub topic_id: i64,
  pub duration: i64,
  pub score: i64,
  pub total_questions: i64,
}

/// Aggregates over a topic's session history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicStatistics {
  pub session_count: i64,
  pub last_studied: Option<DateTime<Utc>>,
  /// Mean of the per-session score/total ratios, in [0, 1]
  pub avg_performance: Option<f64>,
}

impl TopicStatistics {
  pub fn never_studied(&self) -> bool {
    self.session_count == 0
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  /// Index into `options`, 0..=3
  pub correct_answer: usize,
}

/// A freshly generated study unit. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSession {
  pub topic_id: i64,
  pub topic_name: String,
  pub duration: i64,
  pub learning_objective: String,
  pub content: String,
  pub key_concepts: Vec<String>,
  pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
  pub topic_id: i64,
  pub topic_name: String,
  pub priority_score: f64,
  pub times_studied: i64,
  pub last_studied: Option<DateTime<Utc>>,
  /// Percentage with one decimal, None when never studied
  pub average_performance: Option<f64>,
  pub reason: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn session(score: i64, total_questions: i64) -> StudySession {
    StudySession {
      id: 1,
      topic_id: 1,
      duration: 10,
      score,
      total_questions,
      completed_at: Utc::now(),
    }
  }

  #[test]
  fn test_performance_ratio() {
    assert!((session(2, 4).performance() - 0.5).abs() < f64::EPSILON);
    assert!((session(3, 3).performance() - 1.0).abs() < f64::EPSILON);
  }

  #[test]
  fn test_performance_without_questions() {
    assert_eq!(session(0, 0).performance(), 0.0);
  }

  #[test]
  fn test_history_entry_flattens_session() {
    let entry = HistoryEntry {
      session: session(1, 3),
      topic_name: "Sets".to_string(),
      subject_name: "Discrete math".to_string(),
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["score"], 1);
    assert_eq!(json["total_questions"], 3);
    assert_eq!(json["topic_name"], "Sets");
  }

  #[test]
  fn test_default_statistics_never_studied() {
    let stats = TopicStatistics::default();
    assert!(stats.never_studied());
    assert_eq!(stats.last_studied, None);
  }
}
