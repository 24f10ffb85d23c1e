//! Topic priority heuristic used to pick what to study next.
//!
//! Higher score = study sooner. Factors:
//! - Never studied topics jump to the top with a flat score
//! - Days since the last session (capped)
//! - Low average quiz performance
//! - Uploaded reference material (small bonus)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Recommendation, Topic, TopicStatistics};

/// Below this average performance a topic is flagged as weak
const WEAK_PERFORMANCE: f64 = 0.7;

/// Scoring constants, overridable in `config.toml` under `[priority]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
  /// Flat score for a topic without any session
  pub never_studied: f64,
  /// Points per day since the last session
  pub recency_per_day: f64,
  /// Upper bound of the recency term
  pub recency_cap: f64,
  /// Multiplier of (1 - average performance)
  pub performance_weight: f64,
  /// Added when the topic has reference material
  pub content_bonus: f64,
}

impl Default for PriorityWeights {
  fn default() -> Self {
    Self {
      never_studied: 100.0,
      recency_per_day: 5.0,
      recency_cap: 50.0,
      performance_weight: 30.0,
      content_bonus: 10.0,
    }
  }
}

/// Whole days elapsed, never negative (clock skew on stored timestamps)
fn days_since(last: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
  now.signed_duration_since(last).num_days().max(0)
}

pub fn calculate_topic_priority(
  has_content: bool,
  stats: &TopicStatistics,
  now: DateTime<Utc>,
  weights: &PriorityWeights,
) -> f64 {
  let mut priority = 0.0;

  if stats.never_studied() {
    priority += weights.never_studied;
  } else {
    if let Some(last) = stats.last_studied {
      let days = days_since(last, now) as f64;
      priority += (days * weights.recency_per_day).min(weights.recency_cap);
    }

    let performance = stats.avg_performance.unwrap_or(0.0);
    priority += (1.0 - performance) * weights.performance_weight;
  }

  if has_content {
    priority += weights.content_bonus;
  }

  priority
}

/// Human-readable justification shown next to a recommendation
pub fn recommendation_reason(stats: &TopicStatistics, now: DateTime<Utc>) -> String {
  if stats.never_studied() {
    return "Nunca estudiado".to_string();
  }

  let mut reasons = Vec::new();

  if let Some(last) = stats.last_studied {
    let days = days_since(last, now);
    if days > 1 {
      reasons.push(format!("Estudiado hace {} dias", days));
    }
  }

  if let Some(performance) = stats.avg_performance {
    if performance < WEAK_PERFORMANCE {
      reasons.push(format!("Desempeno promedio: {}%", (performance * 100.0).round()));
    }
  }

  if reasons.is_empty() {
    "Listo para repasar".to_string()
  } else {
    reasons.join(", ")
  }
}

/// A topic with its statistics and computed priority
#[derive(Debug, Clone)]
pub struct ScoredTopic {
  pub topic: Topic,
  pub stats: TopicStatistics,
  pub priority: f64,
}

impl ScoredTopic {
  pub fn to_recommendation(&self, now: DateTime<Utc>) -> Recommendation {
    Recommendation {
      topic_id: self.topic.id,
      topic_name: self.topic.name.clone(),
      priority_score: round_to(self.priority, 2),
      times_studied: self.stats.session_count,
      last_studied: self.stats.last_studied,
      average_performance: self.stats.avg_performance.map(|p| round_to(p * 100.0, 1)),
      reason: recommendation_reason(&self.stats, now),
    }
  }
}

fn round_to(value: f64, decimals: i32) -> f64 {
  let factor = 10f64.powi(decimals);
  (value * factor).round() / factor
}

/// Score and sort topics, highest priority first.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_topics(
  topics: Vec<(Topic, TopicStatistics)>,
  now: DateTime<Utc>,
  weights: &PriorityWeights,
) -> Vec<ScoredTopic> {
  let mut scored: Vec<ScoredTopic> = topics
    .into_iter()
    .map(|(topic, stats)| {
      let priority = calculate_topic_priority(topic.has_content, &stats, now, weights);
      ScoredTopic {
        topic,
        stats,
        priority,
      }
    })
    .collect();

  scored.sort_by(|a, b| b.priority.total_cmp(&a.priority));
  scored
}

/// Id of the most urgent topic, None when there are no topics
pub fn select_next_topic(
  topics: Vec<(Topic, TopicStatistics)>,
  now: DateTime<Utc>,
  weights: &PriorityWeights,
) -> Option<i64> {
  rank_topics(topics, now, weights)
    .first()
    .map(|scored| scored.topic.id)
}
