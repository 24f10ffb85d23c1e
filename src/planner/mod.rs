pub mod priority;

pub use priority::{
  PriorityWeights, ScoredTopic, calculate_topic_priority, rank_topics, recommendation_reason,
  select_next_topic,
};
