pub mod session;
pub mod subject;

pub use session::{
  GeneratedSession, HistoryEntry, QuizQuestion, QuizResult, Recommendation, StudySession,
  TopicStatistics,
};
pub use subject::{Subject, Topic, TopicContent};
