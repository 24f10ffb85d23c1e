pub mod history;
pub mod session;
pub mod subjects;
pub mod topics;

use axum::Json;
use serde_json::{Value, json};

pub async fn index() -> Json<Value> {
  Json(json!({
    "message": "Study Sprint Agent API",
    "status": "running",
  }))
}

pub use history::{recommendations, study_history};
pub use session::{complete_session, generate_session};
pub use subjects::{create_subject, get_subject, list_subjects};
pub use topics::{create_topic, list_topics, upload_material};
