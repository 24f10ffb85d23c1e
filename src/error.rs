//! Error taxonomy shared by the store, the agent and the HTTP layer.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::DbLockError;
use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum StudyError {
  /// Referenced subject or topic does not exist
  #[error("{0} not found")]
  NotFound(String),

  /// Malformed input, rejected before any LLM call
  #[error("{0}")]
  Validation(String),

  /// LLM call failed after exhausting retries
  #[error("Session generation failed: {0}")]
  Generation(#[source] LlmError),

  /// Uploaded file had no extractable text
  #[error("Could not extract text from {0}")]
  Extraction(String),

  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error(transparent)]
  Lock(#[from] DbLockError),
}

pub type Result<T> = std::result::Result<T, StudyError>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return the default
  fn log_warn_default(self, context: &str) -> T
  where
    T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn_default(self, context: &str) -> T
  where
    T: Default,
  {
    match self {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        T::default()
      }
    }
  }
}

impl StudyError {
  pub fn not_found(what: impl Into<String>) -> Self {
    Self::NotFound(what.into())
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn status_code(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Generation(_) => StatusCode::BAD_GATEWAY,
      Self::Extraction(_) => StatusCode::BAD_REQUEST,
      Self::Database(_) | Self::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for StudyError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    } else {
      tracing::debug!(error = %self, "request rejected");
    }
    (status, Json(json!({ "detail": self.to_string() }))).into_response()
  }
}
