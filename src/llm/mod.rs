//! LLM text generation: the `TextGenerator` seam, its OpenAI-compatible
//! implementation, retry policy, prompts and the lesson/quiz service.

pub mod openai;
pub mod prompts;
pub mod retry;
pub mod service;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiClient;
pub use retry::{RetryPolicy, complete_with_retry};
pub use service::ContentService;

/// One chat completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  pub model: String,
  pub system: String,
  pub prompt: String,
  pub temperature: f32,
  pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum LlmError {
  #[error("OPENAI_API_KEY is not configured")]
  MissingApiKey,

  #[error("LLM request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("LLM service returned HTTP {status}: {body}")]
  Api { status: u16, body: String },

  #[error("LLM service returned an empty completion")]
  EmptyResponse,
}

impl LlmError {
  /// Transport and API-status failures are transient; a reply that arrived
  /// is never retried, whatever its content.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::Transport(_) | Self::Api { .. })
  }
}

/// Anything that turns a prompt into raw text
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
