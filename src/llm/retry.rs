use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use std::time::Duration;

use super::{CompletionRequest, LlmError, TextGenerator};

/// Bounded exponential backoff around a single completion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts, the first call included
  pub max_attempts: usize,
  pub min_delay: Duration,
  pub max_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      min_delay: Duration::from_secs(2),
      max_delay: Duration::from_secs(10),
    }
  }
}

/// `[llm]` retry keys as written in config.toml
#[derive(Debug, Default, Deserialize)]
pub struct RetryConfig {
  pub max_attempts: Option<usize>,
  pub min_delay_secs: Option<u64>,
  pub max_delay_secs: Option<u64>,
}

impl RetryPolicy {
  pub fn from_config(config: &RetryConfig) -> Self {
    let defaults = Self::default();
    let min_delay = config
      .min_delay_secs
      .map(Duration::from_secs)
      .unwrap_or(defaults.min_delay);
    let max_delay = config
      .max_delay_secs
      .map(Duration::from_secs)
      .unwrap_or(defaults.max_delay)
      .max(min_delay);

    Self {
      max_attempts: config.max_attempts.unwrap_or(defaults.max_attempts).max(1),
      min_delay,
      max_delay,
    }
  }

  fn backoff(&self) -> ExponentialBuilder {
    ExponentialBuilder::default()
      .with_min_delay(self.min_delay)
      .with_max_delay(self.max_delay)
      .with_max_times(self.max_attempts.saturating_sub(1))
  }
}

/// Run one completion, retrying transient failures per `policy`.
///
/// The last error is returned once attempts are exhausted.
pub async fn complete_with_retry(
  generator: &dyn TextGenerator,
  request: &CompletionRequest,
  policy: &RetryPolicy,
) -> Result<String, LlmError> {
  (|| async { generator.complete(request).await })
    .retry(&policy.backoff())
    .when(LlmError::is_retryable)
    .notify(|err: &LlmError, delay: Duration| {
      tracing::warn!(
        error = %err,
        delay_ms = delay.as_millis() as u64,
        "LLM call failed, retrying"
      );
    })
    .await
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// Replays canned outcomes in order and counts calls
  struct Flaky {
    outcomes: Mutex<Vec<Result<String, LlmError>>>,
    calls: AtomicUsize,
  }

  impl Flaky {
    fn new(mut outcomes: Vec<Result<String, LlmError>>) -> Self {
      outcomes.reverse();
      Self {
        outcomes: Mutex::new(outcomes),
        calls: AtomicUsize::new(0),
      }
    }
  }

  #[async_trait]
  impl TextGenerator for Flaky {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self
        .outcomes
        .lock()
        .unwrap()
        .pop()
        .unwrap_or(Err(LlmError::EmptyResponse))
    }
  }

  fn unavailable() -> LlmError {
    LlmError::Api {
      status: 503,
      body: "unavailable".to_string(),
    }
  }

  fn fast_policy() -> RetryPolicy {
    RetryPolicy {
      max_attempts: 3,
      min_delay: Duration::from_millis(1),
      max_delay: Duration::from_millis(2),
    }
  }

  fn request() -> CompletionRequest {
    CompletionRequest {
      model: "test".into(),
      system: String::new(),
      prompt: "hi".into(),
      temperature: 0.0,
      max_tokens: 10,
    }
  }

  #[tokio::test]
  async fn test_succeeds_after_transient_failures() {
    let generator = Flaky::new(vec![Err(unavailable()), Err(unavailable()), Ok("done".into())]);
    let text = complete_with_retry(&generator, &request(), &fast_policy())
      .await
      .unwrap();
    assert_eq!(text, "done");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_gives_up_after_max_attempts() {
    let generator = Flaky::new(vec![
      Err(unavailable()),
      Err(unavailable()),
      Err(unavailable()),
      Ok("too late".into()),
    ]);
    let err = complete_with_retry(&generator, &request(), &fast_policy())
      .await
      .unwrap_err();
    assert!(matches!(err, LlmError::Api { status: 503, .. }));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_success_is_not_repeated() {
    let generator = Flaky::new(vec![Ok("first".into()), Ok("second".into())]);
    let text = complete_with_retry(&generator, &request(), &fast_policy())
      .await
      .unwrap();
    assert_eq!(text, "first");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_empty_response_not_retried() {
    let generator = Flaky::new(vec![Err(LlmError::EmptyResponse), Ok("unused".into())]);
    let err = complete_with_retry(&generator, &request(), &fast_policy())
      .await
      .unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_policy_from_config() {
    let policy = RetryPolicy::from_config(&RetryConfig {
      max_attempts: Some(0),
      min_delay_secs: Some(5),
      max_delay_secs: Some(1),
    });
    assert_eq!(policy.max_attempts, 1);
    assert_eq!(policy.min_delay, Duration::from_secs(5));
    assert_eq!(policy.max_delay, Duration::from_secs(5));

    assert_eq!(RetryPolicy::from_config(&RetryConfig::default()), RetryPolicy::default());
  }
}
