use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionRequest, LlmError, TextGenerator};

/// Client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
  http: reqwest::Client,
  base_url: String,
  api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 2],
  temperature: f32,
  max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
  content: Option<String>,
}

impl OpenAiClient {
  pub fn new(
    base_url: impl Into<String>,
    api_key: Option<String>,
    timeout: Duration,
  ) -> Result<Self, LlmError> {
    let api_key = api_key
      .filter(|key| !key.trim().is_empty())
      .ok_or(LlmError::MissingApiKey)?;
    let http = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Self {
      http,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key,
    })
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.base_url)
  }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
  async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
    let body = ChatRequest {
      model: &request.model,
      messages: [
        ChatMessage {
          role: "system",
          content: &request.system,
        },
        ChatMessage {
          role: "user",
          content: &request.prompt,
        },
      ],
      temperature: request.temperature,
      max_tokens: request.max_tokens,
    };

    let response = self
      .http
      .post(self.endpoint())
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(LlmError::Api {
        status: status.as_u16(),
        body,
      });
    }

    let completion: ChatResponse = response.json().await?;
    let text = completion
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .filter(|content| !content.trim().is_empty())
      .ok_or(LlmError::EmptyResponse)?;

    tracing::debug!(
      model = %request.model,
      chars = text.chars().count(),
      "Received completion"
    );
    Ok(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Matcher;
  use serde_json::json;

  fn request() -> CompletionRequest {
    CompletionRequest {
      model: "gpt-4o-mini".to_string(),
      system: "Eres un asistente".to_string(),
      prompt: "Hola".to_string(),
      temperature: 0.7,
      max_tokens: 100,
    }
  }

  fn client(url: String) -> OpenAiClient {
    OpenAiClient::new(url, Some("test-key".to_string()), Duration::from_secs(5)).unwrap()
  }

  #[test]
  fn test_missing_api_key() {
    let err = OpenAiClient::new("http://localhost", None, Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey));

    let err =
      OpenAiClient::new("http://localhost", Some("  ".into()), Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey));
  }

  #[tokio::test]
  async fn test_completion_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/chat/completions")
      .match_header("authorization", "Bearer test-key")
      .match_body(Matcher::PartialJson(json!({
        "model": "gpt-4o-mini",
        "max_tokens": 100,
        "messages": [
          {"role": "system", "content": "Eres un asistente"},
          {"role": "user", "content": "Hola"}
        ]
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"OBJETIVO:\nX"}}]}"#)
      .create_async()
      .await;

    let text = client(server.url()).complete(&request()).await.unwrap();
    assert_eq!(text, "OBJETIVO:\nX");
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_trailing_slash_in_base_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/chat/completions")
      .with_status(200)
      .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
      .create_async()
      .await;

    let text = client(format!("{}/", server.url())).complete(&request()).await.unwrap();
    assert_eq!(text, "ok");
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_api_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/chat/completions")
      .with_status(429)
      .with_body("rate limited")
      .create_async()
      .await;

    let err = client(server.url()).complete(&request()).await.unwrap_err();
    match err {
      LlmError::Api { status, body } => {
        assert_eq!(status, 429);
        assert_eq!(body, "rate limited");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn test_empty_choices() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/chat/completions")
      .with_status(200)
      .with_body(r#"{"choices":[]}"#)
      .create_async()
      .await;

    let err = client(server.url()).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
  }
}
