use std::sync::Arc;

use super::prompts::{self, CONTENT_SYSTEM_PROMPT, QUIZ_SYSTEM_PROMPT};
use super::{CompletionRequest, LlmError, RetryPolicy, TextGenerator, complete_with_retry};
use crate::config::{CONTENT_TEMPERATURE, QUIZ_MAX_TOKENS, QUIZ_TEMPERATURE};
use crate::domain::QuizQuestion;
use crate::text::{
  ParsedContent, clean_latex_formatting, parse_quiz_questions, parse_session_content,
  strip_meta_commentary,
};

/// Writes lessons and quizzes through a `TextGenerator`
#[derive(Clone)]
pub struct ContentService {
  generator: Arc<dyn TextGenerator>,
  model: String,
  retry: RetryPolicy,
}

impl ContentService {
  pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>, retry: RetryPolicy) -> Self {
    Self {
      generator,
      model: model.into(),
      retry,
    }
  }

  /// One content call, then LaTeX cleanup, meta-commentary removal and
  /// section parsing. Parse problems never fail the call.
  pub async fn generate_session_content(
    &self,
    topic_name: &str,
    description: Option<&str>,
    duration_minutes: i64,
    reference: Option<&str>,
  ) -> Result<ParsedContent, LlmError> {
    let target_words = prompts::target_words(duration_minutes);
    let request = CompletionRequest {
      model: self.model.clone(),
      system: CONTENT_SYSTEM_PROMPT.to_string(),
      prompt: prompts::build_content_prompt(topic_name, description, duration_minutes, reference),
      temperature: CONTENT_TEMPERATURE,
      max_tokens: prompts::max_tokens_for(target_words),
    };

    tracing::info!(
      topic = topic_name,
      duration_minutes,
      target_words,
      max_tokens = request.max_tokens,
      has_reference = reference.is_some(),
      "Generating session content"
    );

    let raw = complete_with_retry(self.generator.as_ref(), &request, &self.retry).await?;
    let had_latex = raw.contains('$') || raw.contains('\\');
    tracing::debug!(chars = raw.chars().count(), had_latex, "Raw lesson received");

    let cleaned = strip_meta_commentary(&clean_latex_formatting(&raw));
    Ok(parse_session_content(&cleaned, target_words))
  }

  /// Multiple-choice questions grounded on `content` only
  pub async fn generate_quiz(
    &self,
    topic_name: &str,
    content: &str,
    num_questions: usize,
  ) -> Result<Vec<QuizQuestion>, LlmError> {
    let request = CompletionRequest {
      model: self.model.clone(),
      system: QUIZ_SYSTEM_PROMPT.to_string(),
      prompt: prompts::build_quiz_prompt(topic_name, content, num_questions),
      temperature: QUIZ_TEMPERATURE,
      max_tokens: QUIZ_MAX_TOKENS,
    };

    let raw = complete_with_retry(self.generator.as_ref(), &request, &self.retry).await?;
    let questions = parse_quiz_questions(&raw);
    if questions.len() < num_questions {
      tracing::warn!(
        requested = num_questions,
        parsed = questions.len(),
        "Quiz reply had fewer questions than requested"
      );
    }
    Ok(questions)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::ScriptedGenerator;

  const LESSON: &str = "OBJETIVO:
Entender $A \\cup B$.

CONTENIDO:
La unión $A \\cup B$ contiene los elementos de $A$ o de $B$.
(Conteo de palabras: 12)

CONCEPTOS CLAVE:
- Unión de conjuntos
- Pertenencia
";

  const QUIZ: &str = "PREGUNTA 1:
¿Qué contiene la unión?
A) Solo A
B) Elementos de A o de B
C) Nada
D) Solo B
CORRECTA: B
";

  fn service(generator: Arc<ScriptedGenerator>) -> ContentService {
    ContentService::new(generator, "test-model", RetryPolicy::default())
  }

  #[tokio::test]
  async fn test_session_content_is_cleaned_and_parsed() {
    let generator = Arc::new(ScriptedGenerator::new(vec![LESSON]));
    let parsed = service(generator.clone())
      .generate_session_content("Conjuntos", None, 5, None)
      .await
      .unwrap();

    assert_eq!(parsed.learning_objective, "Entender A ∪ B.");
    assert!(parsed.content.contains("A ∪ B contiene"));
    assert!(!parsed.content.contains("Conteo de palabras"));
    assert_eq!(parsed.key_concepts, vec!["Unión de conjuntos", "Pertenencia"]);

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "test-model");
    assert_eq!(requests[0].temperature, CONTENT_TEMPERATURE);
    assert_eq!(requests[0].max_tokens, 1560);
  }

  #[tokio::test]
  async fn test_quiz_uses_quiz_settings() {
    let generator = Arc::new(ScriptedGenerator::new(vec![QUIZ]));
    let quiz = service(generator.clone())
      .generate_quiz("Conjuntos", "La unión...", 3)
      .await
      .unwrap();

    assert_eq!(quiz.len(), 1);
    assert_eq!(quiz[0].correct_answer, 1);

    let requests = generator.requests();
    assert_eq!(requests[0].max_tokens, QUIZ_MAX_TOKENS);
    assert_eq!(requests[0].temperature, QUIZ_TEMPERATURE);
    assert_eq!(requests[0].system, QUIZ_SYSTEM_PROMPT);
  }

  #[tokio::test]
  async fn test_empty_completion_surfaces_error() {
    let generator = Arc::new(ScriptedGenerator::new(Vec::new()));
    let err = service(generator)
      .generate_quiz("Conjuntos", "x", 3)
      .await
      .unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
  }
}
