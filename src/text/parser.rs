//! Section extraction from semi-structured LLM replies.
//!
//! Parsing is lenient on purpose: a missing section yields an empty string
//! or list and never aborts session generation. Headers may carry markdown
//! decoration (`##`, `**`) since models add it unprompted.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::QuizQuestion;

static OBJECTIVE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)OBJETIVO(?:[ \t]+DE[ \t]+APRENDIZAJE)?[:*\s]*").expect("valid regex")
});
static OBJECTIVE_END: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\n[\s#*]*CONTENIDO(?:[ \t]+PRINCIPAL)?(?:[:*\s]|$)").expect("valid regex")
});
static ANY_SECTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)CONTENIDO|CONCEPTOS").expect("valid regex"));

static CONTENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?im)^[ \t#*]*CONTENIDO(?:[ \t]+PRINCIPAL)?[:* \t]*\n").expect("valid regex")
});
// Line-initial header with a colon, so "contenido" in prose never matches
static CONTENT_HEADER_INLINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?im)^[ \t#*]*CONTENIDO(?:[ \t]+PRINCIPAL)?[ \t*]*:[ \t*]*").expect("valid regex")
});
static CONCEPTS_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\n[\s#*]*CONCEPTOS?\s*CLAVES?(?:[:*\s]|$)").expect("valid regex")
});

static CONCEPTS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?im)^[ \t#*]*CONCEPTOS[ \t]*CLAVES?[:*\s]*").expect("valid regex")
});
static CONCEPTS_END: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\n\s*VERIFICACIÓN").expect("valid regex"));
static CONCEPT_MARKER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[-•*–◦\d).\s]+").expect("valid regex"));

const BULLETS: [char; 5] = ['-', '•', '*', '–', '◦'];

/// Concepts this short (in characters) are noise like "A" or "-".
const MIN_CONCEPT_CHARS: usize = 4;

/// The three sections of a generated lesson
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContent {
  pub learning_objective: String,
  pub content: String,
  pub key_concepts: Vec<String>,
}

impl ParsedContent {
  pub fn word_count(&self) -> usize {
    word_count(&self.content)
  }
}

/// Whitespace-delimited token count
pub fn word_count(text: &str) -> usize {
  text.split_whitespace().count()
}

/// Split a lesson reply into objective, body and key concepts.
///
/// `target_words` only feeds the diagnostic log line; short content is
/// reported, never rejected.
pub fn parse_session_content(raw: &str, target_words: usize) -> ParsedContent {
  let text = raw.trim();

  let parsed = ParsedContent {
    learning_objective: extract_objective(text),
    content: extract_content(text),
    key_concepts: extract_key_concepts(text),
  };

  log_report(text, &parsed, target_words);
  parsed
}

fn extract_objective(text: &str) -> String {
  let Some(header) = OBJECTIVE_HEADER.find(text) else {
    return String::new();
  };
  let rest = &text[header.end()..];

  if let Some(end) = OBJECTIVE_END.find(rest) {
    if end.start() > 0 {
      return rest[..end.start()].trim().to_string();
    }
  }

  let end = ANY_SECTION.find(rest).map_or(rest.len(), |m| m.start());
  rest[..end].trim().to_string()
}

fn extract_content(text: &str) -> String {
  if let Some(header) = CONTENT_HEADER.find(text) {
    let rest = &text[header.end()..];
    let end = CONCEPTS_BOUNDARY.find(rest).map_or(rest.len(), |m| m.start());
    return rest[..end].trim().to_string();
  }

  // Header sharing its line with the body: take everything to the end and
  // cut a trailing concepts section off explicitly.
  let Some(header) = CONTENT_HEADER_INLINE.find(text) else {
    return String::new();
  };
  let rest = &text[header.end()..];
  CONCEPTS_BOUNDARY
    .split(rest)
    .next()
    .unwrap_or_default()
    .trim()
    .to_string()
}

fn extract_key_concepts(text: &str) -> Vec<String> {
  let Some(header) = CONCEPTS_HEADER.find(text) else {
    return Vec::new();
  };
  let rest = &text[header.end()..];
  let end = CONCEPTS_END.find(rest).map_or(rest.len(), |m| m.start());

  rest[..end]
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.to_lowercase().contains("verificación"))
    .filter(|line| is_list_item(line))
    .map(|line| CONCEPT_MARKER.replace(line, "").trim().to_string())
    .filter(|concept| concept.chars().count() >= MIN_CONCEPT_CHARS)
    .collect()
}

/// Bullet glyph, or a `1)`-style number within the first three characters
fn is_list_item(line: &str) -> bool {
  if line.starts_with(BULLETS) {
    return true;
  }
  line.chars().next().is_some_and(|c| c.is_ascii_digit())
    && line.chars().take(3).any(|c| c == ')')
}

fn log_report(text: &str, parsed: &ParsedContent, target_words: usize) {
  let words = parsed.word_count();

  tracing::debug!(
    raw_chars = text.chars().count(),
    objective_chars = parsed.learning_objective.chars().count(),
    content_chars = parsed.content.chars().count(),
    key_concepts = parsed.key_concepts.len(),
    "Parsed session content"
  );

  if target_words == 0 {
    tracing::info!("Content has {} words (no target)", words);
    return;
  }

  let achievement = words as f64 / target_words as f64 * 100.0;
  if achievement >= 90.0 {
    tracing::info!(
      "Content has {} words, {:.1}% of the {} word target",
      words,
      achievement,
      target_words
    );
  } else {
    tracing::warn!(
      "Content has {} words, only {:.1}% of the {} word target",
      words,
      achievement,
      target_words
    );
  }
}

/// Parse a quiz reply made of `PREGUNTA` blocks.
///
/// Incomplete questions (no text or no options) are dropped, including a
/// trailing one cut off mid-reply.
pub fn parse_quiz_questions(raw: &str) -> Vec<QuizQuestion> {
  let mut questions = Vec::new();
  let mut builder = QuestionBuilder::default();

  for line in raw.trim().lines().map(str::trim) {
    if line.starts_with("PREGUNTA") {
      builder.finish_into(&mut questions);
    } else if let Some(option) = option_text(line) {
      builder.options.push(option.to_string());
    } else if let Some(letter) = line.strip_prefix("CORRECTA:") {
      builder.correct_answer = answer_index(letter).unwrap_or(0);
    } else if builder.question.is_none() && !line.is_empty() {
      builder.question = Some(line.to_string());
    }
  }
  builder.finish_into(&mut questions);

  questions
}

#[derive(Default)]
struct QuestionBuilder {
  question: Option<String>,
  options: Vec<String>,
  correct_answer: usize,
}

impl QuestionBuilder {
  fn finish_into(&mut self, questions: &mut Vec<QuizQuestion>) {
    let builder = std::mem::take(self);
    if let Some(question) = builder.question {
      // The answer must point at a parsed option
      if builder.correct_answer < builder.options.len() {
        questions.push(QuizQuestion {
          question,
          options: builder.options,
          correct_answer: builder.correct_answer,
        });
      }
    }
  }
}

fn option_text(line: &str) -> Option<&str> {
  ["A)", "B)", "C)", "D)"]
    .iter()
    .find_map(|prefix| line.strip_prefix(prefix))
    .map(str::trim)
}

fn answer_index(letter: &str) -> Option<usize> {
  match letter.trim().chars().next()?.to_ascii_uppercase() {
    'A' => Some(0),
    'B' => Some(1),
    'C' => Some(2),
    'D' => Some(3),
    _ => None,
  }
}
