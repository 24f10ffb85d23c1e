//! Input checks run before anything touches the store or the LLM.

use crate::config::{MAX_DURATION_MINUTES, MAX_NAME_CHARS, MIN_DURATION_MINUTES};
use crate::domain::QuizResult;
use crate::error::{Result, StudyError};

/// Trimmed name of 1..=MAX_NAME_CHARS characters
pub fn validate_name(field: &str, value: &str) -> Result<String> {
  let name = value.trim();
  let chars = name.chars().count();
  if chars == 0 {
    return Err(StudyError::validation(format!("{} must not be empty", field)));
  }
  if chars > MAX_NAME_CHARS {
    return Err(StudyError::validation(format!(
      "{} must be at most {} characters",
      field, MAX_NAME_CHARS
    )));
  }
  Ok(name.to_string())
}

/// Blank descriptions are stored as NULL
pub fn normalize_description(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|d| !d.is_empty())
    .map(String::from)
}

pub fn validate_duration(minutes: i64) -> Result<()> {
  if (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
    Ok(())
  } else {
    Err(StudyError::validation(format!(
      "Duration must be between {} and {} minutes, got {}",
      MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, minutes
    )))
  }
}

pub fn validate_quiz_result(result: &QuizResult) -> Result<()> {
  if result.total_questions < 1 {
    return Err(StudyError::validation("total_questions must be at least 1"));
  }
  if !(0..=result.total_questions).contains(&result.score) {
    return Err(StudyError::validation(format!(
      "score must be between 0 and {}",
      result.total_questions
    )));
  }
  if result.duration < 1 {
    return Err(StudyError::validation("duration must be positive"));
  }
  Ok(())
}

/// Only `.pdf` uploads are accepted, case-insensitively
pub fn validate_pdf_filename(filename: &str) -> Result<()> {
  if filename.to_ascii_lowercase().ends_with(".pdf") {
    Ok(())
  } else {
    Err(StudyError::validation("Only PDF files are supported"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn result(score: i64, total_questions: i64) -> QuizResult {
    QuizResult {
      topic_id: 1,
      duration: 10,
      score,
      total_questions,
    }
  }

  #[test]
  fn test_name_is_trimmed() {
    assert_eq!(validate_name("name", "  Algebra  ").unwrap(), "Algebra");
  }

  #[test]
  fn test_name_bounds() {
    assert!(validate_name("name", "   ").is_err());
    assert!(validate_name("name", &"á".repeat(100)).is_ok());
    let err = validate_name("name", &"a".repeat(101)).unwrap_err();
    assert!(err.to_string().contains("at most 100"));
  }

  #[test]
  fn test_description_normalization() {
    assert_eq!(normalize_description(Some("  ")), None);
    assert_eq!(normalize_description(None), None);
    assert_eq!(normalize_description(Some(" x ")).as_deref(), Some("x"));
  }

  #[test]
  fn test_duration_range() {
    assert!(validate_duration(4).is_err());
    assert!(validate_duration(5).is_ok());
    assert!(validate_duration(15).is_ok());
    assert!(validate_duration(30).is_ok());
    assert!(validate_duration(31).is_err());
  }

  #[test]
  fn test_quiz_result() {
    assert!(validate_quiz_result(&result(0, 3)).is_ok());
    assert!(validate_quiz_result(&result(3, 3)).is_ok());
    assert!(validate_quiz_result(&result(4, 3)).is_err());
    assert!(validate_quiz_result(&result(-1, 3)).is_err());
    assert!(validate_quiz_result(&result(0, 0)).is_err());
  }

  #[test]
  fn test_pdf_filename() {
    assert!(validate_pdf_filename("notes.PDF").is_ok());
    assert!(validate_pdf_filename("notes.txt").is_err());
    assert!(validate_pdf_filename("pdf").is_err());
  }
}
