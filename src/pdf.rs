//! Text extraction from uploaded PDF files.

use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::error::LogOnError;

static EXTRA_NEWLINES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static EXTRA_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));
static CONTROL_CHARS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f]").expect("valid regex"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s+([.,;:!?])").expect("valid regex"));

#[derive(Debug, Error)]
enum PdfError {
  #[error("{0}")]
  Parse(String),

  #[error("PDF parser panicked")]
  Panicked,
}

fn try_extract(bytes: &[u8]) -> Result<String, PdfError> {
  // Malformed files can panic inside the parser
  panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
    .map_err(|_| PdfError::Panicked)?
    .map_err(|e| PdfError::Parse(e.to_string()))
}

/// Extract and clean all text of a PDF.
///
/// Returns an empty string when the file cannot be read; callers treat
/// empty text as an extraction failure. Blocking, run it off the runtime.
pub fn extract_text(bytes: &[u8]) -> String {
  let raw = try_extract(bytes).log_warn_default("Error extracting text from PDF");
  let text = clean_text(&raw);
  tracing::debug!(bytes = bytes.len(), chars = text.chars().count(), "PDF text extracted");
  text
}

/// Normalize whitespace, control characters and Unicode composition
pub fn clean_text(text: &str) -> String {
  let text = EXTRA_NEWLINES.replace_all(text, "\n\n");
  let text = EXTRA_SPACES.replace_all(&text, " ");
  let text = CONTROL_CHARS.replace_all(&text, "");
  let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
  text.nfc().collect::<String>().trim().to_string()
}
