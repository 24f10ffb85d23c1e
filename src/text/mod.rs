//! Post-processing of LLM replies: markup cleanup and section parsing.

pub mod parser;
pub mod sanitize;

pub use parser::{ParsedContent, parse_quiz_questions, parse_session_content, word_count};
pub use sanitize::{clean_latex_formatting, strip_meta_commentary};
