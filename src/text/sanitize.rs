//! Cleanup of generated prose before it is parsed and displayed.
//!
//! The model is allowed to write LaTeX freely; the client renders plain
//! text, so math markup is flattened into Unicode here. The pipeline is not
//! idempotent: running it twice may rewrite parentheses produced by the
//! first pass.

use regex::{Captures, Regex, RegexSet, RegexSetBuilder};
use std::collections::HashMap;
use std::sync::LazyLock;

static DISPLAY_MATH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("valid regex"));
static INLINE_MATH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\$([^$]+?)\$").expect("valid regex"));
static BRACKET_MATH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)\\{1,2}\[(.+?)\\{1,2}\]").expect("valid regex"));
static PAREN_MATH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)\\{1,2}\((.+?)\\{1,2}\)").expect("valid regex"));

static TEXT_COMMAND: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\\text(?:bf|it|rm)?\{([^}]+)\}").expect("valid regex"));
static FRACTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\\frac\{([^}]+)\}\{([^}]+)\}").expect("valid regex"));
static SQUARE_ROOT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\\sqrt\{([^}]+)\}").expect("valid regex"));
static SUBSCRIPT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"_\{([^}]+)\}").expect("valid regex"));
static SUPERSCRIPT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\^\{([^}]+)\}").expect("valid regex"));
static NUMBER_SET: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\\mathbb\{([NZQRC])\}").expect("valid regex"));
static COMMAND: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\\([A-Za-z]+)").expect("valid regex"));
static BRACKET_SPAN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\[\s*([^\[\]]+?)\s*\]").expect("valid regex"));
static HORIZONTAL_RUN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Command name (without backslash) to its display form
const SYMBOLS: &[(&str, &str)] = &[
  // Sets
  ("in", "∈"),
  ("notin", "∉"),
  ("subset", "⊂"),
  ("subseteq", "⊆"),
  ("supset", "⊃"),
  ("supseteq", "⊇"),
  ("cup", "∪"),
  ("cap", "∩"),
  ("setminus", "∖"),
  ("emptyset", "∅"),
  ("varnothing", "∅"),
  // Quantifiers and logic
  ("forall", "∀"),
  ("exists", "∃"),
  ("nexists", "∄"),
  ("neg", "¬"),
  ("lnot", "¬"),
  ("land", "∧"),
  ("wedge", "∧"),
  ("lor", "∨"),
  ("vee", "∨"),
  ("implies", "⇒"),
  ("iff", "⇔"),
  // Arrows
  ("rightarrow", "→"),
  ("leftarrow", "←"),
  ("Rightarrow", "⇒"),
  ("Leftarrow", "⇐"),
  ("leftrightarrow", "↔"),
  ("Leftrightarrow", "⇔"),
  ("to", "→"),
  ("mapsto", "↦"),
  // Comparators
  ("leq", "≤"),
  ("le", "≤"),
  ("geq", "≥"),
  ("ge", "≥"),
  ("neq", "≠"),
  ("ne", "≠"),
  ("approx", "≈"),
  ("equiv", "≡"),
  ("sim", "∼"),
  ("cong", "≅"),
  ("propto", "∝"),
  // Arithmetic
  ("infty", "∞"),
  ("times", "×"),
  ("cdot", "·"),
  ("div", "÷"),
  ("pm", "±"),
  ("mp", "∓"),
  // Big operators
  ("sum", "∑"),
  ("prod", "∏"),
  ("int", "∫"),
  ("oint", "∮"),
  ("bigcup", "⋃"),
  ("bigcap", "⋂"),
  // Calculus
  ("partial", "∂"),
  ("nabla", "∇"),
  // Greek
  ("alpha", "α"),
  ("beta", "β"),
  ("gamma", "γ"),
  ("Gamma", "Γ"),
  ("delta", "δ"),
  ("Delta", "Δ"),
  ("epsilon", "ε"),
  ("varepsilon", "ε"),
  ("zeta", "ζ"),
  ("eta", "η"),
  ("theta", "θ"),
  ("Theta", "Θ"),
  ("iota", "ι"),
  ("kappa", "κ"),
  ("lambda", "λ"),
  ("Lambda", "Λ"),
  ("mu", "μ"),
  ("nu", "ν"),
  ("xi", "ξ"),
  ("pi", "π"),
  ("Pi", "Π"),
  ("rho", "ρ"),
  ("sigma", "σ"),
  ("Sigma", "Σ"),
  ("tau", "τ"),
  ("phi", "φ"),
  ("varphi", "φ"),
  ("Phi", "Φ"),
  ("chi", "χ"),
  ("psi", "ψ"),
  ("Psi", "Ψ"),
  ("omega", "ω"),
  ("Omega", "Ω"),
  // Named functions
  ("log", "log"),
  ("ln", "ln"),
  ("sin", "sin"),
  ("cos", "cos"),
  ("tan", "tan"),
  ("exp", "exp"),
  ("min", "min"),
  ("max", "max"),
  ("lim", "lim"),
];

static SYMBOL_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
  LazyLock::new(|| SYMBOLS.iter().copied().collect());

/// Lines the model sometimes appends about its own word count.
const META_PATTERNS: &[&str] = &[
  r"VERIFICACIÓN FINAL:.*",
  r"La respuesta contiene exactamente \d+ palabras\.?",
  r"Verificación:.*\d+\s+palabras.*",
  r"Conteo de palabras:.*\d+.*",
  r"Total de palabras:.*\d+.*",
  r"Número de palabras:.*\d+.*",
  r"\[.*\d+\s+palabras.*\]",
  // Bracketed notes arrive here already rewritten as parentheses
  r"\(.*\d+\s+palabras.*\)",
  r"NOTA:.*conteo.*palabras.*",
];

static META_LINES: LazyLock<RegexSet> = LazyLock::new(|| {
  RegexSetBuilder::new(META_PATTERNS)
    .case_insensitive(true)
    .build()
    .expect("valid regex set")
});

fn blackboard(letter: &str) -> &'static str {
  match letter {
    "N" => "ℕ",
    "Z" => "ℤ",
    "Q" => "ℚ",
    "R" => "ℝ",
    _ => "ℂ",
  }
}

/// Flatten LaTeX markup into readable Unicode text.
///
/// Math delimiters go first: the commands expanded afterwards live inside
/// them.
pub fn clean_latex_formatting(text: &str) -> String {
  let text = DISPLAY_MATH.replace_all(text, "${1}");
  let text = INLINE_MATH.replace_all(&text, "${1}");
  let text = BRACKET_MATH.replace_all(&text, "${1}");
  let text = PAREN_MATH.replace_all(&text, "${1}");

  let text = TEXT_COMMAND.replace_all(&text, "${1}");
  let text = FRACTION.replace_all(&text, "(${1}/${2})");
  let text = SQUARE_ROOT.replace_all(&text, "√(${1})");

  let text = SUBSCRIPT.replace_all(&text, "_(${1})");
  let text = SUPERSCRIPT.replace_all(&text, "^(${1})");

  let text = NUMBER_SET.replace_all(&text, |caps: &Captures| blackboard(&caps[1]).to_string());
  // Unknown commands keep their name, minus the backslash
  let text = COMMAND.replace_all(&text, |caps: &Captures| {
    let name = &caps[1];
    SYMBOL_TABLE
      .get(name)
      .map(|symbol| symbol.to_string())
      .unwrap_or_else(|| name.to_string())
  });

  let text = BRACKET_SPAN.replace_all(&text, "(${1})");

  collapse_horizontal_whitespace(&text)
}

/// Collapse runs of spaces/tabs line by line, leaving blank lines intact.
fn collapse_horizontal_whitespace(text: &str) -> String {
  text
    .split('\n')
    .map(|line| HORIZONTAL_RUN.replace_all(line, " "))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Drop lines where the model reports on its own output (word counts,
/// verification notes).
pub fn strip_meta_commentary(text: &str) -> String {
  text
    .split('\n')
    .filter(|line| !META_LINES.is_match(line))
    .collect::<Vec<_>>()
    .join("\n")
}
