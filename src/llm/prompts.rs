//! Prompt construction for lessons and quizzes.
//!
//! Prompts are written in Spanish; the response parser expects the section
//! headers requested here (OBJETIVO, CONTENIDO, CONCEPTOS CLAVE, PREGUNTA N,
//! CORRECTA).

use crate::config::{MAX_COMPLETION_TOKENS, REFERENCE_EXCERPT_CHARS, WORDS_PER_MINUTE};

/// Depth of the lesson, derived from the requested minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationTier {
  Quick,
  Medium,
  Deep,
  Extensive,
}

impl DurationTier {
  pub fn for_minutes(minutes: i64) -> Self {
    match minutes {
      ..=5 => Self::Quick,
      6..=10 => Self::Medium,
      11..=15 => Self::Deep,
      _ => Self::Extensive,
    }
  }

  fn instructions(self) -> &'static str {
    match self {
      Self::Quick => {
        "IMPORTANTE: Esta es una sesión RÁPIDA de 5 minutos.\n\
         - Explicación BREVE y CONCISA, sin entrar en demasiados detalles\n\
         - Enfócate solo en los conceptos MÁS IMPORTANTES\n\
         - Usa lenguaje simple y directo"
      }
      Self::Medium => {
        "IMPORTANTE: Esta es una sesión MEDIA de 10 minutos.\n\
         - Explicación MODERADA con los conceptos principales\n\
         - Balance entre claridad y profundidad"
      }
      Self::Deep => {
        "IMPORTANTE: Esta es una sesión PROFUNDA de 15 minutos.\n\
         - Explicación DETALLADA con ejemplos\n\
         - Cubre los conceptos con mayor profundidad\n\
         - Incluye contexto y aplicaciones prácticas"
      }
      Self::Extensive => {
        "IMPORTANTE: Esta es una sesión EXTENSIVA de 30 minutos.\n\
         - Explicación MUY DETALLADA y exhaustiva\n\
         - Cubre el tema en profundidad con múltiples ejemplos\n\
         - Incluye contexto histórico, casos de uso, y aplicaciones avanzadas"
      }
    }
  }
}

pub const CONTENT_SYSTEM_PROMPT: &str = "\
Eres un asistente educativo experto en crear contenido de aprendizaje conciso y efectivo.

Para CONTENIDO MATEMÁTICO Y TÉCNICO:
- USA LaTeX libremente para fórmulas, ecuaciones y notación matemática
- Usa delimitadores: $...$ para inline, $$...$$ para display
- Ejemplos: $f(x) = x^2 + 2x + 1$, $\\sum_{i=1}^{n} i$, $\\forall x \\in \\mathbb{R}$
- Para símbolos de conjuntos: $\\subseteq$, $\\in$, $\\cup$, $\\cap$
- Para lógica: $\\forall$, $\\exists$, $\\rightarrow$

Para TEXTO NARRATIVO:
- Usa español claro y directo
- Explica conceptos con ejemplos prácticos
- Mantén estructura clara con párrafos bien definidos

REQUISITO FUNDAMENTAL:
- SIEMPRE genera el número EXACTO de palabras solicitado
- Verifica el conteo antes de finalizar tu respuesta";

pub const QUIZ_SYSTEM_PROMPT: &str = "Eres un experto en crear evaluaciones educativas efectivas.";

pub fn target_words(duration_minutes: i64) -> usize {
  (duration_minutes.max(0) as usize) * WORDS_PER_MINUTE
}

/// ~1.3 tokens per Spanish word plus a 20% buffer, capped
pub fn max_tokens_for(target_words: usize) -> u32 {
  let needed = (target_words as f64 * 1.3 * 1.2) as u32;
  needed.min(MAX_COMPLETION_TOKENS)
}

/// First `REFERENCE_EXCERPT_CHARS` characters, never splitting a code point
fn reference_excerpt(material: &str) -> &str {
  match material.char_indices().nth(REFERENCE_EXCERPT_CHARS) {
    Some((idx, _)) => &material[..idx],
    None => material,
  }
}

pub fn build_content_prompt(
  topic_name: &str,
  description: Option<&str>,
  duration_minutes: i64,
  reference: Option<&str>,
) -> String {
  let target = target_words(duration_minutes);
  let min_words = (target as f64 * 0.9) as usize;
  let max_words = (target as f64 * 1.1) as usize;
  let tier = DurationTier::for_minutes(duration_minutes);

  let mut prompt = format!(
    "Genera contenido de estudio para el siguiente tema:\n\nTema: {}\n",
    topic_name
  );
  if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
    prompt.push_str(&format!("Descripcion: {}\n", description));
  }

  prompt.push_str(&format!(
    "\n{}\n- REQUISITO OBLIGATORIO: Genera EXACTAMENTE {} palabras (mínimo {}, máximo {})\n",
    tier.instructions(),
    target,
    min_words,
    max_words
  ));

  prompt.push_str(
    "\nESTRUCTURA REQUERIDA:\n\
     - Divide el CONTENIDO en 3-5 subtítulos relevantes (usa ## para subtítulos)\n\
     - Cada subsección debe tener 2-3 párrafos bien estructurados\n\
     - Usa saltos de línea dobles entre párrafos\n\
     - Para matemáticas/fórmulas: usa LaTeX libremente ($...$)\n\
     - Ejemplos y casos prácticos son bienvenidos\n\n\
     El contenido debe seguir esta estructura:\n\n\
     1. OBJETIVO DE APRENDIZAJE (una oración clara)\n\
     2. CONTENIDO PRINCIPAL (con subtítulos y párrafos bien separados)\n\
     3. CONCEPTOS CLAVE (lista de 3-5 conceptos principales al FINAL)\n\n",
  );

  match reference.filter(|r| !r.trim().is_empty()) {
    Some(material) => prompt.push_str(&format!(
      "Utiliza el siguiente material de referencia como base:\n\n{}\n\n\
       Adapta el contenido del material para que sea conciso y apropiado para la duracion especificada.\n",
      reference_excerpt(material)
    )),
    None => prompt.push_str(
      "Genera contenido educativo preciso y bien estructurado basado en tu conocimiento.\n",
    ),
  }

  prompt.push_str(&format!(
    "\nFormato de respuesta:\n\n\
     OBJETIVO:\n[objetivo de aprendizaje]\n\n\
     CONTENIDO:\n[contenido principal que cumpla con {} palabras]\n\n\
     CONCEPTOS CLAVE:\n- [concepto 1]\n- [concepto 2]\n- [concepto 3]\n\n\
     NOTA: NO incluyas meta-información sobre el conteo de palabras en tu respuesta.\n",
    target
  ));

  prompt
}

pub fn build_quiz_prompt(topic_name: &str, content: &str, num_questions: usize) -> String {
  let mut prompt = format!(
    "Genera {} preguntas de opcion multiple basadas EXCLUSIVAMENTE en el siguiente contenido educativo sobre {}.\n\n\
     IMPORTANTE: Las preguntas deben estar basadas SOLAMENTE en la informacion presentada en el contenido a continuacion. \
     NO uses conocimiento externo que no este en el texto.\n\n\
     CONTENIDO:\n{}\n\n\
     REQUISITOS:\n\
     - Cada pregunta debe tener 4 opciones de respuesta\n\
     - Solo una opcion es correcta\n\
     - Las preguntas deben evaluar comprension del contenido presentado\n\
     - Las opciones incorrectas deben ser plausibles pero claramente incorrectas\n\
     - Todas las respuestas deben poder encontrarse en el CONTENIDO de arriba\n\n\
     FORMATO DE RESPUESTA:\n",
    num_questions, topic_name, content
  );

  for n in 1..=num_questions.min(2) {
    prompt.push_str(&format!(
      "\nPREGUNTA {}:\n[texto de la pregunta]\nA) [opcion 1]\nB) [opcion 2]\nC) [opcion 3]\nD) [opcion 4]\nCORRECTA: [A/B/C/D]\n",
      n
    ));
  }

  prompt
}
