//! Prompt rendering for question and quiz generation.
//!
//! Pure functions over the typed requests. Optional fields only add lines; a bare
//! request still renders a complete prompt. The JSON reply contract is always appended.

use crate::config::Prompts;
use crate::domain::{Audience, Difficulty, GameMode, MapType, QuestionRequest, QuizRequest};
use crate::util::{fill_template, non_blank};

const QUESTION_REPLY_CONTRACT: &str = r#"
Return ONLY a JSON object in exactly this shape, with no other text:
{
  "question": "The question text here",
  "options": ["option1", "option2", ...],
  "correctAnswer": "The correct option here"
}
Rules:
- {option_rule}
- All options must be different from each other.
- "correctAnswer" must be copied exactly from one of the "options".
"#;

const QUIZ_REPLY_CONTRACT: &str = r#"
Return ONLY a JSON array of exactly {num_questions} objects, with no other text. Each object has this shape:
{
  "question": "The question text here",
  "options": ["option1", "option2", ...],
  "correctAnswer": "The correct option here",
  "explanation": "Why the correct answer is right"
}
Rules:
- {option_rule}
- All options of a question must be different from each other.
- "correctAnswer" must be copied exactly from one of the "options".
"#;

fn audience_label(a: Audience) -> &'static str {
  match a {
    Audience::Elementary => "elementary school children",
    Audience::HighSchool => "high school students",
    Audience::Undergraduate => "undergraduate students",
  }
}

fn mode_line(m: GameMode) -> &'static str {
  match m {
    GameMode::Tutorial => "This is tutorial mode: explain the idea gently so the question is a learning moment.",
    GameMode::Challenge => "This is challenge mode: the question should test real understanding.",
    GameMode::Explore => "This is explore mode: spark curiosity about the protein and its shape.",
  }
}

fn map_label(m: Option<MapType>) -> &'static str {
  match m {
    None => "protein's",
    Some(MapType::Full) => "full-chain",
    Some(MapType::Domain) => "domain-level",
    Some(MapType::Interface) => "interface",
  }
}

/// Option-count rule for a difficulty, e.g. "beginner: exactly 2 options".
pub fn option_rule(d: Difficulty) -> String {
  match d.option_bounds() {
    (lo, hi) if lo == hi => format!("{d}: exactly {lo} options"),
    (lo, hi) => format!("{d}: {lo}-{hi} options"),
  }
}

fn protein_block(name: Option<&str>, function: Option<&str>) -> String {
  let Some(name) = non_blank(name) else { return String::new() };
  let mut out = format!("\nProtein-specific context:\n- Protein: {name}\n");
  if let Some(f) = non_blank(function) {
    out.push_str(&format!("- Function: {f}\n"));
  }
  out.push_str("Mention this protein by name in the question.\n");
  out
}

pub fn build_question_prompt(prompts: &Prompts, req: &QuestionRequest) -> String {
  let row = req.row.to_string();
  let col = req.col.to_string();
  let block = protein_block(req.protein_name.as_deref(), req.protein_function.as_deref());
  let body = fill_template(
    &prompts.question_template,
    &[
      ("audience_label", audience_label(req.audience)),
      ("difficulty", req.difficulty.as_str()),
      ("mode_line", mode_line(req.game_mode)),
      ("confidence", req.confidence.as_str()),
      ("row", &row),
      ("col", &col),
      ("map_label", map_label(req.map_type)),
      ("protein_block", &block),
    ],
  );
  let contract = fill_template(QUESTION_REPLY_CONTRACT, &[("option_rule", &option_rule(req.difficulty))]);
  format!("{}\n{}", body.trim_end(), contract)
}

pub fn build_quiz_prompt(prompts: &Prompts, req: &QuizRequest) -> String {
  let n = req.num_questions.to_string();
  let protein_label = non_blank(Some(req.protein_name.as_str())).unwrap_or("chosen for this lesson");
  let species_line = non_blank(Some(req.species.as_str()))
    .map(|s| format!("It comes from {s}.\n"))
    .unwrap_or_default();
  let function_line = non_blank(Some(req.protein_function.as_str()))
    .map(|f| format!("Its function: {f}\n"))
    .unwrap_or_default();
  let body = fill_template(
    &prompts.quiz_template,
    &[
      ("num_questions", &n),
      ("protein_label", protein_label),
      ("species_line", &species_line),
      ("function_line", &function_line),
      ("audience_label", audience_label(req.audience)),
      ("difficulty", req.difficulty.as_str()),
    ],
  );
  let contract = fill_template(
    QUIZ_REPLY_CONTRACT,
    &[("num_questions", &n), ("option_rule", &option_rule(req.difficulty))],
  );
  format!("{}\n{}", body.trim_end(), contract)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ConfidenceLevel;

  #[test]
  fn bare_question_request_renders_generic_prompt() {
    let p = build_question_prompt(&Prompts::default(), &QuestionRequest::default());
    assert!(p.contains("medium"));
    assert!(p.contains("[0, 0]"));
    assert!(p.contains("elementary school children"));
    assert!(p.contains("beginner: exactly 2 options"));
    assert!(p.contains("\"correctAnswer\""));
    assert!(!p.contains("Protein-specific context"));
    assert!(!p.contains("{protein_block}"));
  }

  #[test]
  fn protein_block_appears_only_with_a_name() {
    let mut req = QuestionRequest {
      confidence: ConfidenceLevel::Low,
      row: 3,
      col: 4,
      difficulty: Difficulty::Advanced,
      protein_function: Some("carries oxygen".into()),
      map_type: Some(MapType::Interface),
      ..Default::default()
    };
    let without = build_question_prompt(&Prompts::default(), &req);
    assert!(!without.contains("Protein-specific context"));
    assert!(without.contains("advanced: 3-5 options"));
    assert!(without.contains("interface PAE"));

    req.protein_name = Some("Hemoglobin".into());
    let with = build_question_prompt(&Prompts::default(), &req);
    assert!(with.contains("Protein-specific context"));
    assert!(with.contains("- Protein: Hemoglobin"));
    assert!(with.contains("- Function: carries oxygen"));
  }

  #[test]
  fn quiz_prompt_embeds_count_and_optional_lines() {
    let req = QuizRequest {
      protein_name: "Insulin".into(),
      species: "Homo sapiens".into(),
      difficulty: Difficulty::Intermediate,
      num_questions: 3,
      ..Default::default()
    };
    let p = build_quiz_prompt(&Prompts::default(), &req);
    assert!(p.contains("exactly 3 multiple-choice questions about the protein Insulin"));
    assert!(p.contains("It comes from Homo sapiens."));
    assert!(!p.contains("Its function:"));
    assert!(p.contains("JSON array of exactly 3 objects"));
    assert!(p.contains("intermediate: 3-4 options"));
    assert!(p.contains("\"explanation\""));
  }

  #[test]
  fn rendering_is_deterministic() {
    let req = QuizRequest::default();
    assert_eq!(build_quiz_prompt(&Prompts::default(), &req), build_quiz_prompt(&Prompts::default(), &req));
  }
}
