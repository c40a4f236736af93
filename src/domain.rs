//! Domain models: request parameters after coercion, and the question/quiz results.

use serde::{Deserialize, Serialize};

/// Declares a closed parameter enum with its wire spellings.
/// The first listed spelling is the canonical one; matching is case-insensitive.
macro_rules! wire_enum {
  (@first $first:literal $(, $rest:literal)*) => { $first };
  ($(#[$meta:meta])* $name:ident default $default:ident { $($variant:ident => [$($alias:literal),+]),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum $name { $($variant),+ }

    impl Default for $name {
      fn default() -> Self { $name::$default }
    }

    impl $name {
      #[cfg(test)]
      pub const ALL: &'static [$name] = &[$($name::$variant),+];

      /// Canonical wire spelling.
      pub fn as_str(&self) -> &'static str {
        match self { $($name::$variant => wire_enum!(@first $($alias),+)),+ }
      }

      /// Parse any accepted spelling; `None` for unknown values.
      pub fn from_wire(raw: &str) -> Option<Self> {
        let s = raw.trim();
        $( if [$($alias),+].iter().any(|a| a.eq_ignore_ascii_case(s)) { return Some($name::$variant); } )+
        None
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
    }
  };
}

wire_enum! {
  /// Confidence bucket of the selected PAE cell.
  ConfidenceLevel default Medium {
    High => ["high"],
    Medium => ["medium"],
    Low => ["low"],
  }
}

wire_enum! {
  Difficulty default Beginner {
    Beginner => ["beginner"],
    Intermediate => ["intermediate"],
    Advanced => ["advanced"],
  }
}

wire_enum! {
  Audience default Elementary {
    Elementary => ["elementary"],
    HighSchool => ["highSchool", "high_school", "high-school"],
    Undergraduate => ["undergraduate"],
  }
}

wire_enum! {
  GameMode default Challenge {
    Tutorial => ["tutorial"],
    Challenge => ["challenge"],
    Explore => ["explore"],
  }
}

wire_enum! {
  /// Which PAE map the cell was picked from.
  MapType default Full {
    Full => ["full"],
    Domain => ["domain"],
    Interface => ["interface"],
  }
}

impl Difficulty {
  /// Inclusive bounds on the number of options requested from the model.
  pub fn option_bounds(&self) -> (usize, usize) {
    match self {
      Difficulty::Beginner => (2, 2),
      Difficulty::Intermediate => (3, 4),
      Difficulty::Advanced => (3, 5),
    }
  }
}

/// Fully-typed single-question request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionRequest {
  pub confidence: ConfidenceLevel,
  pub row: i64,
  pub col: i64,
  pub difficulty: Difficulty,
  pub audience: Audience,
  pub game_mode: GameMode,
  pub protein_name: Option<String>,
  pub protein_function: Option<String>,
  pub map_type: Option<MapType>,
}

pub const DEFAULT_NUM_QUESTIONS: usize = 5;
pub const MAX_NUM_QUESTIONS: usize = 10;

/// Fully-typed quiz request.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizRequest {
  pub protein_id: Option<String>,
  pub protein_name: String,
  pub protein_function: String,
  pub species: String,
  pub difficulty: Difficulty,
  pub audience: Audience,
  pub num_questions: usize,
}

impl Default for QuizRequest {
  fn default() -> Self {
    Self {
      protein_id: None,
      protein_name: String::new(),
      protein_function: String::new(),
      species: String::new(),
      difficulty: Difficulty::default(),
      audience: Audience::default(),
      num_questions: DEFAULT_NUM_QUESTIONS,
    }
  }
}

/// A single multiple-choice question. Serialized as the raw response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
}

/// One quiz entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  pub explanation: String,
}

pub type QuizResult = Vec<QuizItem>;

/// Shape check applied to every result before it leaves the gateway.
pub trait Validate {
  fn validate(&self) -> Result<(), String>;
}

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;

fn validate_choice(question: &str, options: &[String], correct: &str) -> Result<(), String> {
  if question.trim().is_empty() {
    return Err("question is empty".into());
  }
  if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
    return Err(format!("expected {MIN_OPTIONS}-{MAX_OPTIONS} options, got {}", options.len()));
  }
  for (i, opt) in options.iter().enumerate() {
    if opt.trim().is_empty() {
      return Err(format!("option {i} is empty"));
    }
    if options[..i].contains(opt) {
      return Err(format!("duplicate option '{opt}'"));
    }
  }
  if !options.iter().any(|o| o == correct) {
    return Err(format!("correctAnswer '{correct}' is not one of the options"));
  }
  Ok(())
}

impl Validate for QuestionResult {
  fn validate(&self) -> Result<(), String> {
    validate_choice(&self.question, &self.options, &self.correct_answer)
  }
}

impl Validate for QuizItem {
  fn validate(&self) -> Result<(), String> {
    validate_choice(&self.question, &self.options, &self.correct_answer)
  }
}

impl Validate for QuizResult {
  fn validate(&self) -> Result<(), String> {
    if self.is_empty() {
      return Err("quiz has no questions".into());
    }
    for (i, item) in self.iter().enumerate() {
      item.validate().map_err(|e| format!("question {i}: {e}"))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(options: &[&str], correct: &str) -> QuestionResult {
    QuestionResult {
      question: "Which?".into(),
      options: options.iter().map(|s| s.to_string()).collect(),
      correct_answer: correct.into(),
    }
  }

  #[test]
  fn wire_spellings_are_case_insensitive_with_aliases() {
    assert_eq!(Audience::from_wire("highschool"), Some(Audience::HighSchool));
    assert_eq!(Audience::from_wire("high_school"), Some(Audience::HighSchool));
    assert_eq!(Difficulty::from_wire(" Advanced "), Some(Difficulty::Advanced));
    assert_eq!(ConfidenceLevel::from_wire("very"), None);
    assert_eq!(Audience::HighSchool.as_str(), "highSchool");
  }

  #[test]
  fn defaults_match_documented_values() {
    assert_eq!(ConfidenceLevel::default(), ConfidenceLevel::Medium);
    assert_eq!(Difficulty::default(), Difficulty::Beginner);
    assert_eq!(Audience::default(), Audience::Elementary);
    assert_eq!(GameMode::default(), GameMode::Challenge);
    assert_eq!(QuizRequest::default().num_questions, 5);
  }

  #[test]
  fn result_serializes_with_camel_case_keys() {
    let v = serde_json::to_value(q(&["a", "b"], "a")).unwrap();
    assert_eq!(v["correctAnswer"], "a");
    assert!(v.get("correct_answer").is_none());
  }

  #[test]
  fn validation_rejects_bad_shapes() {
    assert!(q(&["a", "b"], "a").validate().is_ok());
    assert!(q(&["a", "b"], "c").validate().is_err());
    assert!(q(&["a"], "a").validate().is_err());
    assert!(q(&["a", "a"], "a").validate().is_err());
    assert!(q(&["a", " "], "a").validate().is_err());
    assert!(q(&["a", "b", "c", "d", "e", "f"], "a").validate().is_err());
    assert!(QuizResult::new().validate().is_err());
  }
}
