//! Built-in question and quiz templates, used whenever generation is unavailable
//! or its output is unusable. Everything here is local and deterministic.
//!
//! Questions: difficulty picks the template (2, 3 or 4 options), confidence picks the answer.
//! Quizzes: difficulty picks a pool of five items interpolating name/function/species.

use crate::domain::{ConfidenceLevel, Difficulty, QuestionRequest, QuestionResult, QuizItem, QuizRequest, QuizResult};
use crate::util::non_blank;

const FILLER_OPTION: &str = "None of the above";

fn subject(name: Option<&str>) -> String {
  non_blank(name).map(str::to_string).unwrap_or_else(|| "the protein".into())
}

/// Options with `correct` first-class: distractors equal to it are dropped, and a filler
/// is added if that leaves fewer than two choices.
fn choices(correct: &str, distractors: &[&str], correct_at: usize) -> Vec<String> {
  let mut opts: Vec<String> = Vec::new();
  for d in distractors {
    if *d != correct && !opts.iter().any(|o| o == d) {
      opts.push((*d).to_string());
    }
  }
  opts.insert(correct_at.min(opts.len()), correct.to_string());
  if opts.len() < 2 {
    opts.push(FILLER_OPTION.into());
  }
  opts
}

pub fn fallback_question(req: &QuestionRequest) -> QuestionResult {
  let who = subject(req.protein_name.as_deref());
  let (row, col) = (req.row, req.col);
  let level = req.confidence;
  let role = non_blank(req.protein_function.as_deref())
    .map(|f| format!(" Keep in mind its role: {}.", f.trim().trim_end_matches('.')))
    .unwrap_or_default();

  let (question, options, correct) = match req.difficulty {
    Difficulty::Beginner => {
      let correct = match level {
        ConfidenceLevel::High => "Very confident",
        ConfidenceLevel::Medium => "Somewhat confident",
        ConfidenceLevel::Low => "Not confident",
      };
      let other = if level == ConfidenceLevel::Low { "Very confident" } else { "Not confident" };
      (
        format!("How confident are we about this part of {who}?"),
        vec![correct.to_string(), other.to_string()],
        correct,
      )
    }
    Difficulty::Intermediate => {
      let options = [
        "The model is very confident about where this part sits",
        "The model is somewhat confident about where this part sits",
        "The model is not confident about where this part sits",
      ];
      let correct = match level {
        ConfidenceLevel::High => options[0],
        ConfidenceLevel::Medium => options[1],
        ConfidenceLevel::Low => options[2],
      };
      (
        format!("What does the color of the cell at [{row}, {col}] tell you about {who}?{role}"),
        options.iter().map(|s| s.to_string()).collect(),
        correct,
      )
    }
    Difficulty::Advanced => {
      let options = [
        "Below 5 Å: the relative placement of these residues is reliable",
        "5 to 15 Å: the overall arrangement is plausible but details may be off",
        "Above 15 Å: the relative placement is essentially unknown",
        "PAE reports the molecular weight of the region, not confidence",
      ];
      let correct = match level {
        ConfidenceLevel::High => options[0],
        ConfidenceLevel::Medium => options[1],
        ConfidenceLevel::Low => options[2],
      };
      (
        format!("Which PAE range best matches the cell at [{row}, {col}] of the map for {who}, and what does it imply?{role}"),
        options.iter().map(|s| s.to_string()).collect(),
        correct,
      )
    }
  };

  QuestionResult { question, options, correct_answer: correct.to_string() }
}

fn item(question: String, correct: &str, distractors: &[&str], correct_at: usize, explanation: String) -> QuizItem {
  QuizItem {
    question,
    options: choices(correct, distractors, correct_at),
    correct_answer: correct.to_string(),
    explanation,
  }
}

pub fn fallback_quiz(req: &QuizRequest) -> QuizResult {
  let who = subject(Some(req.protein_name.as_str()));
  let function = non_blank(Some(req.protein_function.as_str()));
  let species = non_blank(Some(req.species.as_str()));
  let from_species = species.map(|s| format!(" found in {s}")).unwrap_or_default();

  let pool = match req.difficulty {
    Difficulty::Beginner => vec![
      item(
        format!("What is {who}?"),
        "A protein",
        &["A kind of rock"],
        0,
        format!("{who} is a protein{from_species}: a tiny machine built from a chain of amino acids."),
      ),
      item(
        "What does a protein's shape help it do?".into(),
        "Do its job",
        &["Change its color"],
        1,
        match function {
          Some(f) => format!("The folded shape of {who} is what lets it do its job: {f}"),
          None => "A protein's folded shape is what lets it do its job in the body.".into(),
        },
      ),
      item(
        "In an AlphaFold picture, what does a high-confidence color mean?".into(),
        "The computer is sure about that part",
        &["The computer guessed at random"],
        0,
        "High confidence means the computer is sure where that part of the protein sits.".into(),
      ),
      item(
        "What are proteins made of?".into(),
        "Amino acids",
        &["Sugar crystals"],
        1,
        "Proteins are long chains of amino acids that fold into a shape.".into(),
      ),
      item(
        format!("Can a computer predict the shape of {who}?"),
        "Yes, with tools like AlphaFold",
        &["No, never"],
        0,
        "AlphaFold predicts protein shapes from their amino acid sequence.".into(),
      ),
    ],
    Difficulty::Intermediate => vec![
      item(
        format!("What is the main job of {who}?"),
        function.unwrap_or("Carrying out a specific task in the cell"),
        &["Storing genetic information like DNA", "Forming the fatty layer of the cell membrane"],
        0,
        match function {
          Some(f) => format!("{who}{from_species} works by: {f}"),
          None => format!("Like most proteins, {who} has a specific task that depends on its folded structure."),
        },
      ),
      item(
        "What does PAE (Predicted Aligned Error) measure?".into(),
        "How confident the model is about the relative position of two residues",
        &["How fast the protein folds", "How heavy the protein is"],
        1,
        "PAE estimates the expected position error of one residue when the structure is aligned on another.".into(),
      ),
      item(
        format!("A PAE value below 5 Å between two regions of {who} means..."),
        "Their relative position is predicted with high confidence",
        &["The two regions are not connected", "The prediction failed"],
        0,
        "Low PAE values mean small expected error, so the relative placement can be trusted.".into(),
      ),
      item(
        format!("Why is knowing the 3D structure of {who} useful?"),
        "It helps explain how the protein works",
        &["It reveals the age of the organism", "It changes the protein's sequence"],
        2,
        "Function follows form: binding sites and moving parts are visible in the structure.".into(),
      ),
      match species {
        Some(s) => item(
          format!("Which organism does this {who} come from?"),
          s,
          &["Escherichia coli", "Saccharomyces cerevisiae"],
          1,
          format!("This structure of {who} comes from {s}."),
        ),
        None => item(
          format!("Where in the cell are proteins like {who} made?"),
          "Ribosomes",
          &["The cell wall", "Lysosomes"],
          1,
          "Ribosomes translate messenger RNA into the amino acid chain that folds into a protein.".into(),
        ),
      },
    ],
    Difficulty::Advanced => vec![
      item(
        format!("What does pLDDT estimate for each residue of {who}?"),
        "Local confidence in the predicted structure",
        &["The residue's mass", "The residue's evolutionary age", "The local pH"],
        0,
        "pLDDT is a per-residue local confidence score from 0 to 100.".into(),
      ),
      item(
        format!("Two domains of {who} have high pLDDT internally but high PAE between them. What is most likely?"),
        "Each domain is well predicted but their relative orientation is uncertain",
        &["Both domains are disordered", "The input sequence contains errors", "The protein must be membrane-bound"],
        2,
        "PAE captures inter-domain placement, which pLDDT alone cannot show.".into(),
      ),
      item(
        format!("Which experimental method is commonly used to validate predicted structures like {who}?"),
        "X-ray crystallography",
        &["PCR", "Gel staining", "Flow cytometry"],
        1,
        "Experimental structures from X-ray crystallography or cryo-EM are the usual reference.".into(),
      ),
      item(
        match function {
          Some(f) => format!("Given that {who} functions by \"{f}\", which structural feature would you inspect first?"),
          None => format!("To understand how {who} works, which structural feature would you inspect first?"),
        },
        "The active or binding site",
        &["An N-terminal purification tag", "Only the flexible loops", "The overall molecular weight"],
        3,
        "Function is usually concentrated in the active or binding site, so its confidence matters most.".into(),
      ),
      item(
        "Why can low-confidence regions in an AlphaFold model still be biologically meaningful?".into(),
        "They may be intrinsically disordered regions",
        &["They are always sequencing errors", "They are cut off before folding", "They mark the start codon"],
        0,
        "Low pLDDT often flags intrinsically disordered segments that are flexible in reality.".into(),
      ),
    ],
  };

  let n = req.num_questions.clamp(1, pool.len());
  pool.into_iter().take(n).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Validate;

  #[test]
  fn every_difficulty_and_confidence_pair_is_valid() {
    for &difficulty in Difficulty::ALL {
      for &confidence in ConfidenceLevel::ALL {
        let req = QuestionRequest { difficulty, confidence, ..Default::default() };
        let q = fallback_question(&req);
        assert!(q.options.contains(&q.correct_answer), "{difficulty}/{confidence}");
        assert!(q.validate().is_ok(), "{difficulty}/{confidence}: {:?}", q.validate());
        let (lo, hi) = difficulty.option_bounds();
        assert!(q.options.len() >= lo && q.options.len() <= hi, "{difficulty}");
      }
    }
  }

  #[test]
  fn answers_follow_confidence() {
    let beginner = |confidence| fallback_question(&QuestionRequest { confidence, ..Default::default() }).correct_answer;
    assert_eq!(beginner(ConfidenceLevel::High), "Very confident");
    assert_eq!(beginner(ConfidenceLevel::Medium), "Somewhat confident");
    assert_eq!(beginner(ConfidenceLevel::Low), "Not confident");

    let advanced = fallback_question(&QuestionRequest {
      confidence: ConfidenceLevel::Low,
      difficulty: Difficulty::Advanced,
      ..Default::default()
    });
    assert!(advanced.correct_answer.starts_with("Above 15"));
  }

  #[test]
  fn question_mentions_protein_and_cell() {
    let q = fallback_question(&QuestionRequest {
      row: 2,
      col: 7,
      difficulty: Difficulty::Intermediate,
      protein_name: Some("Hemoglobin".into()),
      ..Default::default()
    });
    assert!(q.question.contains("Hemoglobin"));
    assert!(q.question.contains("[2, 7]"));
  }

  #[test]
  fn protein_function_shapes_harder_questions() {
    for difficulty in [Difficulty::Intermediate, Difficulty::Advanced] {
      let q = fallback_question(&QuestionRequest {
        difficulty,
        protein_name: Some("Hemoglobin".into()),
        protein_function: Some("Carries oxygen in the blood.".into()),
        ..Default::default()
      });
      assert!(q.question.ends_with("Keep in mind its role: Carries oxygen in the blood."), "{}", q.question);
      assert!(q.validate().is_ok());
    }
    let plain = fallback_question(&QuestionRequest { difficulty: Difficulty::Advanced, ..Default::default() });
    assert!(!plain.question.contains("role"));
  }

  #[test]
  fn quizzes_are_valid_for_every_difficulty() {
    for &difficulty in Difficulty::ALL {
      let req = QuizRequest {
        protein_name: "Insulin".into(),
        protein_function: "Regulates blood sugar".into(),
        species: "Homo sapiens".into(),
        difficulty,
        ..Default::default()
      };
      let quiz = fallback_quiz(&req);
      assert_eq!(quiz.len(), 5);
      assert!(quiz.validate().is_ok(), "{difficulty}: {:?}", quiz.validate());
      assert!(quiz.iter().any(|i| i.question.contains("Insulin") || i.explanation.contains("Insulin")));
    }
  }

  #[test]
  fn blank_protein_fields_use_generic_phrasing() {
    let quiz = fallback_quiz(&QuizRequest { difficulty: Difficulty::Intermediate, ..Default::default() });
    assert!(quiz.validate().is_ok());
    assert!(quiz[0].question.contains("the protein"));
  }

  #[test]
  fn quiz_length_follows_request_within_pool() {
    let short = fallback_quiz(&QuizRequest { num_questions: 2, ..Default::default() });
    assert_eq!(short.len(), 2);
    let capped = fallback_quiz(&QuizRequest { num_questions: 10, ..Default::default() });
    assert_eq!(capped.len(), 5);
  }

  #[test]
  fn interpolated_answer_colliding_with_distractor_stays_unique() {
    let quiz = fallback_quiz(&QuizRequest {
      species: "Escherichia coli".into(),
      difficulty: Difficulty::Intermediate,
      ..Default::default()
    });
    assert!(quiz.validate().is_ok());
  }
}
