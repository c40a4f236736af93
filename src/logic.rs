//! Orchestration shared by the HTTP handlers:
//! prompt build -> bounded generation call -> extraction -> fallback on any failure.
//!
//! Generation failures never escape this module; callers always get a valid result
//! plus an origin tag ("generated" or "fallback") for logging.

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{QuestionRequest, QuestionResult, QuizRequest, QuizResult, Validate};
use crate::error::GatewayError;
use crate::extract::{extract, Extractable};
use crate::fallback::{fallback_question, fallback_quiz};
use crate::prompts::{build_question_prompt, build_quiz_prompt};
use crate::state::AppState;
use crate::util::trunc_for_log;

pub const ORIGIN_GENERATED: &str = "generated";
pub const ORIGIN_FALLBACK: &str = "fallback";

const RAW_LOG_LIMIT: usize = 400;

/// One bounded generation call followed by extraction.
async fn generate_structured<T: Extractable>(state: &AppState, prompt: &str) -> Result<(T, &'static str), GatewayError> {
  let Some(generator) = &state.generator else {
    return Err(GatewayError::GenerationUnavailable("generation not configured".into()));
  };

  let raw = match tokio::time::timeout(state.generation_timeout, generator.generate(prompt)).await {
    Ok(res) => res?,
    Err(_) => {
      return Err(GatewayError::GenerationUnavailable(format!(
        "timed out after {:?}",
        state.generation_timeout
      )))
    }
  };

  extract::<T>(&raw).map_err(|e| {
    warn!(target: "generation", model = %generator.model(), raw = %trunc_for_log(&raw, RAW_LOG_LIMIT), "Unparsable model output");
    e
  })
}

#[instrument(
  level = "info",
  skip(state, req),
  fields(request_id = %Uuid::new_v4(), difficulty = %req.difficulty, confidence = %req.confidence, row = req.row, col = req.col)
)]
pub async fn generate_question(state: &AppState, req: &QuestionRequest) -> (QuestionResult, &'static str) {
  let prompt = build_question_prompt(&state.prompts, req);
  match generate_structured::<QuestionResult>(state, &prompt).await {
    Ok((q, strategy)) => {
      info!(target: "generation", %strategy, options = q.options.len(), "Generated question");
      return (q, ORIGIN_GENERATED);
    }
    Err(e) => warn!(target: "generation", error = %e, "Question generation failed; serving fallback"),
  }

  let q = fallback_question(req);
  if let Err(e) = q.validate() {
    error!(target: "generation", error = %e, "Fallback question violates its invariant");
  }
  (q, ORIGIN_FALLBACK)
}

#[instrument(
  level = "info",
  skip(state, req),
  fields(request_id = %Uuid::new_v4(), difficulty = %req.difficulty, num_questions = req.num_questions, protein_id = ?req.protein_id)
)]
pub async fn generate_quiz(state: &AppState, req: &QuizRequest) -> (QuizResult, &'static str) {
  let prompt = build_quiz_prompt(&state.prompts, req);
  match generate_structured::<QuizResult>(state, &prompt).await {
    Ok((mut quiz, strategy)) => {
      if quiz.len() > req.num_questions {
        warn!(target: "generation", got = quiz.len(), "Model returned extra questions; truncating");
        quiz.truncate(req.num_questions);
      }
      info!(target: "generation", %strategy, questions = quiz.len(), "Generated quiz");
      return (quiz, ORIGIN_GENERATED);
    }
    Err(e) => warn!(target: "generation", error = %e, "Quiz generation failed; serving fallback"),
  }

  let quiz = fallback_quiz(req);
  if let Err(e) = quiz.validate() {
    error!(target: "generation", error = %e, "Fallback quiz violates its invariant");
  }
  (quiz, ORIGIN_FALLBACK)
}
