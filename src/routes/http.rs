//! HTTP endpoint handlers. Thin wrappers: coerce the body, forward to `logic`, serialize.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::error::GatewayError;
use crate::logic::{generate_question, generate_quiz};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    status: "healthy",
    generation_configured: state.generation_configured,
    model_ready: state.model_ready(),
  })
}

#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_generate_question(
  State(state): State<Arc<AppState>>,
  body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
  let req = parse_body::<QuestionIn>(&body)?.into_request();
  let (question, origin) = generate_question(&state, &req).await;
  info!(target: "generation", %origin, options = question.options.len(), "HTTP question served");
  Ok(Json(question))
}

#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_generate_quiz(
  State(state): State<Arc<AppState>>,
  body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
  let req = parse_body::<QuizIn>(&body)?.into_request();
  let (quiz, origin) = generate_quiz(&state, &req).await;
  info!(target: "generation", %origin, questions = quiz.len(), "HTTP quiz served");
  Ok(Json(quiz))
}
