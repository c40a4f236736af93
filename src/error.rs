//! Gateway error taxonomy.
//!
//! Only `ClientInput` ever reaches the caller. The generation failures are
//! absorbed by `logic`, which answers from the fallback templates instead.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::protocol::ErrorOut;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request body missing, null, or not a JSON object.
    #[error("{0}")]
    ClientInput(String),

    /// No credential, transport/service failure, timeout or empty output.
    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Model text could not be parsed or failed shape validation.
    #[error("malformed generation output: {0}")]
    MalformedGenerationOutput(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            GatewayError::ClientInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorOut { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_input_displays_bare_message() {
        let e = GatewayError::ClientInput("No data provided".into());
        assert_eq!(e.to_string(), "No data provided");
    }

    #[test]
    fn generation_failures_name_their_kind() {
        let e = GatewayError::GenerationUnavailable("timed out after 20s".into());
        assert_eq!(e.to_string(), "generation unavailable: timed out after 20s");
        let e = GatewayError::MalformedGenerationOutput("no JSON found".into());
        assert!(e.to_string().starts_with("malformed generation output"));
    }

    #[test]
    fn client_input_maps_to_bad_request() {
        let resp = GatewayError::ClientInput("No data provided".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
