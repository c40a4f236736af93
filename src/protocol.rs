//! Wire-level request/response structs and boundary coercion.
//!
//! Inbound payloads are loosely typed: every field is optional and kept as a
//! raw JSON value. They are coerced and default-filled here exactly once,
//! producing the typed requests in `domain`. A field of the wrong type never
//! rejects the request; it takes its default and logs a WARN.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{
    Audience, ConfidenceLevel, Difficulty, GameMode, MapType, QuestionRequest, QuizRequest,
    DEFAULT_NUM_QUESTIONS, MAX_NUM_QUESTIONS,
};
use crate::error::GatewayError;

pub const NO_DATA: &str = "No data provided";
pub const NOT_AN_OBJECT: &str = "Request body must be a JSON object";

/// Parse a raw body into `T`, rejecting empty, null and non-object payloads.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::ClientInput(NO_DATA.into()));
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| GatewayError::ClientInput(NOT_AN_OBJECT.into()))?;
    match value {
        Value::Null => Err(GatewayError::ClientInput(NO_DATA.into())),
        Value::Object(_) => serde_json::from_value(value).map_err(|e| {
            // Fields are raw values, so this only trips on pathological input.
            warn!(target: "pae_quiz_backend", error = %e, "Request object rejected by deserializer");
            GatewayError::ClientInput(NOT_AN_OBJECT.into())
        }),
        _ => Err(GatewayError::ClientInput(NOT_AN_OBJECT.into())),
    }
}

fn type_mismatch(field: &str, raw: &Value, default: &dyn std::fmt::Display) {
    warn!(target: "pae_quiz_backend", %field, value = %raw, %default, "Wrongly-typed value; using default");
}

/// Text field. Absent or null is `None`; any non-string is dropped with a WARN.
fn text(raw: Option<&Value>, field: &str) -> Option<String> {
    match raw? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => {
            type_mismatch(field, other, &"<none>");
            None
        }
    }
}

/// Integer field. Accepts integers, whole floats and numeric strings.
fn integer(raw: Option<&Value>, field: &str) -> Option<i64> {
    let v = raw?;
    let parsed = match v {
        Value::Null => return None,
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    };
    if parsed.is_none() {
        type_mismatch(field, v, &"<default>");
    }
    parsed
}

fn whole(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn coerce<E: Default + std::fmt::Display>(raw: Option<&Value>, field: &str, parse: fn(&str) -> Option<E>) -> E {
    match raw {
        None | Some(Value::Null) => E::default(),
        Some(Value::String(s)) => parse(s).unwrap_or_else(|| {
            let fallback = E::default();
            warn!(target: "pae_quiz_backend", %field, value = %s, default = %fallback, "Unknown value; using default");
            fallback
        }),
        Some(other) => {
            let fallback = E::default();
            type_mismatch(field, other, &fallback);
            fallback
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionIn {
    #[serde(default, alias = "confidenceLevel")]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub row: Option<Value>,
    #[serde(default)]
    pub col: Option<Value>,
    #[serde(default)]
    pub difficulty: Option<Value>,
    #[serde(default)]
    pub audience: Option<Value>,
    #[serde(default)]
    pub game_mode: Option<Value>,
    #[serde(default)]
    pub protein_name: Option<Value>,
    #[serde(default)]
    pub protein_function: Option<Value>,
    #[serde(default)]
    pub map_type: Option<Value>,
}

impl QuestionIn {
    pub fn into_request(self) -> QuestionRequest {
        QuestionRequest {
            confidence: coerce(self.confidence.as_ref(), "confidence", ConfidenceLevel::from_wire),
            row: integer(self.row.as_ref(), "row").unwrap_or(0),
            col: integer(self.col.as_ref(), "col").unwrap_or(0),
            difficulty: coerce(self.difficulty.as_ref(), "difficulty", Difficulty::from_wire),
            audience: coerce(self.audience.as_ref(), "audience", Audience::from_wire),
            game_mode: coerce(self.game_mode.as_ref(), "gameMode", GameMode::from_wire),
            protein_name: text(self.protein_name.as_ref(), "proteinName").filter(|s| !s.trim().is_empty()),
            protein_function: text(self.protein_function.as_ref(), "proteinFunction").filter(|s| !s.trim().is_empty()),
            map_type: text(self.map_type.as_ref(), "mapType").as_deref().and_then(MapType::from_wire),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizIn {
    #[serde(default)]
    pub protein_id: Option<Value>,
    #[serde(default)]
    pub protein_name: Option<Value>,
    #[serde(default)]
    pub protein_function: Option<Value>,
    #[serde(default)]
    pub species: Option<Value>,
    #[serde(default)]
    pub difficulty: Option<Value>,
    #[serde(default)]
    pub audience: Option<Value>,
    #[serde(default)]
    pub num_questions: Option<Value>,
}

impl QuizIn {
    pub fn into_request(self) -> QuizRequest {
        let num_questions = integer(self.num_questions.as_ref(), "numQuestions")
            .map(|n| n.clamp(1, MAX_NUM_QUESTIONS as i64) as usize)
            .unwrap_or(DEFAULT_NUM_QUESTIONS);
        QuizRequest {
            protein_id: text(self.protein_id.as_ref(), "proteinId").filter(|s| !s.trim().is_empty()),
            protein_name: text(self.protein_name.as_ref(), "proteinName").unwrap_or_default(),
            protein_function: text(self.protein_function.as_ref(), "proteinFunction").unwrap_or_default(),
            species: text(self.species.as_ref(), "species").unwrap_or_default(),
            difficulty: coerce(self.difficulty.as_ref(), "difficulty", Difficulty::from_wire),
            audience: coerce(self.audience.as_ref(), "audience", Audience::from_wire),
            num_questions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub status: &'static str,
    pub generation_configured: bool,
    pub model_ready: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_msg(r: Result<QuestionIn, GatewayError>) -> String {
        match r {
            Err(GatewayError::ClientInput(m)) => m,
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[test]
    fn empty_and_null_bodies_have_no_data() {
        assert_eq!(client_msg(parse_body(b"")), NO_DATA);
        assert_eq!(client_msg(parse_body(b"  \n")), NO_DATA);
        assert_eq!(client_msg(parse_body(b"null")), NO_DATA);
    }

    #[test]
    fn non_objects_are_rejected() {
        assert_eq!(client_msg(parse_body(b"[1,2]")), NOT_AN_OBJECT);
        assert_eq!(client_msg(parse_body(b"\"high\"")), NOT_AN_OBJECT);
        assert_eq!(client_msg(parse_body(b"{not json")), NOT_AN_OBJECT);
    }

    #[test]
    fn wrongly_typed_fields_take_defaults() {
        let body = br#"{"row":"three","col":[1],"confidence":7,"difficulty":true,"proteinName":42,"mapType":{}}"#;
        let req = parse_body::<QuestionIn>(body).unwrap().into_request();
        assert_eq!(req, QuestionRequest::default());
    }

    #[test]
    fn numeric_strings_and_whole_floats_become_integers() {
        let req = parse_body::<QuestionIn>(br#"{"row":" 3 ","col":4.0,"confidence":"high"}"#)
            .unwrap()
            .into_request();
        assert_eq!((req.row, req.col), (3, 4));
        assert_eq!(req.confidence, ConfidenceLevel::High);

        let frac = parse_body::<QuestionIn>(br#"{"row":2.5,"col":"4.0"}"#).unwrap().into_request();
        assert_eq!((frac.row, frac.col), (0, 4));

        let quiz = parse_body::<QuizIn>(br#"{"numQuestions":"3"}"#).unwrap().into_request();
        assert_eq!(quiz.num_questions, 3);
        let quiz = parse_body::<QuizIn>(br#"{"numQuestions":7.0}"#).unwrap().into_request();
        assert_eq!(quiz.num_questions, 7);
        let quiz = parse_body::<QuizIn>(br#"{"numQuestions":"many","species":9}"#).unwrap().into_request();
        assert_eq!(quiz.num_questions, DEFAULT_NUM_QUESTIONS);
        assert_eq!(quiz.species, "");
    }

    #[test]
    fn empty_object_takes_all_defaults() {
        let req = parse_body::<QuestionIn>(b"{}").unwrap().into_request();
        assert_eq!(req, QuestionRequest::default());
    }

    #[test]
    fn question_fields_are_coerced() {
        let body = br#"{"confidence":"HIGH","row":3,"col":9,"difficulty":"expert","audience":"highSchool",
                        "gameMode":"tutorial","proteinName":"  ","proteinFunction":"binds oxygen","mapType":"domain"}"#;
        let req = parse_body::<QuestionIn>(body).unwrap().into_request();
        assert_eq!(req.confidence, ConfidenceLevel::High);
        assert_eq!((req.row, req.col), (3, 9));
        assert_eq!(req.difficulty, Difficulty::Beginner);
        assert_eq!(req.audience, Audience::HighSchool);
        assert_eq!(req.game_mode, GameMode::Tutorial);
        assert_eq!(req.protein_name, None);
        assert_eq!(req.protein_function.as_deref(), Some("binds oxygen"));
        assert_eq!(req.map_type, Some(MapType::Domain));
    }

    #[test]
    fn confidence_level_alias_is_accepted() {
        let req = parse_body::<QuestionIn>(br#"{"confidenceLevel":"low"}"#).unwrap().into_request();
        assert_eq!(req.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn quiz_defaults_and_clamping() {
        let req = parse_body::<QuizIn>(br#"{"proteinName":"Insulin"}"#).unwrap().into_request();
        assert_eq!(req.num_questions, 5);
        assert_eq!(req.species, "");
        assert_eq!(req.protein_name, "Insulin");

        let big = parse_body::<QuizIn>(br#"{"numQuestions":50}"#).unwrap().into_request();
        assert_eq!(big.num_questions, 10);
        let neg = parse_body::<QuizIn>(br#"{"numQuestions":-2}"#).unwrap().into_request();
        assert_eq!(neg.num_questions, 1);
    }

    #[test]
    fn health_uses_camel_case() {
        let v = serde_json::to_value(HealthOut { status: "healthy", generation_configured: false, model_ready: false }).unwrap();
        assert_eq!(v["status"], "healthy");
        assert_eq!(v["generationConfigured"], false);
        assert_eq!(v["modelReady"], false);
    }
}
