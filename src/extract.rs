//! Layered extraction of structured results from free-form model text.
//!
//! Strategies run in a fixed order, each yielding zero or more parsed JSON values:
//!   1. the whole trimmed text
//!   2. the interior of a ```json fenced block
//!   3. every balanced top-level object/array found by scanning, left to right
//! A parsed value still has to convert into the target type and pass `Validate`;
//! if it does not, the next candidate (or strategy) gets its turn.

use serde_json::Value;

use crate::domain::{QuestionResult, QuizItem, QuizResult, Validate};
use crate::error::GatewayError;

/// A result type the extractor can produce.
pub trait Extractable: Sized + Validate {
  /// Opening delimiter scanned for by the balanced-scan strategy.
  const OPEN: char;
  fn from_value(v: Value) -> Result<Self, String>;
}

impl Extractable for QuestionResult {
  const OPEN: char = '{';
  fn from_value(v: Value) -> Result<Self, String> {
    serde_json::from_value(v).map_err(|e| e.to_string())
  }
}

impl Extractable for QuizResult {
  const OPEN: char = '[';
  /// Accepts a bare array or `{"questions": [...]}`.
  fn from_value(v: Value) -> Result<Self, String> {
    let list = match v {
      Value::Object(mut map) => match map.remove("questions") {
        Some(inner @ Value::Array(_)) => inner,
        _ => return Err("object without a \"questions\" array".into()),
      },
      other => other,
    };
    serde_json::from_value::<Vec<QuizItem>>(list).map_err(|e| e.to_string())
  }
}

type Strategy = fn(&str, char) -> Vec<Value>;

const STRATEGIES: &[(&str, Strategy)] = &[
  ("direct", parse_direct),
  ("fenced", parse_fenced),
  ("scan", parse_scanned),
];

/// Extract `T` from raw model text. Returns the value and the name of the strategy that produced it.
pub fn extract<T: Extractable>(raw: &str) -> Result<(T, &'static str), GatewayError> {
  let mut last_err = String::from("no JSON found in model output");
  for (name, strategy) in STRATEGIES {
    for value in strategy(raw, T::OPEN) {
      match T::from_value(value).and_then(|t| t.validate().map(|_| t)) {
        Ok(t) => return Ok((t, *name)),
        Err(e) => last_err = format!("{name}: {e}"),
      }
    }
  }
  Err(GatewayError::MalformedGenerationOutput(last_err))
}

fn parse_direct(text: &str, _open: char) -> Vec<Value> {
  serde_json::from_str(text.trim()).into_iter().collect()
}

fn parse_fenced(text: &str, _open: char) -> Vec<Value> {
  fenced_json(text).and_then(|body| serde_json::from_str(body).ok()).into_iter().collect()
}

/// Parsable balanced spans in order of appearance. A span that parses is skipped
/// as a whole, so its nested delimiters are not offered again.
fn parse_scanned(text: &str, open: char) -> Vec<Value> {
  let close = if open == '{' { '}' } else { ']' };
  let mut found = Vec::new();
  let mut from = 0;
  while let Some(rel) = text[from..].find(open) {
    let start = from + rel;
    from = start + open.len_utf8();
    if let Some(end) = balanced_end(text, start, open, close) {
      if let Ok(v) = serde_json::from_str(&text[start..=end]) {
        found.push(v);
        from = end + close.len_utf8();
      }
    }
  }
  found
}

/// Interior of the first fenced block tagged `json` (case-insensitive).
fn fenced_json(text: &str) -> Option<&str> {
  let mut rest = text;
  while let Some(open) = rest.find("```") {
    let after = &rest[open + 3..];
    let tag_len = after.find(char::is_whitespace).unwrap_or(after.len());
    let tag = &after[..tag_len];
    let body = &after[tag_len..];
    let close = body.find("```")?;
    if tag.eq_ignore_ascii_case("json") {
      return Some(body[..close].trim());
    }
    rest = &body[close + 3..];
  }
  None
}

/// Byte index of the delimiter closing the one at `start`, skipping string literals.
fn balanced_end(text: &str, start: usize, open: char, close: char) -> Option<usize> {
  let mut depth = 0usize;
  let mut in_string = false;
  let mut escaped = false;
  for (i, ch) in text[start..].char_indices() {
    if in_string {
      if escaped {
        escaped = false;
      } else if ch == '\\' {
        escaped = true;
      } else if ch == '"' {
        in_string = false;
      }
      continue;
    }
    match ch {
      '"' => in_string = true,
      c if c == open => depth += 1,
      c if c == close => {
        depth -= 1;
        if depth == 0 {
          return Some(start + i);
        }
      }
      _ => {}
    }
  }
  None
}
