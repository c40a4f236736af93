//! Process-wide configuration, read once at startup.
//!
//! `AppConfig` comes from environment variables; `Prompts` can additionally be
//! overridden from a TOML file (PROMPTS_CONFIG_PATH). See the field docs for defaults.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Immutable startup configuration. Never mutated after `main` builds it.
#[derive(Clone, Debug)]
pub struct AppConfig {
  pub port: u16,
  /// Absent means generation is disabled for the whole process lifetime.
  pub api_key: Option<String>,
  pub model: String,
  pub base_url: String,
  pub timeout: Duration,
  pub temperature: f32,
  /// `None` allows any origin.
  pub cors_origins: Option<Vec<String>>,
  pub prompts_path: Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      api_key: None,
      model: DEFAULT_MODEL.into(),
      base_url: DEFAULT_BASE_URL.into(),
      timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      temperature: DEFAULT_TEMPERATURE,
      cors_origins: None,
      prompts_path: None,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup. Blank values count as unset; unparsable numbers keep the default.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let defaults = Self::default();

    let port = parse_or(get("PORT"), "PORT", defaults.port);
    let timeout_secs = parse_or(get("GENERATION_TIMEOUT_SECS"), "GENERATION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
    let temperature = parse_or(get("GENERATION_TEMPERATURE"), "GENERATION_TEMPERATURE", defaults.temperature);

    let cors_origins = get("CORS_ALLOWED_ORIGINS").and_then(|raw| {
      if raw == "*" {
        return None;
      }
      let list: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect();
      if list.is_empty() { None } else { Some(list) }
    });

    Self {
      port,
      api_key: get("GEMINI_API_KEY"),
      model: get("GEMINI_MODEL").unwrap_or(defaults.model),
      base_url: get("GEMINI_BASE_URL")
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or(defaults.base_url),
      timeout: Duration::from_secs(timeout_secs.max(1)),
      temperature,
      cors_origins,
      prompts_path: get("PROMPTS_CONFIG_PATH"),
    }
  }

  pub fn generation_configured(&self) -> bool {
    self.api_key.is_some()
  }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(raw: Option<String>, key: &str, default: T) -> T {
  match raw {
    None => default,
    Some(s) => s.parse::<T>().unwrap_or_else(|_| {
      warn!(target: "pae_quiz_backend", %key, value = %s, %default, "Unparsable config value; using default");
      default
    }),
  }
}

/// Prompt templates. `{placeholder}` slots are filled by `prompts::build_*`.
/// The JSON reply contract is appended by the builder and is not configurable.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub question_template: String,
  pub quiz_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      question_template: "Generate one educational multiple-choice question about protein structure prediction confidence.\n\
The question must suit {audience_label} and be at {difficulty} difficulty.\n\
{mode_line}\n\n\
The confidence level of the selected part is: {confidence} (high, medium, or low).\n\
This corresponds to position [{row}, {col}] in the {map_label} PAE (Predicted Aligned Error) map.\n\
PAE below 5 Å means high confidence, 5 to 15 Å medium, above 15 Å low.\n\
{protein_block}\n\
The question must relate to what this confidence level means for the selected part."
        .into(),
      quiz_template: "Create a quiz of exactly {num_questions} multiple-choice questions about the protein {protein_label}.\n\
{species_line}{function_line}\
The quiz must suit {audience_label} and be at {difficulty} difficulty.\n\
Cover the protein's structure, its function, and how to read AlphaFold confidence (pLDDT and PAE) for it.\n\
Every question needs a short explanation of why the correct answer is right."
        .into(),
    }
  }
}

#[derive(Debug, Deserialize, Default)]
struct PromptsFile {
  #[serde(default)]
  prompts: Prompts,
}

/// Load prompt overrides from `path`. On any IO/parse error, logs and returns defaults.
pub fn load_prompts(path: Option<&str>) -> Prompts {
  let Some(path) = path else { return Prompts::default() };
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<PromptsFile>(&s) {
      Ok(file) => {
        info!(target: "pae_quiz_backend", %path, "Loaded prompt templates (TOML)");
        file.prompts
      }
      Err(e) => {
        error!(target: "pae_quiz_backend", %path, error = %e, "Failed to parse prompts TOML; using defaults");
        Prompts::default()
      }
    },
    Err(e) => {
      error!(target: "pae_quiz_backend", %path, error = %e, "Failed to read prompts file; using defaults");
      Prompts::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn cfg(pairs: &[(&str, &str)]) -> AppConfig {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|k| map.get(k).cloned())
  }

  #[test]
  fn empty_environment_yields_defaults() {
    let c = cfg(&[]);
    assert_eq!(c.port, 5000);
    assert!(!c.generation_configured());
    assert_eq!(c.model, "gemini-1.5-pro");
    assert_eq!(c.timeout, Duration::from_secs(20));
    assert!(c.cors_origins.is_none());
  }

  #[test]
  fn blank_key_counts_as_absent() {
    assert!(!cfg(&[("GEMINI_API_KEY", "   ")]).generation_configured());
    assert!(cfg(&[("GEMINI_API_KEY", "abc")]).generation_configured());
  }

  #[test]
  fn bad_numbers_fall_back_and_origins_split() {
    let c = cfg(&[
      ("PORT", "nope"),
      ("GENERATION_TIMEOUT_SECS", "0"),
      ("CORS_ALLOWED_ORIGINS", "http://localhost:5173/, https://quiz.example.org"),
      ("GEMINI_BASE_URL", "http://mock/v1/"),
    ]);
    assert_eq!(c.port, 5000);
    assert_eq!(c.timeout, Duration::from_secs(1));
    assert_eq!(c.base_url, "http://mock/v1");
    assert_eq!(
      c.cors_origins.as_deref(),
      Some(&["http://localhost:5173".to_string(), "https://quiz.example.org".to_string()][..])
    );
    assert!(cfg(&[("CORS_ALLOWED_ORIGINS", "*")]).cors_origins.is_none());
  }

  #[test]
  fn partial_prompt_toml_keeps_other_defaults() {
    let file: PromptsFile = toml::from_str("[prompts]\nquiz_template = \"Quiz {num_questions}\"\n").unwrap();
    assert_eq!(file.prompts.quiz_template, "Quiz {num_questions}");
    assert_eq!(file.prompts.question_template, Prompts::default().question_template);
  }

  #[test]
  fn missing_prompt_file_uses_defaults() {
    let p = load_prompts(Some("/definitely/not/here.toml"));
    assert_eq!(p.quiz_template, Prompts::default().quiz_template);
  }
}
