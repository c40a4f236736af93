//! Application state: immutable configuration, prompt templates and the optional
//! generation client. Built once in `main`, shared read-only behind an `Arc`.

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument, warn};

use crate::config::{load_prompts, AppConfig, Prompts};
use crate::gemini::{Gemini, TextGenerator};

pub struct AppState {
    /// `None` when no credential is configured or the client failed to build.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub generation_configured: bool,
    pub prompts: Prompts,
    /// Upper bound for a single generation call.
    pub generation_timeout: Duration,
}

impl AppState {
    /// Build state from config: load prompt overrides, init the Gemini client.
    #[instrument(level = "info", skip_all)]
    pub fn new(cfg: &AppConfig) -> Self {
        let prompts = load_prompts(cfg.prompts_path.as_deref());

        let generator: Option<Arc<dyn TextGenerator>> = match Gemini::from_config(cfg) {
            Some(g) => {
                info!(target: "pae_quiz_backend", base_url = %g.base_url, model = %g.model, timeout = ?cfg.timeout, "Gemini enabled.");
                Some(Arc::new(g))
            }
            None if cfg.generation_configured() => {
                warn!(target: "pae_quiz_backend", "GEMINI_API_KEY set but client could not be built; serving fallbacks only.");
                None
            }
            None => {
                warn!(target: "pae_quiz_backend", "Gemini disabled (no GEMINI_API_KEY). Serving fallback questions only.");
                None
            }
        };

        Self {
            generator,
            generation_configured: cfg.generation_configured(),
            prompts,
            generation_timeout: cfg.timeout,
        }
    }

    /// State around an explicit generator; used to substitute a mock client.
    #[cfg(test)]
    pub fn with_generator(generator: Option<Arc<dyn TextGenerator>>, generation_timeout: Duration) -> Self {
        Self {
            generation_configured: generator.is_some(),
            generator,
            prompts: Prompts::default(),
            generation_timeout,
        }
    }

    pub fn model_ready(&self) -> bool {
        self.generator.is_some()
    }
}
