//! PAE Quiz · Question Generation Backend
//!
//! - Axum HTTP API for the protein-confidence learning game
//! - Optional Gemini integration (via environment variables)
//! - Deterministic built-in questions whenever generation is off or fails
//!
//! Important env variables:
//!   PORT                    : u16 (default 5000)
//!   GEMINI_API_KEY          : enables Gemini integration if present
//!   GEMINI_MODEL            : default "gemini-1.5-pro"
//!   GEMINI_BASE_URL         : default "https://generativelanguage.googleapis.com/v1beta"
//!   GENERATION_TIMEOUT_SECS : upper bound per model call (default 20)
//!   GENERATION_TEMPERATURE  : sampling temperature (default 0.7)
//!   CORS_ALLOWED_ORIGINS    : comma-separated frontend origins, or "*" (default)
//!   PROMPTS_CONFIG_PATH     : path to TOML prompt overrides
//!   LOG_LEVEL               : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT              : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod state;
mod protocol;
mod prompts;
mod extract;
mod fallback;
mod logic;
mod gemini;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Read once; immutable for the rest of the process.
  let cfg = AppConfig::from_env();
  let state = Arc::new(AppState::new(&cfg));

  let app = build_router(state, cors_layer(cfg.cors_origins.as_deref()));

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "pae_quiz_backend", %addr, generation_configured = cfg.generation_configured(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "pae_quiz_backend", "Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(target: "pae_quiz_backend", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => { sig.recv().await; }
      Err(e) => {
        tracing::error!(target: "pae_quiz_backend", error = %e, "Failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };
  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  info!(target: "pae_quiz_backend", "Shutdown signal received");
}
