//! Environment-driven configuration
//!
//! Every knob has a default so a local two-process setup runs with zero
//! configuration (API key aside).

use std::time::Duration;

/// Default port for the counsellor chat API.
pub const DEFAULT_COUNSELLOR_PORT: u16 = 8000;

/// Default port for the researcher A2A server.
pub const DEFAULT_RESEARCHER_PORT: u16 = 8001;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. Empty means the provider will reject calls at
    /// request time rather than at startup.
    pub api_key: String,
    /// Inference model identifier.
    pub model: String,
    /// Base URL of the researcher A2A server.
    pub researcher_url: String,
    /// Port the local server listens on.
    pub port: u16,
    /// Path of the JSON research store.
    pub research_db: String,
    /// Upper bound on a single delegated research task.
    pub a2a_timeout: Duration,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    /// `default_port` differs per role (8000 counsellor, 8001 researcher).
    pub fn from_env(default_port: u16) -> Self {
        Self {
            api_key: env_or("GEMINI_API_KEY", ""),
            model: env_or("COUNSEL_MODEL", "gemini-flash-latest"),
            researcher_url: env_or("RESEARCHER_URL", "http://localhost:8001"),
            port: std::env::var("COUNSEL_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default_port),
            research_db: env_or("RESEARCH_DB", "career_research.json"),
            a2a_timeout: Duration::from_secs(
                std::env::var("A2A_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
