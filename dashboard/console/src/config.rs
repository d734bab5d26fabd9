//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use crate::errors::{ConsoleError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Chanda REST backend (e.g. https://chanda.example.org)
    pub api_url: String,
    /// The single fundraising event this console records against
    pub event_id: i64,
    /// Display name of that event
    pub event_name: String,
    /// Financial year attached to new contributions and expenses
    pub financial_year_id: i64,
    /// Path to the SQLite file holding the login session
    pub session_db: PathBuf,
    /// Per-request timeout for backend calls
    pub http_timeout_secs: u64,
    /// Rows shown per page in table views
    pub rows_per_page: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api_url: env_var("CHANDA_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            event_id: env_var("CHANDA_EVENT_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|_| ConsoleError::Config("Invalid CHANDA_EVENT_ID".to_string()))?,
            event_name: env_var("CHANDA_EVENT_NAME")
                .unwrap_or_else(|_| "Durga Pooja 2025".to_string()),
            financial_year_id: env_var("CHANDA_FINANCIAL_YEAR_ID")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| {
                    ConsoleError::Config("Invalid CHANDA_FINANCIAL_YEAR_ID".to_string())
                })?,
            session_db: match env_var("CHANDA_SESSION_DB") {
                Ok(path) => PathBuf::from(path),
                Err(_) => default_session_db()?,
            },
            http_timeout_secs: env_var("CHANDA_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    ConsoleError::Config("Invalid CHANDA_HTTP_TIMEOUT_SECS".to_string())
                })?,
            rows_per_page: env_var("CHANDA_ROWS_PER_PAGE")
                .unwrap_or_else(|_| "20".to_string())
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConsoleError::Config("Invalid CHANDA_ROWS_PER_PAGE".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ConsoleError::Config(format!("Missing env var: {key}")))
}

fn default_session_db() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("chanda").join("session.db"))
        .ok_or_else(|| {
            ConsoleError::Config(
                "No data directory available; set CHANDA_SESSION_DB".to_string(),
            )
        })
}
