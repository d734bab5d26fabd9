//! Application-wide error types.

use thiserror::Error;

use crate::gate::GateError;
use crate::submit::SubmissionError;
use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("{}", .0.notice())]
    Submission(SubmissionError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl ConsoleError {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Submission(
                SubmissionError::Rejected { status, .. }
                | SubmissionError::Unauthorized { status }
                | SubmissionError::Server { status },
            ) => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_of_api_error() {
        let err = ConsoleError::Api {
            status: 422,
            message: "bad receipt".into(),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "API error (422): bad receipt");
    }

    #[test]
    fn config_error_has_no_status() {
        assert_eq!(ConsoleError::Config("x".into()).status(), None);
    }
}
