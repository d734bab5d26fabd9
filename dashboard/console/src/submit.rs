//! Submission adapter: maps a validated contribution onto the backend's
//! request shape and sends it.
//!
//! There is no retry and no deduplication. Submitting the same payload
//! twice creates two records.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::api::ApiClient;
use crate::errors::ConsoleError;
use crate::models::ContributionRecord;
use crate::validation::{ContributorEntry, ValidContribution};

/// Body of `POST /api/v1/contributions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionPayload {
    pub tola_id: i64,
    /// `0` for a contributor not yet on file.
    pub contributor_id: i64,
    pub event_id: i64,
    /// Date only, `YYYY-MM-DD`.
    pub payment_date: String,
    pub amount: f64,
    pub payment_mode_id: &'static str,
    pub is_new_contributor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_or_spouse_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub receipt_id: String,
    pub financial_year_id: i64,
}

impl ContributionPayload {
    pub fn build(
        contribution: &ValidContribution,
        tola_id: i64,
        event_id: i64,
        financial_year_id: i64,
    ) -> Self {
        let (contributor_id, contributor_name, father_or_spouse_name) =
            match &contribution.contributor {
                ContributorEntry::Existing { contributor_id } => (*contributor_id, None, None),
                ContributorEntry::New {
                    contributor_name,
                    father_or_spouse_name,
                } => (
                    0,
                    Some(contributor_name.clone()),
                    Some(father_or_spouse_name.clone()),
                ),
            };

        Self {
            tola_id,
            contributor_id,
            event_id,
            payment_date: contribution.payment_date.format("%Y-%m-%d").to_string(),
            amount: contribution.amount,
            payment_mode_id: contribution.payment_mode.id(),
            is_new_contributor: contribution.contributor.is_new(),
            contributor_name,
            father_or_spouse_name,
            contact: contribution.contact.clone(),
            receipt_id: contribution.receipt_id.clone(),
            financial_year_id,
        }
    }
}

/// Why a contribution was not saved.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The backend refused the input (4xx); the user can fix and resend.
    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("not authorized ({status}); log in again")]
    Unauthorized { status: u16 },

    #[error("server error ({status})")]
    Server { status: u16 },

    #[error("could not reach server: {0}")]
    Transport(String),
}

impl SubmissionError {
    /// Text of the failure notice shown to the user.
    pub fn notice(&self) -> String {
        match self {
            Self::Rejected { message, .. } => format!("Failed to save contribution: {message}"),
            Self::Unauthorized { .. } => "Failed to save contribution: not authorized".to_string(),
            Self::Server { .. } | Self::Transport(_) => "Failed to save contribution".to_string(),
        }
    }

    pub fn is_user_fixable(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Unauthorized { .. })
    }
}

impl From<ConsoleError> for SubmissionError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Api { status, .. } if status == 401 || status == 403 => {
                Self::Unauthorized { status }
            }
            ConsoleError::Api { status, message } if (400..500).contains(&status) => {
                Self::Rejected { status, message }
            }
            ConsoleError::NotFound(message) => Self::Rejected {
                status: 404,
                message,
            },
            ConsoleError::Api { status, .. } => Self::Server { status },
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Send one contribution. Never retries.
pub async fn submit_contribution(
    api: &ApiClient,
    payload: &ContributionPayload,
) -> Result<ContributionRecord, SubmissionError> {
    match api.create_contribution(payload).await {
        Ok(record) => {
            info!(
                "Contribution {} saved (receipt {}, tola {})",
                record.id, payload.receipt_id, payload.tola_id
            );
            Ok(record)
        }
        Err(e) => {
            error!("Failed to save contribution (receipt {}): {e}", payload.receipt_id);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMode;
    use chrono::NaiveDate;

    fn contribution(contributor: ContributorEntry) -> ValidContribution {
        ValidContribution {
            contributor,
            contact: None,
            receipt_id: "R-1001".into(),
            payment_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            amount: 500.0,
            payment_mode: PaymentMode::Cash,
        }
    }

    #[test]
    fn new_contributor_payload() {
        let payload = ContributionPayload::build(
            &contribution(ContributorEntry::New {
                contributor_name: "Ravi Kumar".into(),
                father_or_spouse_name: "Suresh Kumar".into(),
            }),
            3,
            1,
            5,
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tola_id": 3,
                "contributor_id": 0,
                "event_id": 1,
                "payment_date": "2025-01-15",
                "amount": 500.0,
                "payment_mode_id": "2",
                "is_new_contributor": true,
                "contributor_name": "Ravi Kumar",
                "father_or_spouse_name": "Suresh Kumar",
                "receipt_id": "R-1001",
                "financial_year_id": 5
            })
        );
    }

    #[test]
    fn existing_contributor_payload_omits_name_fields() {
        let mut c = contribution(ContributorEntry::Existing { contributor_id: 42 });
        c.contact = Some("9876543210".into());
        let json = serde_json::to_value(ContributionPayload::build(&c, 7, 1, 5)).unwrap();
        assert_eq!(json["contributor_id"], 42);
        assert_eq!(json["is_new_contributor"], false);
        assert_eq!(json["contact"], "9876543210");
        assert!(json.get("contributor_name").is_none());
        assert!(json.get("father_or_spouse_name").is_none());
    }

    #[test]
    fn classifies_failures() {
        let rejected: SubmissionError = ConsoleError::Api {
            status: 422,
            message: "receipt_id already exists".into(),
        }
        .into();
        assert!(rejected.is_user_fixable());
        assert_eq!(
            rejected.notice(),
            "Failed to save contribution: receipt_id already exists"
        );

        let auth: SubmissionError = ConsoleError::Api {
            status: 401,
            message: "expired".into(),
        }
        .into();
        assert!(matches!(auth, SubmissionError::Unauthorized { status: 401 }));

        let server: SubmissionError = ConsoleError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        }
        .into();
        assert!(!server.is_user_fixable());
        assert_eq!(server.notice(), "Failed to save contribution");

        let transport: SubmissionError = ConsoleError::Config("x".into()).into();
        assert!(matches!(transport, SubmissionError::Transport(_)));
    }
}
