//! Contribution capture: reference data, form, preview gate and submission
//! wired together for one session.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::errors::ConsoleError;
use crate::form::{ContributionForm, FormError};
use crate::gate::{GateError, Preview, PreviewContext, PreviewGate};
use crate::loader::ReferenceData;
use crate::models::ContributionRecord;
use crate::submit::{submit_contribution, ContributionPayload, SubmissionError};
use crate::validation::{ContributorEntry, FieldErrors};

pub const MSG_SAVED: &str = "Contribution saved successfully";

/// The fundraising event contributions are recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub event_id: i64,
    pub event_name: String,
    pub financial_year_id: i64,
}

impl From<&Config> for EventContext {
    fn from(config: &Config) -> Self {
        Self {
            event_id: config.event_id,
            event_name: config.event_name.clone(),
            financial_year_id: config.financial_year_id,
        }
    }
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("{0}")]
    Precondition(&'static str),

    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl CaptureError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Precondition(msg) => Notice::Warning((*msg).to_string()),
            Self::Invalid(errors) => {
                Notice::Error(format!("Please fix {} field(s) before saving", errors.len()))
            }
            Self::Gate(e) => Notice::Warning(e.to_string()),
            Self::Submission(e) => Notice::Error(e.notice()),
        }
    }
}

impl From<FormError> for CaptureError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Precondition(msg) => Self::Precondition(msg),
            FormError::Invalid(errors) => Self::Invalid(errors),
        }
    }
}

impl From<CaptureError> for ConsoleError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Precondition(msg) => ConsoleError::Precondition(msg.to_string()),
            CaptureError::Invalid(errors) => ConsoleError::Validation(errors),
            CaptureError::Gate(e) => ConsoleError::Gate(e),
            CaptureError::Submission(e) => ConsoleError::Submission(e),
        }
    }
}

#[derive(Debug)]
pub struct CaptureSession {
    event: EventContext,
    reference: ReferenceData,
    form: ContributionForm,
    gate: PreviewGate,
}

impl CaptureSession {
    pub fn new(event: EventContext, today: NaiveDate) -> Self {
        Self {
            event,
            reference: ReferenceData::new(),
            form: ContributionForm::new(today),
            gate: PreviewGate::new(),
        }
    }

    pub fn event(&self) -> &EventContext {
        &self.event
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn reference_mut(&mut self) -> &mut ReferenceData {
        &mut self.reference
    }

    pub fn form(&self) -> &ContributionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContributionForm {
        &mut self.form
    }

    pub fn gate(&self) -> &PreviewGate {
        &self.gate
    }

    /// Select a Tola and load its contributors.
    pub async fn select_tola(&mut self, api: &ApiClient, tola_id: Option<i64>) -> bool {
        let loaded = self.reference.select_and_load(api, tola_id).await;
        // A contributor picked under the previous Tola is no longer valid.
        if !self.form.draft().is_new_contributor && self.form.draft().contributor_id.is_some() {
            self.form.select_contributor(None);
        }
        loaded
    }

    /// Pick an existing contributor of the selected Tola by id.
    /// Returns `false` when the id is not in the loaded list.
    pub fn select_contributor(&mut self, contributor_id: Option<i64>) -> bool {
        match contributor_id {
            None => {
                self.form.select_contributor(None);
                true
            }
            Some(id) => match self.reference.contributor(id) {
                Some(contributor) => {
                    self.form.select_contributor(Some(contributor));
                    true
                }
                None => {
                    warn!("Contributor {id} is not listed for the selected tola");
                    false
                }
            },
        }
    }

    /// Validate and open the preview.
    pub fn request_preview(&mut self) -> Result<&Preview, CaptureError> {
        let tola = self.reference.selected_tola_id();
        let contribution = self.form.submit(tola)?;
        let tola_id = tola.ok_or(CaptureError::Precondition(crate::form::MSG_SELECT_TOLA))?;

        let tola_name = self
            .reference
            .selected_tola()
            .map(|t| t.tola_name.clone())
            .unwrap_or_else(|| format!("Tola #{tola_id}"));
        let contributor_label = match &contribution.contributor {
            ContributorEntry::Existing { contributor_id } => self
                .reference
                .contributor(*contributor_id)
                .map(|c| c.label()),
            ContributorEntry::New { .. } => None,
        };

        self.gate.open(Preview::new(
            contribution,
            PreviewContext {
                event_name: self.event.event_name.clone(),
                tola_id,
                tola_name,
                contributor_label,
            },
        ))?;
        self.gate.preview().ok_or(CaptureError::Gate(GateError::InvalidTransition {
            action: "show the preview",
            state: "idle",
        }))
    }

    /// Close the preview without touching the form.
    pub fn cancel_preview(&mut self) -> Result<(), CaptureError> {
        self.gate.cancel()?;
        Ok(())
    }

    /// Send the previewed contribution.
    ///
    /// On success the form is reset; on failure it keeps its values so the
    /// user can resubmit. The gate is back to idle either way.
    pub async fn confirm(&mut self, api: &ApiClient) -> Result<ContributionRecord, CaptureError> {
        let preview = self.gate.confirm()?;
        let payload = ContributionPayload::build(
            &preview.contribution,
            preview.tola_id(),
            self.event.event_id,
            self.event.financial_year_id,
        );

        let result = submit_contribution(api, &payload).await;
        self.gate.finish()?;

        let record = result?;
        info!("Receipt {} recorded as contribution {}", payload.receipt_id, record.id);
        self.form.reset();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::session::Session;
    use crate::validation::Field;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event() -> EventContext {
        EventContext {
            event_id: 1,
            event_name: "Durga Pooja 2025".into(),
            financial_year_id: 5,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    async fn server_with_tola() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tolas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 3, "tola_name": "North Tola" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tolas/3/contributors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 11, "name": "Asha Devi", "pledge_amount": 700.0 }
            ])))
            .mount(&server)
            .await;
        server
    }

    fn api(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5), Session::anonymous()).unwrap()
    }

    #[test]
    fn preview_blocked_without_tola() {
        let mut session = CaptureSession::new(event(), today());
        let form = session.form_mut();
        form.set_new_contributor(true);
        form.set_contributor_name("A");
        form.set_father_or_spouse_name("B");
        form.set_receipt_id("R");
        form.set_amount("10");
        form.set_payment_mode("cash");

        let err = session.request_preview().unwrap_err();
        assert!(matches!(err, CaptureError::Precondition(_)));
        assert!(matches!(err.notice(), Notice::Warning(_)));
        assert!(session.gate().is_idle());
    }

    #[tokio::test]
    async fn existing_contributor_flow_resets_form_on_success() {
        let server = server_with_tola().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/contributions"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 99, "tola_id": 3, "contributor_id": 11, "event_id": 1,
                "payment_date": "2025-01-15", "amount": 700.0, "payment_mode_id": "1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server);
        let mut session = CaptureSession::new(event(), today());
        assert!(session.reference_mut().load_tolas(&api).await);
        assert!(session.select_tola(&api, Some(3)).await);
        assert!(session.select_contributor(Some(11)));
        assert!(!session.select_contributor(Some(12)));
        assert_eq!(session.form().draft().amount, "700");

        session.form_mut().set_receipt_id("R-5");
        session.form_mut().set_payment_mode("UPI");

        let preview = session.request_preview().unwrap();
        assert!(preview.to_string().contains("Asha Devi - ₹ 700"));

        let record = session.confirm(&api).await.unwrap();
        assert_eq!(record.id, 99);
        assert!(session.gate().is_idle());
        assert_eq!(session.form().draft().receipt_id, "");
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft() {
        let server = server_with_tola().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/contributions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server);
        let mut session = CaptureSession::new(event(), today());
        session.reference_mut().load_tolas(&api).await;
        session.select_tola(&api, Some(3)).await;
        session.select_contributor(Some(11));
        session.form_mut().set_receipt_id("R-6");
        session.form_mut().set_payment_mode("cash");
        session.request_preview().unwrap();

        let err = session.confirm(&api).await.unwrap_err();
        assert_eq!(err.notice(), Notice::Error("Failed to save contribution".into()));
        assert!(session.gate().is_idle());
        assert_eq!(session.form().draft().receipt_id, "R-6");
        assert_eq!(session.form().draft().contributor_id, Some(11));
    }

    #[tokio::test]
    async fn cancel_keeps_values_and_sends_nothing() {
        let server = server_with_tola().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/contributions"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let api = api(&server);
        let mut session = CaptureSession::new(event(), today());
        session.reference_mut().load_tolas(&api).await;
        session.select_tola(&api, Some(3)).await;
        session.select_contributor(Some(11));
        session.form_mut().set_receipt_id("R-7");
        session.form_mut().set_payment_mode("cheque");
        session.request_preview().unwrap();
        session.cancel_preview().unwrap();

        assert!(session.gate().is_idle());
        assert_eq!(session.form().draft().receipt_id, "R-7");
        assert!(matches!(
            session.confirm(&api).await.unwrap_err(),
            CaptureError::Gate(_)
        ));
    }

    #[tokio::test]
    async fn changing_tola_drops_picked_contributor() {
        let server = server_with_tola().await;
        let api = api(&server);
        let mut session = CaptureSession::new(event(), today());
        session.reference_mut().load_tolas(&api).await;
        session.select_tola(&api, Some(3)).await;
        session.select_contributor(Some(11));

        session.select_tola(&api, None).await;
        assert!(session.reference().contributors().is_empty());
        assert_eq!(session.form().draft().contributor_id, None);
        assert_eq!(
            session.form().error(Field::ContributorId),
            Some(crate::validation::MSG_CONTRIBUTOR_REQUIRED)
        );
    }
}
