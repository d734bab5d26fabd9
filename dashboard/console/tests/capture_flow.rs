//! End-to-end contribution capture against a mocked backend.

use std::time::Duration;

use chanda_console::api::ApiClient;
use chanda_console::session::Session;
use chanda_console::validation::{Field, MSG_AMOUNT_POSITIVE};
use chanda_console::workflow::{CaptureError, CaptureSession, EventContext};
use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event() -> EventContext {
    EventContext {
        event_id: 1,
        event_name: "Durga Pooja 2025".into(),
        financial_year_id: 5,
    }
}

fn jan_15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tolas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 3, "tola_name": "North Tola" },
            { "id": 4, "tola_name": "South Tola" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tolas/3/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    server
}

fn created() -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(serde_json::json!({
        "id": 501, "tola_id": 3, "contributor_id": 77, "event_id": 1,
        "payment_date": "2025-01-15", "amount": 500.0, "payment_mode_id": "2",
        "receipt_id": "R-1001"
    }))
}

async fn ravi_kumar_session(api: &ApiClient) -> CaptureSession {
    let mut session = CaptureSession::new(event(), jan_15());
    assert!(session.reference_mut().load_tolas(api).await);
    let north = session.reference().find_tola("North Tola").map(|t| t.id);
    assert!(session.select_tola(api, north).await);

    let form = session.form_mut();
    form.set_new_contributor(true);
    form.set_contributor_name("Ravi Kumar");
    form.set_father_or_spouse_name("Suresh Kumar");
    form.set_receipt_id("R-1001");
    form.set_payment_date(Some(jan_15()));
    form.set_amount("500");
    form.set_payment_mode("Cash");
    session
}

#[tokio::test]
async fn new_contributor_is_previewed_then_saved() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/contributions"))
        .and(header("authorization", "Bearer token-1"))
        .and(body_json(serde_json::json!({
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
        })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(
        &server.uri(),
        Duration::from_secs(5),
        Session::authenticated("token-1", Some("admin".into())),
    )
    .unwrap();
    let mut session = ravi_kumar_session(&api).await;

    let preview = session.request_preview().unwrap().to_string();
    assert!(preview.contains("North Tola"));
    assert!(preview.contains("Ravi Kumar (new)"));
    assert!(preview.contains("Cash"));
    assert!(preview.contains("15/01/2025"));

    let record = session.confirm(&api).await.unwrap();
    assert_eq!(record.id, 501);
    assert!(!session.form().draft().is_new_contributor);
    assert_eq!(session.form().draft().contributor_name, "");
}

#[tokio::test]
async fn identical_confirmed_submissions_are_both_sent() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/contributions"))
        .respond_with(created())
        .expect(2)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), Duration::from_secs(5), Session::anonymous()).unwrap();
    for _ in 0..2 {
        let mut session = ravi_kumar_session(&api).await;
        session.request_preview().unwrap();
        session.confirm(&api).await.unwrap();
    }
}

#[tokio::test]
async fn unusable_amount_never_reaches_the_backend() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/contributions"))
        .respond_with(created())
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), Duration::from_secs(5), Session::anonymous()).unwrap();
    for amount in ["", "abc", "0", "-5"] {
        let mut session = ravi_kumar_session(&api).await;
        session.form_mut().set_amount(amount);

        match session.request_preview() {
            Err(CaptureError::Invalid(errors)) => {
                assert_eq!(errors.get(Field::Amount), Some(MSG_AMOUNT_POSITIVE));
            }
            other => panic!("amount {amount:?}: unexpected {other:?}"),
        }
        assert!(session.gate().is_idle());
        assert!(session.confirm(&api).await.is_err());
    }
}

#[tokio::test]
async fn rejected_submission_keeps_the_draft_for_resubmit() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/contributions"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({ "detail": "Receipt R-1001 already used" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), Duration::from_secs(5), Session::anonymous()).unwrap();
    let mut session = ravi_kumar_session(&api).await;
    session.request_preview().unwrap();

    let err = session.confirm(&api).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "rejected by server (422): Receipt R-1001 already used"
    );
    assert_eq!(session.form().draft().receipt_id, "R-1001");
    assert!(session.gate().is_idle());
    assert!(session.request_preview().is_ok());
}
