//! REST client for the Chanda backend.
//!
//! Every call is a single request: no retries, no caching. Non-2xx answers
//! become [`ConsoleError::Api`] (or [`ConsoleError::NotFound`]) carrying the
//! backend's message so callers can tell user-fixable 4xx answers apart from
//! server failures.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::errors::{ConsoleError, Result};
use crate::models::{
    ContributionRecord, ContributionSummary, Contributor, ContributorUpdate, DashboardResponse,
    Expense, ExpensePayload, LoginRequest, LoginResponse, PaymentsResponse, Tola,
    TolaContributor,
};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config, session: Session) -> Result<Self> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.http_timeout_secs),
            session,
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Swap the session after login/logout.
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    // ========== Auth ==========

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        self.post("/api/v1/users/login", &LoginRequest { username, password })
            .await
    }

    // ========== Reference data ==========

    pub async fn list_tolas(&self) -> Result<Vec<Tola>> {
        self.get("/api/v1/tolas").await
    }

    pub async fn list_tola_contributors(&self, tola_id: i64) -> Result<Vec<TolaContributor>> {
        self.get(&format!("/api/v1/tolas/{tola_id}/contributors"))
            .await
    }

    pub async fn list_contributors(&self) -> Result<Vec<Contributor>> {
        self.get("/api/v1/contributors").await
    }

    pub async fn update_contributor(
        &self,
        contributor_id: i64,
        update: &ContributorUpdate,
    ) -> Result<Value> {
        self.put(&format!("/api/v1/contributors/{contributor_id}"), update)
            .await
    }

    // ========== Contributions ==========

    pub async fn create_contribution<B: Serialize>(&self, body: &B) -> Result<ContributionRecord> {
        self.post("/api/v1/contributions", body).await
    }

    pub async fn list_contributions(&self) -> Result<Vec<ContributionSummary>> {
        self.get("/api/v1/contributions").await
    }

    pub async fn tola_payments(&self, tola_id: i64) -> Result<PaymentsResponse> {
        self.get(&format!("/api/v1/contributions/tola/{tola_id}/payments"))
            .await
    }

    // ========== Expenses ==========

    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.get("/api/v1/expenses").await
    }

    pub async fn get_expense(&self, id: i64) -> Result<Expense> {
        self.get(&format!("/api/v1/expenses/{id}")).await
    }

    pub async fn create_expense(&self, payload: &ExpensePayload) -> Result<Expense> {
        self.post("/api/v1/expenses", payload).await
    }

    pub async fn update_expense(&self, id: i64, payload: &ExpensePayload) -> Result<Expense> {
        self.put(&format!("/api/v1/expenses/{id}"), payload).await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("/api/v1/expenses/{id}"));
        let response = self.authorize(self.client.delete(&url)).send().await?;
        check_status(response).await.map(|_| ())
    }

    // ========== Dashboard ==========

    pub async fn dashboard(&self) -> Result<DashboardResponse> {
        self.get("/api/v1/dashboard").await
    }

    // ─────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {path}");
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {path}");
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("PUT {path}");
        let response = self
            .authorize(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    if status == StatusCode::NOT_FOUND {
        Err(ConsoleError::NotFound(message))
    } else {
        Err(ConsoleError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pull a human-readable message out of an error body.
///
/// Backends in this family answer `{"detail": "..."}`, `{"detail": [{"msg": ...}]}`
/// or `{"message": "..."}`; anything else is passed through verbatim.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    match value.get("detail").or_else(|| value.get("message")) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                Some(trimmed.to_string())
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => Some(trimmed.to_string()),
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, session: Session) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5), session).unwrap()
    }

    #[test]
    fn base_url_is_normalized() {
        let api = ApiClient::new(
            "http://localhost:8000/",
            Duration::from_secs(1),
            Session::anonymous(),
        )
        .unwrap();
        assert_eq!(api.url("/api/v1/tolas"), "http://localhost:8000/api/v1/tolas");
    }

    #[test]
    fn error_message_shapes() {
        assert_eq!(
            error_message(r#"{"detail":"Receipt already used"}"#).as_deref(),
            Some("Receipt already used")
        );
        assert_eq!(
            error_message(r#"{"detail":[{"msg":"field required"},{"msg":"bad date"}]}"#)
                .as_deref(),
            Some("field required; bad date")
        );
        assert_eq!(
            error_message(r#"{"message":"nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("   "), None);
    }

    #[tokio::test]
    async fn lists_tolas() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tolas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1, "tola_name": "North Tola", "village": { "id": 9, "name": "Rampur" } },
                { "id": 2, "tola_name": "South Tola" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let tolas = client(&server, Session::anonymous())
            .list_tolas()
            .await
            .unwrap();
        assert_eq!(tolas.len(), 2);
        assert_eq!(tolas[1].tola_name, "South Tola");
    }

    #[tokio::test]
    async fn sends_bearer_token_when_logged_in() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/expenses"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Session::authenticated("secret", None));
        assert!(api.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/users/login"))
            .and(body_json(serde_json::json!({ "username": "admin", "password": "pw" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "abc" })),
            )
            .mount(&server)
            .await;

        let token = client(&server, Session::anonymous())
            .login("admin", "pw")
            .await
            .unwrap();
        assert_eq!(token.access_token, "abc");
    }

    #[tokio::test]
    async fn maps_client_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/expenses/9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "detail": "Expense not found" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/dashboard"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = client(&server, Session::anonymous());
        match api.get_expense(9).await {
            Err(ConsoleError::NotFound(msg)) => assert_eq!(msg, "Expense not found"),
            other => panic!("unexpected: {other:?}"),
        }
        match api.dashboard().await {
            Err(ConsoleError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/expenses/4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, Session::anonymous())
            .delete_expense(4)
            .await
            .unwrap();
    }
}
