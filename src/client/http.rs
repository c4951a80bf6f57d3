//! [`ConsentSource`] over HTTP.

use super::popup::ConsentSource;
use super::ClientError;
use crate::middleware::auth::SESSION_COOKIE;
use crate::models::CookieResponse;
use crate::routes::api::{ConsentCheckResponse, LlmConsentResponse, UserInfoResponse};
use crate::routes::consent::SaveConsentRequest;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Talks to a running server with a fixed session cookie.
#[derive(Clone)]
pub struct HttpConsentClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl HttpConsentClient {
    pub fn new(base_url: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        }
    }

    /// Log in with a Prolific ID and keep the session cookie the server sets.
    pub async fn login(base_url: &str, prolific_id: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = http
            .post(format!("{base_url}/login"))
            .json(&json!({ "prolificId": prolific_id }))
            .send()
            .await?;
        let response = check_status(response).await?;

        let session_id = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_from_set_cookie)
            .ok_or_else(|| ClientError::Rejected("login response set no session cookie".to_string()))?;

        Ok(Self {
            http,
            base_url,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.session_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .header(COOKIE, self.cookie())
            .send()
            .await?;
        decode(check_status(response).await?).await
    }
}

impl ConsentSource for HttpConsentClient {
    async fn user_info(&self) -> Result<UserInfoResponse, ClientError> {
        self.get_json("/user-info").await
    }

    async fn check_consent(&self) -> Result<ConsentCheckResponse, ClientError> {
        self.get_json("/check-consent").await
    }

    async fn llm_consent(&self) -> Result<LlmConsentResponse, ClientError> {
        self.get_json("/get-llm-consent").await
    }

    async fn save_consent(
        &self,
        participant_id: &str,
        response: CookieResponse,
        report_text: Option<&str>,
    ) -> Result<(), ClientError> {
        let body = SaveConsentRequest {
            prolific_id: Some(participant_id.to_string()),
            response: Some(response.to_string()),
            report_text: report_text.map(str::to_string),
        };
        let response = self
            .http
            .post(self.url("/save-consent"))
            .header(COOKIE, self.cookie())
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ClientError::Status`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Decode a 2xx body, treating an `error` field as a failure.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let value: serde_json::Value = response.json().await?;
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        return Err(ClientError::Rejected(error.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Extract the session token from one `Set-Cookie` header value.
fn session_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
}
