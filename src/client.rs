use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::form::Payload;
use crate::session::Session;

/// Shown when the server gives no usable message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

const LOGIN_PATH: &str = "auth/login";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 outside of login; the stored token has already been cleared.
    #[error("session expired, log in again")]
    SessionExpired,
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint `{0}`")]
    Endpoint(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    /// Text for a failure toast: the server's message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::SessionExpired => "Session expired. Please log in again.".to_string(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Accepts both `{"data": ...}` and bare bodies.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(v) => v,
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str::<Envelope<T>>(body)?.into_inner())
}

fn server_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|k| v.get(k).and_then(|m| m.as_str()))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn token_from(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let pick = |v: &serde_json::Value| {
        ["token", "accessToken"]
            .iter()
            .find_map(|k| v.get(k).and_then(|t| t.as_str()).map(str::to_string))
    };
    pick(&v).or_else(|| v.get("data").and_then(pick))
}

/// HTTP transport for the admin API. Attaches the stored bearer token to every call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Session,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("greentech-admin/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self { http: builder.build()?, base: normalize_base(base_url)?, session })
    }

    pub fn session(&self) -> &Session { &self.session }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|_| ApiError::Endpoint(path.to_string()))
    }

    /// Exchange credentials for a token and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint(LOGIN_PATH)?;
        let body = serde_json::json!({ "email": email, "password": password });
        let req = self.http.post(url).json(&body);
        let text = self.execute(req, false).await?;
        let token = token_from(&text).ok_or_else(|| ApiError::Status {
            status: 200,
            message: "Login response did not include a token".to_string(),
        })?;
        self.session.store(&token).await?;
        debug!("logged in as {}", email);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.clear().await?;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.http.get(self.endpoint(path)?);
        let body = self.execute(req, true).await?;
        decode(&body)
    }

    /// POST/PUT a payload; returns the raw response body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<String, ApiError> {
        let req = self.http.request(method, self.endpoint(path)?);
        let req = match payload {
            Payload::Json(v) => req.json(&v),
            Payload::Multipart(p) => req.multipart(p.into_form()?),
        };
        self.execute(req, true).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.http.delete(self.endpoint(path)?);
        self.execute(req, true).await.map(|_| ())
    }

    async fn execute(&self, req: RequestBuilder, authed: bool) -> Result<String, ApiError> {
        let req = match (authed, self.session.token().await?) {
            (true, Some(token)) => req.bearer_auth(token),
            _ => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        debug!(url = %resp.url(), %status, "api response");
        let body = resp.text().await?;

        if authed && status == StatusCode::UNAUTHORIZED {
            warn!("api rejected the stored token; clearing session");
            self.session.clear().await?;
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            let message = server_message(&body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
            return Err(ApiError::Status { status: status.as_u16(), message });
        }
        Ok(body)
    }
}

/// Join-friendly base: `http://host/api` must become `http://host/api/`.
pub(crate) fn normalize_base(base_url: &str) -> anyhow::Result<Url> {
    let mut s = base_url.trim().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Url::parse(&s).map_err(|e| anyhow::anyhow!("invalid base URL `{base_url}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_keeps_its_path_prefix() {
        let base = normalize_base("http://localhost:5000/api").unwrap();
        assert_eq!(base.join("about/all").unwrap().as_str(), "http://localhost:5000/api/about/all");
        let base = normalize_base("https://cms.example.com/api/").unwrap();
        assert_eq!(base.join("hero/3").unwrap().as_str(), "https://cms.example.com/api/hero/3");
    }

    #[test]
    fn envelope_accepts_wrapped_and_bare() {
        let a: Vec<i64> = decode("[1,2]").unwrap();
        let b: Vec<i64> = decode(r#"{"data":[1,2],"success":true}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn server_message_prefers_message_then_error() {
        let body = r#"{"message":"Title is required"}"#;
        assert_eq!(server_message(body).as_deref(), Some("Title is required"));
        assert_eq!(server_message(r#"{"error":"Not found"}"#).as_deref(), Some("Not found"));
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message("<html>502</html>"), None);
    }

    #[test]
    fn token_found_at_top_level_or_in_data() {
        assert_eq!(token_from(r#"{"token":"a"}"#).as_deref(), Some("a"));
        assert_eq!(token_from(r#"{"data":{"accessToken":"b"}}"#).as_deref(), Some("b"));
        assert_eq!(token_from(r#"{"ok":true}"#), None);
    }

    #[test]
    fn user_message_falls_back() {
        let e = ApiError::Status { status: 422, message: "Fee must be positive".into() };
        assert_eq!(e.user_message(), "Fee must be positive");
        assert_eq!(ApiError::Endpoint("x".into()).user_message(), FALLBACK_MESSAGE);
    }
}
