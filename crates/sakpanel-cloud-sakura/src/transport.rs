//! Shared HTTP plumbing for the Sakura Cloud backends
//!
//! Every backend client wraps one [`HttpBackend`]: a pooled `reqwest::Client`
//! plus the backend's auth convention. Transport and API failures are mapped
//! to [`CloudError::Backend`] tagged with the originating backend kind.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use sakpanel_cloud::{BackendKind, CloudError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Access token pair from a profile
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, access_token_secret: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .finish()
    }
}

/// How a backend authenticates requests
#[derive(Clone)]
pub enum Auth {
    /// Token/secret pair presented as HTTP basic auth
    Basic { username: String, password: String },
    Bearer(String),
    Anonymous,
}

impl Auth {
    pub fn basic(creds: &Credentials) -> Self {
        Auth::Basic {
            username: creds.access_token.clone(),
            password: creds.access_token_secret.clone(),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Anonymous => request,
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { .. } => f.write_str("Basic(***)"),
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
            Auth::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// A backend-bound HTTP handle
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    kind: BackendKind,
    auth: Auth,
}

impl HttpBackend {
    pub fn new(http: reqwest::Client, kind: BackendKind, auth: Auth) -> Self {
        Self { http, kind, auth }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Request with this backend's auth applied
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!("[{}] {} {}", self.kind.as_str(), method, url);
        self.auth.apply(self.http.request(method, url))
    }

    /// Send without checking the status code
    pub async fn send_raw(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>)> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        tracing::debug!("[{}] status={}", self.kind.as_str(), status.as_u16());
        Ok((status, body.to_vec()))
    }

    /// Send and require a 2xx status
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        tracing::debug!("[{}] status={}", self.kind.as_str(), status.as_u16());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(self.status_error(status, &body))
    }

    /// Send, require 2xx and decode the JSON body
    pub async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.decode(status, &body)
    }

    /// Send, require 2xx and discard the body
    pub async fn unit(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.json(self.request(Method::GET, url)).await
    }

    /// Decode a JSON body. An empty body decodes as `null`.
    pub fn decode<T: DeserializeOwned>(&self, status: StatusCode, body: &[u8]) -> Result<T> {
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            body
        };
        serde_json::from_slice(body).map_err(|e| {
            CloudError::backend(
                self.kind,
                Some(status.as_u16()),
                format!("unexpected response body: {}", e),
            )
        })
    }

    pub fn status_error(&self, status: StatusCode, body: &[u8]) -> CloudError {
        let message = error_message(body).unwrap_or_else(|| {
            format!("{} API returned status {}", self.kind, status.as_u16())
        });
        tracing::debug!("[{}] {}", self.kind.as_str(), message);
        CloudError::backend(self.kind, Some(status.as_u16()), message)
    }

    pub fn transport_error(&self, err: reqwest::Error) -> CloudError {
        CloudError::backend(
            self.kind,
            err.status().map(|s| s.as_u16()),
            err.to_string(),
        )
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// Understands the IaaS (`error_msg`), AppRun (`error.message`) and generic
/// (`message`, `detail`) shapes.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    for key in ["error_msg", "message", "detail", "error_description"] {
        if let Some(message) = non_empty(value.get(key)) {
            return Some(message);
        }
    }
    match value.get("error") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(error @ Value::Object(_)) => non_empty(error.get("message")),
        _ => None,
    }
}

/// Join a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Prefix `https://` unless the address already names a scheme.
pub fn ensure_scheme(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.starts_with("https://") || address.starts_with("http://") {
        address.to_string()
    } else {
        format!("https://{}", address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(br#"{"is_fatal":true,"error_code":"not_found","error_msg":"not found"}"#),
            Some("not found".to_string())
        );
        assert_eq!(
            error_message(br#"{"error":{"code":403,"message":"forbidden"}}"#),
            Some("forbidden".to_string())
        );
        assert_eq!(
            error_message(br#"{"error":"bad request"}"#),
            Some("bad request".to_string())
        );
        assert_eq!(error_message(b"<html>oops</html>"), None);
        assert_eq!(error_message(b""), None);
        assert_eq!(error_message(br#"{"message":""}"#), None);
    }

    #[test]
    fn test_status_error_without_body_is_generic() {
        let backend = HttpBackend::new(
            reqwest::Client::new(),
            BackendKind::AppRunShared,
            Auth::Anonymous,
        );
        let err = backend.status_error(StatusCode::BAD_GATEWAY, b"");
        match err {
            CloudError::Backend {
                kind,
                status,
                message,
            } => {
                assert_eq!(kind, BackendKind::AppRunShared);
                assert_eq!(status, Some(502));
                assert_eq!(message, "AppRun shared API returned status 502");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let backend = HttpBackend::new(reqwest::Client::new(), BackendKind::Kms, Auth::Anonymous);
        let value: Option<Vec<String>> = backend.decode(StatusCode::OK, b"  ").unwrap();
        assert!(value.is_none());

        let err = backend
            .decode::<Vec<String>>(StatusCode::OK, b"{")
            .unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a/b/", "/c"), "https://a/b/c");
        assert_eq!(join_url("https://a/b", "c/d"), "https://a/b/c/d");
    }

    #[test]
    fn test_ensure_scheme() {
        assert_eq!(ensure_scheme("s3.isk01.sakurastorage.jp"), "https://s3.isk01.sakurastorage.jp");
        assert_eq!(ensure_scheme("http://127.0.0.1:5000/"), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("tok-123", "hunter2");
        for debug in [format!("{:?}", creds), format!("{:?}", Auth::basic(&creds))] {
            assert!(!debug.contains("hunter2"));
            assert!(!debug.contains("tok-123"));
        }
        assert!(!format!("{:?}", Auth::Bearer("abc".to_string())).contains("abc"));
    }
}
