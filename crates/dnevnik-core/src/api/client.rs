//! API client for communicating with the dnevnik REST API.
//!
//! This module provides the `ApiClient` struct, which owns the current bearer
//! token and turns every call into one JSON request against [`BASE_URL`].

use std::time::Duration;

use http::{header, Method};
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use super::HttpClient;
use crate::auth::Credentials;
use crate::decode::decode;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Base URL every request path is appended to
pub const BASE_URL: &str = "https://dnevnik.egov66.ru/api";

/// HTTP request timeout.
/// A timed out request fails once; it is never retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_PATH: &str = "/auth/Auth/Login";
const REFRESH_PATH: &str = "/auth/Token/Refresh";
const REVOKE_PATH: &str = "/auth/Token/Revoke";

/// API client for the dnevnik portal.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient<H = reqwest::Client> {
    http: H,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl ApiClient<reqwest::Client> {
    /// Create a new API client backed by reqwest
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http(client))
    }
}

impl<H: HttpClient> ApiClient<H> {
    /// Create a client that sends requests through `http`
    pub fn with_http(http: H) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            token: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Point the client at another deployment of the portal API
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bearer token for subsequent requests.
    /// Requests already sent are unaffected.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Authentication =====

    /// Exchange login and password for a fresh set of credentials
    pub async fn login(&self, login: &str, password: &str) -> Result<Credentials> {
        let body = json!({ "login": login, "password": password });
        decode(self.post(LOGIN_PATH, &body).await?)
    }

    /// Rotate credentials using a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credentials> {
        let body = json!({ "refreshToken": refresh_token });
        decode(self.post(REFRESH_PATH, &body).await?)
    }

    /// Invalidate the server-side session bound to `refresh_token`
    pub async fn revoke(&self, refresh_token: &str) -> Result<()> {
        let body = json!({ "refreshToken": refresh_token });
        self.post(REVOKE_PATH, &body).await?;
        Ok(())
    }

    // ===== Dispatch =====

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// Send one request and parse the JSON response.
    ///
    /// A successful response without a body yields an empty JSON object.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let request = self.build_request(method.clone(), path, query, body)?;

        let response = match tokio::time::timeout(self.timeout, self.http.send_http(request)).await {
            Err(_) => {
                return Err(Error::Timeout {
                    method,
                    path: path.to_string(),
                })
            }
            Ok(Err(e)) if H::is_timeout(&e) => {
                return Err(Error::Timeout {
                    method,
                    path: path.to_string(),
                })
            }
            Ok(Err(e)) => {
                return Err(Error::Network {
                    method,
                    path: path.to_string(),
                    source: Box::new(e),
                })
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "Response received");

        if !status.is_success() {
            return Err(Error::http(status, method, path, response.body()));
        }

        let body = response.body();
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_slice(body).map_err(|source| Error::Parse {
            method,
            path: path.to_string(),
            source,
        })
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<http::Request<Vec<u8>>> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }

        let mut builder = http::Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(header::ACCEPT, "application/json");

        if let Some(ref token) = self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let payload = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                body.to_string().into_bytes()
            }
            None => Vec::new(),
        };

        builder
            .body(payload)
            .map_err(|e| Error::Configuration(format!("invalid request to {}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use super::*;

    enum Reply {
        Status(u16, &'static str),
        Refused,
        Hang,
    }

    #[derive(Clone, Default)]
    struct MockClient {
        replies: Arc<Mutex<VecDeque<Reply>>>,
        log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
    }

    impl MockClient {
        fn push(&self, reply: Reply) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn last_request(&self) -> http::Request<Vec<u8>> {
            let log = self.log.lock().unwrap();
            let request = log.last().expect("no request sent");
            let mut copy = http::Request::new(request.body().clone());
            *copy.method_mut() = request.method().clone();
            *copy.uri_mut() = request.uri().clone();
            *copy.headers_mut() = request.headers().clone();
            copy
        }
    }

    impl HttpClient for MockClient {
        type Error = std::io::Error;

        fn send_http(
            &self,
            request: http::Request<Vec<u8>>,
        ) -> impl Future<Output = std::result::Result<http::Response<Vec<u8>>, Self::Error>> + Send
        {
            self.log.lock().unwrap().push(request);
            let reply = self.replies.lock().unwrap().pop_front().expect("no queued reply");
            async move {
                match reply {
                    Reply::Status(status, body) => Ok(http::Response::builder()
                        .status(status)
                        .body(body.as_bytes().to_vec())
                        .unwrap()),
                    Reply::Refused => Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    )),
                    Reply::Hang => std::future::pending().await,
                }
            }
        }
    }

    fn client(mock: &MockClient) -> ApiClient<MockClient> {
        ApiClient::with_http(mock.clone())
    }

    #[tokio::test]
    async fn test_empty_body_yields_empty_object() {
        let mock = MockClient::default();
        mock.push(Reply::Status(200, ""));

        let value = client(&mock).get("/students", &[]).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let mock = MockClient::default();
        mock.push(Reply::Status(200, "not json"));

        let err = client(&mock).get("/students", &[]).await.unwrap_err();
        match err {
            Error::Parse { method, path, .. } => {
                assert_eq!(method, Method::GET);
                assert_eq!(path, "/students");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_http_error() {
        let mock = MockClient::default();
        mock.push(Reply::Status(404, "{\"message\":\"missing\"}"));

        let err = client(&mock).get("/homework", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        match err {
            Error::Http { path, body, .. } => {
                assert_eq!(path, "/homework");
                assert!(body.contains("missing"));
            }
            other => panic!("expected http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redirect_status_is_http_error() {
        let mock = MockClient::default();
        mock.push(Reply::Status(302, ""));

        let err = client(&mock).get("/students", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(302));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let mock = MockClient::default();
        mock.push(Reply::Refused);

        let err = client(&mock).post("/auth/Token/Revoke", &json!({})).await.unwrap_err();
        assert!(matches!(err, Error::Network { method, .. } if method == Method::POST));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_request_times_out() {
        let mock = MockClient::default();
        mock.push(Reply::Hang);

        let err = client(&mock).get("/announcements", &[]).await.unwrap_err();
        match err {
            Error::Timeout { method, path } => {
                assert_eq!(method, Method::GET);
                assert_eq!(path, "/announcements");
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_carries_bearer_token_and_query() {
        let mock = MockClient::default();
        mock.push(Reply::Status(200, "[]"));
        mock.push(Reply::Status(200, "[]"));

        let mut api = client(&mock);
        api.get("/students", &[]).await.unwrap();
        assert!(mock.last_request().headers().get(header::AUTHORIZATION).is_none());

        api.set_token("abc");
        api.get("/homework", &[("studentId", "s1".to_string()), ("date", "2024-09-02".to_string())])
            .await
            .unwrap();

        let request = mock.last_request();
        assert_eq!(
            request.uri().to_string(),
            "https://dnevnik.egov66.ru/api/homework?studentId=s1&date=2024-09-02"
        );
        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer abc");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock = MockClient::default();
        mock.push(Reply::Status(
            200,
            r#"{"accessToken":"A","refreshToken":"R","accessTokenExpirationDate":"2030-01-01T00:00:00+05:00"}"#,
        ));

        let creds = client(&mock).login("user", "pass").await.unwrap();
        assert_eq!(creds.access_token, "A");
        assert_eq!(creds.refresh_token, "R");

        let request = mock.last_request();
        assert_eq!(request.method(), Method::POST);
        assert!(request.uri().path().ends_with("/auth/Auth/Login"));
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
        let sent: Value = serde_json::from_slice(request.body()).unwrap();
        assert_eq!(sent, json!({ "login": "user", "password": "pass" }));
    }

    #[tokio::test]
    async fn test_malformed_credentials_are_decode_error() {
        let mock = MockClient::default();
        mock.push(Reply::Status(200, r#"{"accessToken":"A"}"#));

        let err = client(&mock).refresh("R").await.unwrap_err();
        assert!(matches!(err, Error::Decode { type_name: "Credentials", .. }));
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let api = ApiClient::with_http(MockClient::default()).with_base_url("http://localhost:8080/api/");
        assert_eq!(api.base_url(), "http://localhost:8080/api");
    }
}
