use http::Method;
use thiserror::Error;

use crate::auth::StoreError;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// A transition was requested without the credentials it needs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request timed out at {method} {path}")]
    Timeout { method: Method, path: String },

    #[error("Return code {status} at {method} {path}")]
    Http {
        status: u16,
        method: Method,
        path: String,
        body: String,
    },

    #[error("Can't parse JSON at {method} {path}: {source}")]
    Parse {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Incorrect values for {type_name}: {source}")]
    Decode {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error at {method} {path}: {source}")]
    Network {
        method: Method,
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No students available for this account")]
    EmptyRoster,

    #[error("Credential storage error: {0}")]
    Storage(#[from] StoreError),
}

impl Error {
    pub(crate) fn http(status: http::StatusCode, method: Method, path: &str, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body);
        Error::Http {
            status: status.as_u16(),
            method,
            path: path.to_string(),
            body: truncate_body(&body),
        }
    }

    /// HTTP status for [`Error::Http`], `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error is fixed by supplying (other) credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Configuration(_)) || matches!(self.status(), Some(401 | 403))
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn test_truncate_body_long_multibyte() {
        let body = "ж".repeat(400);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("(truncated, 800 total bytes)"));
        assert!(truncated.starts_with("жж"));
    }

    #[test]
    fn test_status_and_auth_classification() {
        let err = Error::http(http::StatusCode::UNAUTHORIZED, Method::GET, "/students", b"");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_auth_error());

        let err = Error::http(http::StatusCode::NOT_FOUND, Method::GET, "/students", b"");
        assert!(!err.is_auth_error());
        assert_eq!(err.to_string(), "Return code 404 at GET /students");

        assert!(Error::Configuration("no refresh token".into()).is_auth_error());
        assert_eq!(Error::EmptyRoster.status(), None);
    }
}
