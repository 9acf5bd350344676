use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Longest slice of a response body kept on an error.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// All errors that can occur when using the MK.IO SDK.
#[derive(Error, Debug)]
pub enum MkioError {
    /// The service rejected the request (HTTP 400).
    #[error("bad request (HTTP {status}){}", DetailSuffix(.detail))]
    BadRequest {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// The token does not grant access to the resource (HTTP 403).
    #[error("forbidden (HTTP {status}){}", DetailSuffix(.detail))]
    Forbidden {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found (HTTP {status}){}", DetailSuffix(.detail))]
    NotFound {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// The service failed while handling the request (HTTP 500).
    #[error("internal server error (HTTP {status}){}", DetailSuffix(.detail))]
    InternalServerError {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status}{}", DetailSuffix(.detail))]
    UnexpectedStatus {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// A successful response carried no payload where one was required.
    #[error("response was empty which was not expected (HTTP {status})")]
    UnexpectedEmptyResponse { status: u16 },

    /// The caller broke a local contract, e.g. rendered a template with the
    /// wrong number of ids. Never reaches the network.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The client could not be configured.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload could not be encoded, or a response could not be decoded.
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The call was aborted through the client's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// A long-running operation exceeded the configured poll ceiling.
    #[error("long-running operation still in progress after {0:?}")]
    PollTimeout(Duration),

    /// The blocking adapter could not drive the request.
    #[error("blocking runtime failure: {0}")]
    Runtime(String),
}

/// A convenience alias for `Result<T, MkioError>`.
pub type Result<T> = std::result::Result<T, MkioError>;

impl MkioError {
    /// HTTP status carried by the error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            MkioError::BadRequest { status, .. }
            | MkioError::Forbidden { status, .. }
            | MkioError::NotFound { status, .. }
            | MkioError::InternalServerError { status, .. }
            | MkioError::UnexpectedStatus { status, .. }
            | MkioError::UnexpectedEmptyResponse { status } => Some(*status),
            MkioError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Detail string extracted from the service's error envelope.
    pub fn detail(&self) -> Option<&str> {
        match self {
            MkioError::BadRequest { detail, .. }
            | MkioError::Forbidden { detail, .. }
            | MkioError::NotFound { detail, .. }
            | MkioError::InternalServerError { detail, .. }
            | MkioError::UnexpectedStatus { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Raw (truncated) response body carried by the error.
    pub fn body(&self) -> Option<&str> {
        match self {
            MkioError::BadRequest { body, .. }
            | MkioError::Forbidden { body, .. }
            | MkioError::NotFound { body, .. }
            | MkioError::InternalServerError { body, .. }
            | MkioError::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `true` for 404 responses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MkioError::NotFound { .. })
    }
}

struct DetailSuffix<'a>(&'a Option<String>);

impl fmt::Display for DetailSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(detail) => write!(f, ": {detail}"),
            None => Ok(()),
        }
    }
}

/// Whether a successful response must carry a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    Payload,
    Nothing,
}

/// The error shapes the service is known to return on failure.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorEnvelope {
    Structured { error: ErrorObject },
    Bare { error: String },
    Unstructured(#[allow(dead_code)] serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorObject {
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorEnvelope {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    fn detail(self) -> Option<String> {
        match self {
            ErrorEnvelope::Structured { error } => error.detail.filter(|d| !d.is_empty()),
            ErrorEnvelope::Bare { error } => Some(error).filter(|d| !d.is_empty()),
            ErrorEnvelope::Unstructured(_) => None,
        }
    }
}

fn is_empty_payload(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.is_empty() || trimmed == "null"
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Map a response to `Ok(())` or the matching typed error.
pub(crate) fn classify(status: u16, body: &str, expect: Expect) -> Result<()> {
    if (200..300).contains(&status) {
        if expect == Expect::Payload && is_empty_payload(body) {
            return Err(MkioError::UnexpectedEmptyResponse { status });
        }
        return Ok(());
    }

    let detail = ErrorEnvelope::parse(body).and_then(ErrorEnvelope::detail);
    let body = truncate(body);

    Err(match status {
        400 => MkioError::BadRequest {
            status,
            body,
            detail,
        },
        403 => MkioError::Forbidden {
            status,
            body,
            detail,
        },
        404 => MkioError::NotFound {
            status,
            body,
            detail,
        },
        500 => MkioError::InternalServerError {
            status,
            body,
            detail,
        },
        _ => MkioError::UnexpectedStatus {
            status,
            body,
            detail,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_detail_is_extracted() {
        let err = classify(404, r#"{"error":{"detail":"x"}}"#, Expect::Payload).unwrap_err();
        assert!(matches!(err, MkioError::NotFound { status: 404, .. }));
        assert_eq!(err.detail(), Some("x"));
    }

    #[test]
    fn bare_error_string_is_used_as_detail() {
        let err = classify(404, r#"{"error":"y"}"#, Expect::Payload).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.detail(), Some("y"));
    }

    #[test]
    fn unknown_error_shape_has_no_detail() {
        let err = classify(400, r#"{"message":"nope"}"#, Expect::Payload).unwrap_err();
        assert!(matches!(err, MkioError::BadRequest { .. }));
        assert_eq!(err.detail(), None);
        assert_eq!(err.body(), Some(r#"{"message":"nope"}"#));
    }

    #[test]
    fn structured_error_without_detail_has_no_detail() {
        let err = classify(403, r#"{"error":{"code":"denied"}}"#, Expect::Payload).unwrap_err();
        assert!(matches!(err, MkioError::Forbidden { .. }));
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn non_json_error_body_is_kept_raw() {
        let err = classify(500, "gateway exploded", Expect::Payload).unwrap_err();
        assert!(matches!(err, MkioError::InternalServerError { .. }));
        assert_eq!(err.body(), Some("gateway exploded"));
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn other_statuses_are_unexpected() {
        let err = classify(409, "{}", Expect::Payload).unwrap_err();
        assert!(matches!(err, MkioError::UnexpectedStatus { status: 409, .. }));
        assert_eq!(err.status_code(), Some(409));
    }

    #[test]
    fn success_with_empty_body_is_rejected_when_payload_expected() {
        for body in ["", "   ", "null"] {
            let err = classify(200, body, Expect::Payload).unwrap_err();
            assert!(matches!(err, MkioError::UnexpectedEmptyResponse { status: 200 }));
        }
    }

    #[test]
    fn success_with_empty_body_is_fine_when_nothing_expected() {
        assert!(classify(204, "", Expect::Nothing).is_ok());
        assert!(classify(200, "{}", Expect::Payload).is_ok());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "é".repeat(MAX_ERROR_BODY_CHARS + 100);
        let err = classify(502, &body, Expect::Payload).unwrap_err();
        assert_eq!(err.body().unwrap().chars().count(), MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn display_includes_detail() {
        let err = classify(400, r#"{"error":{"detail":"bad name"}}"#, Expect::Payload).unwrap_err();
        assert_eq!(err.to_string(), "bad request (HTTP 400): bad name");

        let err = classify(418, "", Expect::Payload).unwrap_err();
        assert_eq!(err.to_string(), "unexpected HTTP status 418");
    }
}
