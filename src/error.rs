//! Error types for the metadata client.

use crate::types::value_text;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a server failure carries no reason phrase.
pub(crate) const SERVER_ERROR_MESSAGE: &str = "Internal Error on Server";

/// Error types for the metadata client.
#[derive(Error, Debug)]
pub enum Error {
    /// The service failed with a 5xx status.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Reason phrase or a fixed message
        message: String,
    },

    /// The service rejected the request with a 4xx status.
    #[error("Request error ({status}): {message}")]
    Request {
        /// HTTP status code
        status: u16,
        /// The `message` field of the response body
        message: String,
    },

    /// The legacy service reported an `"error code"` in the response body.
    #[error("Attribute error: {0}")]
    Attribute(String),

    /// The requested attribute is missing from the returned mapping.
    #[error("Attribute `{attribute}` not found for variable `{variable}`")]
    AttributeNotFound {
        /// Variable that was looked up
        variable: String,
        /// Attribute that was requested
        attribute: String,
    },

    /// Network or HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Classify a 4xx or 5xx response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        Self::from_body(status, &body)
    }

    /// Classify a 4xx or 5xx status with its raw body.
    ///
    /// The 5xx message is the status code's standard reason phrase; `reqwest`
    /// does not expose the phrase the server actually sent. A 4xx message is
    /// the body's `message` field, with non-string values rendered as compact
    /// JSON.
    pub(crate) fn from_body(status: StatusCode, body: &[u8]) -> Self {
        if status.is_server_error() {
            return Error::Server {
                status: status.as_u16(),
                message: reason(status).unwrap_or(SERVER_ERROR_MESSAGE).to_string(),
            };
        }

        // Try to get the server's explanation from the body
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .and_then(|err| err.message)
            .map(value_text)
            .or_else(|| reason(status).map(str::to_string))
            .unwrap_or_else(|| "Unknown error".into());

        Error::Request {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } | Error::Request { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true for 5xx failures.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// Returns true for 4xx failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Request { .. })
    }
}

fn reason(status: StatusCode) -> Option<&'static str> {
    status.canonical_reason().filter(|r| !r.is_empty())
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    message: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_helpers() {
        let server = Error::Server {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert!(server.is_server_error());
        assert!(!server.is_client_error());
        assert_eq!(server.status(), Some(503));

        let request = Error::Request {
            status: 404,
            message: "Variable not found".into(),
        };
        assert!(request.is_client_error());
        assert_eq!(request.status(), Some(404));

        let missing = Error::AttributeNotFound {
            variable: "ce3datey".into(),
            attribute: "topic".into(),
        };
        assert_eq!(missing.status(), None);
        assert!(!missing.is_server_error());
    }

    #[test]
    fn test_display() {
        let err = Error::Request {
            status: 400,
            message: "Invalid filter".into(),
        };
        assert_eq!(err.to_string(), "Request error (400): Invalid filter");

        let err = Error::AttributeNotFound {
            variable: "cm1relf".into(),
            attribute: "label".into(),
        };
        assert_eq!(
            err.to_string(),
            "Attribute `label` not found for variable `cm1relf`"
        );
    }

    #[test]
    fn test_request_message_from_body() {
        let err = Error::from_body(
            StatusCode::NOT_FOUND,
            br#"{"message": "Variable cm9xyz not found"}"#,
        );
        assert!(matches!(
            err,
            Error::Request { status: 404, ref message } if message == "Variable cm9xyz not found"
        ));

        // Field-keyed messages are kept as JSON text
        let err = Error::from_body(
            StatusCode::BAD_REQUEST,
            br#"{"message": {"q": "Invalid operator: between"}}"#,
        );
        assert!(matches!(
            err,
            Error::Request { status: 400, ref message } if message == r#"{"q":"Invalid operator: between"}"#
        ));

        let err = Error::from_body(StatusCode::BAD_REQUEST, b"<html>bad</html>");
        assert!(matches!(
            err,
            Error::Request { ref message, .. } if message == "Bad Request"
        ));
    }

    #[test]
    fn test_server_message_ignores_body() {
        let err = Error::from_body(
            StatusCode::BAD_GATEWAY,
            br#"{"message": "upstream down"}"#,
        );
        assert!(matches!(
            err,
            Error::Server { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(
            reason(StatusCode::INTERNAL_SERVER_ERROR),
            Some("Internal Server Error")
        );
        assert_eq!(reason(StatusCode::from_u16(599).unwrap()), None);
    }
}
