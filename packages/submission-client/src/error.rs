use thiserror::Error;

use crate::queue::QueueError;
use crate::review_cache::CacheError;

/// Errors surfaced to the client application.
///
/// The server kinds arrive as `extensions.code` on GraphQL errors. Anything
/// that never got an answer from the server is `TransientNetwork`.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    SizeExceeded {
        message: String,
        limit: Option<i64>,
        /// The server allows one client-side reduction pass
        reducible: bool,
    },

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidStatus(String),

    /// The server answered but failed on its side
    #[error("Server error: {0}")]
    Internal(String),

    /// The server refused the request itself (malformed or unknown
    /// operation). Sending it again cannot help.
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    TransientNetwork(String),

    #[error("Local queue error: {0}")]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Busy(#[from] CacheError),
}

impl ClientError {
    /// Build from a GraphQL error's `extensions.code`.
    ///
    /// Field errors always carry a code; an error without one failed before
    /// execution (parse or document validation).
    pub fn from_code(code: Option<&str>, message: String, extensions: &serde_json::Value) -> Self {
        match code {
            Some("validation_error") => Self::Validation(message),
            Some("size_exceeded") => Self::SizeExceeded {
                message,
                limit: extensions.get("limit").and_then(|v| v.as_i64()),
                reducible: extensions
                    .get("reducible")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
            },
            Some("permission_denied") => Self::PermissionDenied(message),
            Some("invalid_status") => Self::InvalidStatus(message),
            Some(_) => Self::Internal(message),
            None => Self::Rejected(message),
        }
    }

    /// Stable kind, matching the server's codes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::SizeExceeded { .. } => "size_exceeded",
            Self::PermissionDenied(_) => "permission_denied",
            Self::InvalidStatus(_) => "invalid_status",
            Self::Internal(_) => "internal_error",
            Self::Rejected(_) => "request_rejected",
            Self::TransientNetwork(_) => "transient_network",
            Self::Queue(_) => "queue_error",
            Self::Busy(_) => "busy",
        }
    }

    /// Worth sending again later without changing the input
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_) | Self::Internal(_))
    }

    /// Text safe to show an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => format!("Please check your entry: {}", message),
            Self::SizeExceeded {
                limit: Some(limit), ..
            } => format!(
                "This file is too large. The limit is {} MB.",
                limit / (1024 * 1024)
            ),
            Self::SizeExceeded { .. } => "This file is too large.".to_string(),
            Self::PermissionDenied(_) => "You don't have permission to do that.".to_string(),
            Self::InvalidStatus(_) => {
                "This item has changed since you loaded it. Refresh to see its current state."
                    .to_string()
            }
            Self::Internal(_) => "Something went wrong. Please try again later.".to_string(),
            Self::Rejected(_) => {
                "The server could not accept this request. Updating the app may help.".to_string()
            }
            Self::TransientNetwork(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Queue(_) => "Could not save your submission on this device.".to_string(),
            Self::Busy(_) => "This item is still being processed.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Internal(err.to_string())
        } else {
            Self::TransientNetwork(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_exceeded_reads_extensions() {
        let err = ClientError::from_code(
            Some("size_exceeded"),
            "image is too big".to_string(),
            &json!({ "code": "size_exceeded", "limit": 8388608, "reducible": true }),
        );
        match &err {
            ClientError::SizeExceeded {
                limit, reducible, ..
            } => {
                assert_eq!(*limit, Some(8388608));
                assert!(*reducible);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.user_message(), "This file is too large. The limit is 8 MB.");
    }

    #[test]
    fn test_unknown_code_is_internal() {
        let err = ClientError::from_code(Some("teapot"), "x".to_string(), &json!({}));
        assert_eq!(err.kind(), "internal_error");
        assert!(err.is_transient());
    }

    #[test]
    fn test_validation_is_not_transient() {
        let err = ClientError::from_code(Some("validation_error"), "bad".to_string(), &json!({}));
        assert!(!err.is_transient());
        assert!(err.user_message().contains("bad"));
    }

    #[test]
    fn test_code_less_error_is_terminal() {
        let err = ClientError::from_code(
            None,
            "Unknown argument \"colour\" on field \"submitContribution\"".to_string(),
            &serde_json::Value::Null,
        );
        assert_eq!(err.kind(), "request_rejected");
        assert!(!err.is_transient());
    }
}
