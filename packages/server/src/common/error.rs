use thiserror::Error;

use super::auth::AuthError;

/// Errors produced by the governance core (intake, review, decisions, grants).
///
/// Every variant maps to a stable, snake_case kind via [`GovernanceError::kind`].
/// The kind is what callers branch on; the message is for humans.
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// Malformed or missing input. Nothing was persisted.
    #[error("{0}")]
    Validation(String),

    /// Payload larger than the ceiling for its type.
    #[error("{what} is {actual} bytes, the limit is {limit} bytes")]
    SizeExceeded {
        what: String,
        actual: i64,
        limit: i64,
        /// Whether the client may attempt one size-reduction pass (images only).
        reducible: bool,
    },

    /// The caller's authority, re-derived at action time, does not cover the target.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The requested transition is not reachable from the item's current status.
    #[error("Cannot {action} an item that is {status}")]
    InvalidStatus { status: String, action: String },

    /// Target does not exist or lies outside the requester's visible scope.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GovernanceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Internal error kind, including the true cause of hidden failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::SizeExceeded { .. } => "size_exceeded",
            Self::PermissionDenied(_) => "permission_denied",
            Self::InvalidStatus { .. } => "invalid_status",
            Self::NotFound(_) => "not_found",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Kind as presented to callers outside the server.
    ///
    /// `not_found` is folded into `permission_denied` so a caller cannot probe
    /// for the existence of items in journeys they have no access to.
    pub fn public_kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "permission_denied",
            other => other.kind(),
        }
    }

    /// Human-readable message safe to show an end user.
    ///
    /// Database and internal failures never leak their diagnostics.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(_) => {
                "You do not have permission to act on this item".to_string()
            }
            Self::Database(_) | Self::Internal(_) => {
                "Something went wrong on our side. Please try again later".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the client may try again without changing its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

impl From<AuthError> for GovernanceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => {
                Self::PermissionDenied("authentication required".to_string())
            }
            AuthError::PermissionDenied(reason) => Self::PermissionDenied(reason),
            AuthError::DatabaseError(e) => Self::Database(e),
            AuthError::InternalError(e) => Self::Internal(e),
        }
    }
}
