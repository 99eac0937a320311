//! Tool-specific error types.

use thiserror::Error;

use crate::domains::backend::{Failure, FailureKind};

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// A required argument was absent, null or blank.
    #[error("'{0}' is required")]
    MissingArgument(String),

    /// An argument was present but not acceptable.
    #[error("Invalid {field}. {reason}")]
    InvalidArgument { field: String, reason: String },

    /// The backend call failed. The message is passed through unchanged.
    #[error("{0}")]
    Backend(Failure),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn missing_argument(field: impl Into<String>) -> Self {
        Self::MissingArgument(field.into())
    }

    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Raised before any I/O because of the caller's arguments.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingArgument(_) | Self::InvalidArgument { .. })
    }

    /// Short machine-readable code used in REST error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "tool_not_found",
            Self::MissingArgument(_) | Self::InvalidArgument { .. } => "validation_error",
            Self::Backend(failure) => match failure.kind {
                FailureKind::ClientError => "client_error",
                FailureKind::ServerError => "server_error",
                FailureKind::NetworkError => "network_error",
            },
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<Failure> for ToolError {
    fn from(failure: Failure) -> Self {
        Self::Backend(failure)
    }
}
