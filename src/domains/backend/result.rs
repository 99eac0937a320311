//! Outcome of one executor call.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Classification of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Backend answered 4xx. Never retried.
    ClientError,
    /// Backend answered 5xx (or another non-2xx status).
    ServerError,
    /// No HTTP status at all: connect, timeout or transport failure.
    NetworkError,
}

impl FailureKind {
    /// Classify by the HTTP status, if one was received.
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(code) if (400..500).contains(&code) => Self::ClientError,
            Some(_) => Self::ServerError,
            None => Self::NetworkError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ClientError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientError => "ClientError",
            Self::ServerError => "ServerError",
            Self::NetworkError => "NetworkError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend call that did not succeed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub kind: FailureKind,
    pub http_status: Option<u16>,
    /// `Failed after N attempts: <underlying message>`.
    pub message: String,
    pub attempts: u32,
}

impl Failure {
    /// Whether the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.kind == FailureKind::ClientError && self.http_status == Some(404)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of [`super::RequestExecutor::execute`].
///
/// A cache hit is a `Success` with `cached == true` and `attempts == 0`;
/// every other result made at least one HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success {
        payload: Value,
        http_status: u16,
        cached: bool,
        attempts: u32,
    },
    Failure(Failure),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Number of HTTP calls made (0 for a cache hit).
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } => *attempts,
            Self::Failure(failure) => failure.attempts,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Success { cached: true, .. })
    }

    /// Keep only the payload, or the failure.
    pub fn into_payload(self) -> Result<Value, Failure> {
        match self {
            Self::Success { payload, .. } => Ok(payload),
            Self::Failure(failure) => Err(failure),
        }
    }
}
