//! Error types surfaced by the harvest engine.

use thiserror::Error;

/// A single failed exchange with the places API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or other transport-level failure
    #[error("{operation} request failed: {message}")]
    Network {
        operation: &'static str,
        message: String,
    },

    /// The endpoint answered with a non-2xx status
    #[error("{operation} HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The body could not be decoded into the expected shape
    #[error("{operation} response could not be decoded: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    /// The request was rejected locally before being sent
    #[error("{operation} request is invalid: {message}")]
    InvalidRequest {
        operation: &'static str,
        message: String,
    },
}

impl ApiError {
    /// Network errors, rate limiting (429) and server errors (5xx) are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Decode { .. } | ApiError::InvalidRequest { .. } => false,
        }
    }

    /// HTTP status, when the failure came from the endpoint itself.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Checked failures of a harvest request.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// No center could be derived for the requested scope
    #[error("could not resolve a location for {0}")]
    UnresolvedLocation(String),

    /// The scope is malformed: both circle and rectangle, or nothing usable
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// Transient failures persisted through every retry attempt
    #[error("{context}: gave up after {attempts} attempts: {source}")]
    UpstreamExhausted {
        context: String,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    /// A permanent upstream failure, not retried
    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: ApiError,
    },
}

impl HarvestError {
    /// True for failures caused by the request itself rather than the upstream API.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            HarvestError::UnresolvedLocation(_) | HarvestError::InvalidScope(_)
        )
    }
}
