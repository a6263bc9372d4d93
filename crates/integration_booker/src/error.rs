//! Booker error types

use std::fmt;

use thiserror::Error;

/// The network-level failure class of a [`BookerError::Transport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The request exceeded the configured timeout
    Timeout,
    /// A TCP/TLS connection could not be established
    Connect,
    /// The request failed before a response arrived
    Request,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
        };
        write!(f, "{kind}")
    }
}

/// Errors that can occur while talking to the Booker dispatch API
///
/// The upstream reports failures inconsistently: structured JSON errors,
/// bare HTML pages from a reverse proxy, and leaked .NET stack traces all
/// arrive with assorted status codes. This taxonomy is the stable shape
/// the rest of the system sees.
#[derive(Debug, Error)]
pub enum BookerError {
    /// The provider rejected the submitted order as invalid
    #[error("Order rejected by dispatch: {0}")]
    ValidationFailed(String),

    /// A response carried no order or job identifier
    #[error("Response carried no usable order identifier")]
    MissingIdentifier,

    /// A bearer token could not be obtained
    #[error("Token issuance failed: {0}")]
    CredentialUnavailable(String),

    /// Credentials were rejected (HTTP 401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Authenticated but not permitted (HTTP 403)
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The order does not exist upstream (HTTP 404)
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A success response whose body could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The provider served an HTML page where JSON was expected,
    /// typically a proxy or maintenance page
    #[error("Dispatch service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The provider leaked an internal fault (stack-trace text in the
    /// body); in practice caused by a required payload field being omitted
    #[error("Upstream internal error: {0}")]
    UpstreamInternalError(String),

    /// An unclassified upstream failure status
    #[error("Upstream error (HTTP {status}): {detail}")]
    UpstreamServerError {
        /// HTTP status code the provider returned
        status: u16,
        /// Truncated response body
        detail: String,
    },

    /// A network-level failure before any response arrived
    #[error("Transport failure ({kind}): {detail}")]
    Transport {
        /// Which stage of the request failed
        kind: TransportKind,
        /// Underlying error description
        detail: String,
    },

    /// An amendment destroyed the original order but could not place its
    /// replacement; requires manual follow-up, never reported as a plain
    /// failure
    #[error("Order {cancelled} was cancelled but rebooking failed: {reason}")]
    PartiallyFailed {
        /// Identifier of the order that no longer exists
        cancelled: String,
        /// Why the replacement could not be placed
        reason: String,
    },
}

impl BookerError {
    /// Returns true if retrying the same call later could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CredentialUnavailable(_)
                | Self::ServiceUnavailable(_)
                | Self::UpstreamServerError { .. }
                | Self::Transport { .. }
        )
    }

    /// Returns true if the booking is now in a half-amended state that
    /// needs manual intervention
    #[must_use]
    pub const fn is_partial_failure(&self) -> bool {
        matches!(self, Self::PartiallyFailed { .. })
    }
}
