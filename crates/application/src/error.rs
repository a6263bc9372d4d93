//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::ports::DispatchError;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Dispatch provider error, surfaced without translation
    ///
    /// Transparent so partial amendment failures keep their identity all
    /// the way up to callers.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dispatch(err) if err.is_retryable())
    }

    /// Whether an amendment destroyed the original booking without a replacement
    #[must_use]
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, Self::Dispatch(err) if err.is_partial_failure())
    }
}
