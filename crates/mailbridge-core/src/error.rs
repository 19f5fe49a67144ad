//! Error types for the inbox pipeline.

use thiserror::Error;

/// Failure classes of one inbox fetch.
///
/// The class decides what the caller sees: authentication failures are
/// always surfaced, everything else is subject to the fallback policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InboxError {
    /// Transport, TLS or greeting failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Blank credentials or a rejected LOGIN.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// One FETCH response could not be turned into a message.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Anything else: SELECT/SEARCH failure, deadline, bad request.
    #[error("{0}")]
    Unclassified(String),
}

impl InboxError {
    /// Returns true for authentication failures.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, InboxError>;
