//! Service startup errors.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// An environment variable holds a value that cannot be used.
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Config {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, ServerError>;
