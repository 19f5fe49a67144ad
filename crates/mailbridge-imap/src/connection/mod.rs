//! IMAP connection management.
//!
//! This module provides connection handling for IMAP servers, including:
//! - Configuration (host, port, security mode, timeouts)
//! - TLS/plaintext stream abstraction
//! - Framed I/O for IMAP protocol
//! - Type-state connection wrapper

mod client;
mod config;
mod framed;
mod stream;

pub use client::{
    Authenticated, Client, LoginOutcome, NotAuthenticated, Selected, classify_login,
};
pub use config::{Config, ConfigBuilder, IMPLICIT_TLS_PORT, Security};
pub use framed::FramedStream;
pub use stream::{ImapStream, connect, create_tls_connector};
