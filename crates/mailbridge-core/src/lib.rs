//! # mailbridge-core
//!
//! The inbox fetch pipeline behind the `mailbridge` service.
//!
//! One invocation connects to an IMAP server, logs in, selects the inbox,
//! picks the recent (or latest) messages, fetches them one by one and turns
//! each FETCH response into a [`MailMessage`]. Failures are classified into
//! [`InboxError`] variants; [`handle`] maps them onto HTTP status codes and
//! the fallback policy.
//!
//! This crate provides:
//! - Request and record types ([`ConnectionConfig`], [`MailMessage`])
//! - Login and error classification
//! - Mailbox session and message selection
//! - FETCH-to-record conversion
//! - Sample messages for degraded responses

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
mod error;
pub mod fallback;
pub mod fetcher;
pub mod handler;
pub mod message;
pub mod model;
pub mod session;

pub use auth::{authenticate, connect, validate_credentials};
pub use error::{InboxError, Result};
pub use fallback::mock_batch;
pub use fetcher::fetch_messages;
pub use handler::{
    FallbackPolicy, FetchBatch, FetchOptions, FetchRequest, FetchResponse, HttpStatus,
    fetch_inbox, handle, handle_body,
};
pub use mailbridge_imap::parse_search_line;
pub use message::build_message;
pub use model::{ConnectionConfig, MailMessage};
pub use session::{open_inbox, select_sequence_numbers, select_with_limits};
