//! # mailbridge-imap
//!
//! A small async IMAP client covering the read-only inbox path:
//! `LOGIN`, `SELECT`, `SEARCH`, `FETCH` and `LOGOUT`.
//!
//! ## Features
//!
//! - **Type-state connection management**: `NotAuthenticated` → `Authenticated`
//!   → `Selected`, enforced at compile time
//! - **Deterministic framing**: responses are framed by CRLF and by declared
//!   literal lengths (`{n}`), never by guessing from text markers
//! - **Per-session tags**: `A001`, `A002`, … from a monotonic generator
//! - **Safe credentials**: `LOGIN` arguments are sent as quoted strings when
//!   they contain protocol-significant characters
//! - **Bounded I/O**: every command exchange runs under a timeout
//! - **TLS via rustls**: implicit TLS on port 993, plaintext elsewhere
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbridge_imap::{Client, Config, FetchItems, SearchCriteria};
//!
//! #[tokio::main]
//! async fn main() -> mailbridge_imap::Result<()> {
//!     let config = Config::new("imap.example.com", 993);
//!     let client = Client::connect(&config).await?;
//!     let client = client.login("user@example.com", "app password").await?;
//!     let (mut client, status) = client.select("INBOX").await?;
//!     println!("{} messages", status.exists);
//!
//!     for seq in client.search(SearchCriteria::Recent).await? {
//!         let items = client.fetch(seq, &FetchItems::message_view()).await?;
//!         println!("{seq}: {} items", items.len());
//!     }
//!
//!     client.logout().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌─────────────────────┐
//! │   NotAuthenticated  │ ─── login() ───→ Authenticated
//! └─────────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    Authenticated    │ ─── select() ───→ Selected
//! └─────────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │      Selected       │ ─── logout() ───→ (closed)
//! └─────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`command`]: command builders, tag generation and serialization
//! - [`connection`]: transport, framing and the type-state client
//! - [`parser`]: sans-I/O response parser
//! - [`types`]: flags, identifiers and status codes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, FetchItems, SearchCriteria, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, ConfigBuilder, FramedStream, ImapStream, LoginOutcome,
    NotAuthenticated, Security, Selected, classify_login,
};
pub use error::{Error, Result};
pub use parser::{
    Address, Envelope, FetchItem, Response, ResponseParser, UntaggedResponse, parse_search_line,
};
pub use types::{Flag, Flags, MailboxStatus, ResponseCode, SeqNum, Status, Tag};
