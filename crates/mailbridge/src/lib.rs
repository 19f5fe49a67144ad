//! # mailbridge
//!
//! HTTP front end for the inbox fetch pipeline.
//!
//! | Route                    | Purpose                                   |
//! |--------------------------|-------------------------------------------|
//! | `POST /api/fetch-emails` | fetch the inbox named in `imap_config`    |
//! | `POST /`                 | same, for clients posting to the root     |
//! | `GET /health`            | liveness, `{"status":"ok"}`               |
//!
//! Every route allows any origin, method and header.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod routes;

pub use config::Settings;
pub use error::{Result, ServerError};
pub use routes::router;
