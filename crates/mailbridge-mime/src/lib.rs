//! # mailbridge-mime
//!
//! Decoding helpers for the text of fetched messages.
//!
//! ## Features
//!
//! - **Encoded words**: RFC 2047 `=?charset?B|Q?...?=` runs in header values,
//!   for UTF-8, US-ASCII and ISO-8859-1
//! - **Transfer encodings**: Base64 and Quoted-Printable bodies
//! - **Headers**: header block parsing with folded-line unfolding
//! - **Multipart**: text/plain and text/html extraction, attachment detection
//! - **Dates**: tolerant RFC 2822 parsing, RFC 3339 output
//!
//! ## Quick Start
//!
//! ```
//! use mailbridge_mime::{Headers, decode_encoded_words, extract_bodies};
//!
//! let subject = decode_encoded_words("=?UTF-8?Q?Caf=C3=A9_menu?=");
//! assert_eq!(subject, "Café menu");
//!
//! let headers = Headers::parse("Content-Type: text/plain\r\n");
//! let bodies = extract_bodies(&headers, "See you at noon.");
//! assert_eq!(bodies.text.as_deref(), Some("See you at noon."));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod multipart;

pub mod date;
pub mod encoding;

pub use content_type::ContentType;
pub use date::{format_rfc3339, normalize_date, parse_date};
pub use encoding::decode_encoded_words;
pub use error::{Error, Result};
pub use header::{Headers, split_header_body};
pub use multipart::{BodyParts, TransferEncoding, extract_bodies, split_multipart};
