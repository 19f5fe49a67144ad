//! IMAP protocol parser.
//!
//! A sans-I/O parser for the server responses the inbox path sees. It is
//! split into two parts:
//!
//! - **Lexer**: turns raw bytes into IMAP tokens (atoms, quoted strings,
//!   literals, numbers, delimiters)
//! - **Response Parser**: builds a [`Response`] from those tokens
//!
//! # Example
//!
//! ```
//! use mailbridge_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* SEARCH 2 5 8\r\n").unwrap();
//! match response {
//!     Response::Untagged(UntaggedResponse::Search(nums)) => assert_eq!(nums.len(), 3),
//!     _ => panic!("expected SEARCH"),
//! }
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{
    Address, Envelope, FetchItem, Response, ResponseParser, UntaggedResponse, parse_search_line,
};
