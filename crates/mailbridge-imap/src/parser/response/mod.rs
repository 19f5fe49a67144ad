//! IMAP response parser.
//!
//! One framed response (a line plus any literals it announced) parses to one
//! [`Response`]. Untagged data this client never acts on becomes
//! [`UntaggedResponse::Other`] instead of an error, so a LIST or EXPUNGE
//! arriving mid-exchange cannot fail the command it rides along with.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{Address, Envelope, FetchItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{
    parse_capability_data, parse_flag_list, parse_response_code, parse_search_response,
    read_text_until_crlf,
};

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text/data.
        text: Option<String>,
    },
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one complete framed response.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => Ok(Self::parse_continuation(&mut lexer)),
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("Expected *, +, or tag, got {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;

        let keyword = lexer.read_atom_string()?;
        let status = Status::parse(keyword)
            .ok_or_else(|| lexer.error(&format!("Invalid status: {keyword}")))?;
        let (code, text) = Self::parse_resp_text(lexer)?;

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        let untagged = match lexer.next_token()? {
            Token::Atom(keyword) => Self::parse_untagged_keyword(lexer, keyword)?,
            Token::Number(n) => Self::parse_message_data(lexer, n)?,
            token => {
                return Err(lexer.error(&format!(
                    "Unexpected token in untagged response: {token:?}"
                )));
            }
        };

        Ok(Response::Untagged(untagged))
    }

    fn parse_untagged_keyword(lexer: &mut Lexer<'_>, keyword: &str) -> Result<UntaggedResponse> {
        let upper = keyword.to_ascii_uppercase();
        if let Some(status) = Status::parse(&upper) {
            let (code, text) = Self::parse_resp_text(lexer)?;
            return Ok(match status {
                Status::Ok => UntaggedResponse::Ok { code, text },
                Status::No => UntaggedResponse::No { code, text },
                Status::Bad => UntaggedResponse::Bad { code, text },
                Status::PreAuth => UntaggedResponse::PreAuth { code, text },
                Status::Bye => UntaggedResponse::Bye { code, text },
            });
        }

        Ok(match upper.as_str() {
            "CAPABILITY" => UntaggedResponse::Capability(parse_capability_data(lexer)?),
            "FLAGS" => {
                lexer.expect_space()?;
                UntaggedResponse::Flags(parse_flag_list(lexer)?)
            }
            "SEARCH" => UntaggedResponse::Search(parse_search_response(lexer)?),
            _ => UntaggedResponse::Other { keyword: upper },
        })
    }

    fn parse_message_data(lexer: &mut Lexer<'_>, n: u32) -> Result<UntaggedResponse> {
        lexer.expect_space()?;
        let keyword = lexer.read_atom_string()?.to_ascii_uppercase();

        Ok(match keyword.as_str() {
            "EXISTS" => UntaggedResponse::Exists(n),
            "RECENT" => UntaggedResponse::Recent(n),
            "FETCH" => {
                let seq = SeqNum::new(n).ok_or_else(|| lexer.error("Invalid sequence number 0"))?;
                lexer.expect_space()?;
                let items = fetch::parse_fetch_response(lexer)?;
                UntaggedResponse::Fetch { seq, items }
            }
            _ => UntaggedResponse::Other { keyword },
        })
    }

    fn parse_continuation(lexer: &mut Lexer<'_>) -> Response {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }

        let text = read_text_until_crlf(lexer);
        Response::Continuation {
            text: if text.is_empty() { None } else { Some(text) },
        }
    }

    /// Parses `[SP [code] SP] text`. Some servers omit the text entirely.
    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }

        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };

        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }

        Ok((code, read_text_until_crlf(lexer)))
    }
}

/// Extracts the numbers of a `* SEARCH` line.
///
/// `"* SEARCH 3 7 9"` gives `[3, 7, 9]`; `"* SEARCH"` and any line that is not
/// a SEARCH response give an empty list.
#[must_use]
pub fn parse_search_line(line: &str) -> Vec<u32> {
    let mut framed = line.trim_end_matches(['\r', '\n']).as_bytes().to_vec();
    framed.extend_from_slice(b"\r\n");

    match ResponseParser::parse(&framed) {
        Ok(Response::Untagged(UntaggedResponse::Search(nums))) => {
            nums.into_iter().map(SeqNum::get).collect()
        }
        _ => Vec::new(),
    }
}
