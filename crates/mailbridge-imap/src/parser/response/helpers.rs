//! Parser helper functions.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{Flag, Flags, ResponseCode, SeqNum};

/// Parses a bracketed response code.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;

    let atom = lexer.read_atom_string()?;
    let code = match atom.to_ascii_uppercase().as_str() {
        "ALERT" => ResponseCode::Alert,
        "AUTHENTICATIONFAILED" => ResponseCode::AuthenticationFailed,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            ResponseCode::UidValidity(lexer.read_number()?)
        }
        "UIDNEXT" => {
            lexer.expect_space()?;
            ResponseCode::UidNext(lexer.read_number()?)
        }
        "UNSEEN" => {
            lexer.expect_space()?;
            ResponseCode::Unseen(lexer.read_number()?)
        }
        "CAPABILITY" => ResponseCode::Capability(parse_capability_data(lexer)?),
        _ => ResponseCode::Other(atom.to_string()),
    };

    // Codes carry arguments we do not model (PERMANENTFLAGS, ...).
    while lexer.peek() != Some(b']') && !lexer.is_eof() {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;

    Ok(code)
}

/// Parses space-separated capability atoms.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    let mut caps = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()? {
            caps.push(s.to_string());
        }
    }

    Ok(caps)
}

/// Parses a flag list.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Flags> {
    lexer.expect(Token::LParen)?;

    let mut flags = Flags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Atom(s) => flags.insert(Flag::parse(s)),
            Token::Space => {}
            // `\*` in PERMANENTFLAGS-style lists
            Token::Asterisk => flags.insert(Flag::Keyword("\\*".to_string())),
            token => {
                return Err(lexer.error(&format!("Unexpected token in flag list: {token:?}")));
            }
        }
    }

    Ok(flags)
}

/// Parses the numbers of a SEARCH response.
pub fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<SeqNum>> {
    let mut nums = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        match lexer.next_token()? {
            Token::Number(n) => nums.extend(SeqNum::new(n)),
            // Trailing space before CRLF
            Token::Crlf | Token::Eof => break,
            // ESEARCH-style modifiers, e.g. (MODSEQ 917162500)
            _ => {}
        }
    }

    Ok(nums)
}

/// Reads text until CRLF.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let remaining = lexer.remaining();

    let end = remaining
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(remaining.len());

    lexer.skip(end);
    if lexer.peek() == Some(b'\r') {
        lexer.skip(2);
    }

    String::from_utf8_lossy(&remaining[..end]).to_string()
}
