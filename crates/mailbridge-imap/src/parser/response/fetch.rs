//! FETCH response parsing.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};

use super::helpers::parse_flag_list;
use super::types::{Address, Envelope, FetchItem};

/// Parses the parenthesized item list of a FETCH response.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => match name.to_ascii_uppercase().as_str() {
                "FLAGS" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Flags(parse_flag_list(lexer)?));
                }
                "UID" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Uid(lexer.read_number()?));
                }
                "RFC822.SIZE" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Rfc822Size(lexer.read_number()?));
                }
                "INTERNALDATE" => {
                    lexer.expect_space()?;
                    if let Some(date) = lexer.read_nstring()? {
                        items.push(FetchItem::InternalDate(date));
                    }
                }
                "ENVELOPE" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Envelope(Box::new(parse_envelope(lexer)?)));
                }
                "BODY" | "BODY.PEEK" | "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
                    let (section, origin) = parse_body_section_and_origin(lexer);
                    let section = section.or_else(|| rfc822_section(name));

                    lexer.expect_space()?;
                    let data = lexer.read_nstring_bytes()?;

                    items.push(FetchItem::Body {
                        section,
                        origin,
                        data,
                    });
                }
                _ => skip_fetch_item(lexer)?,
            },
            token => {
                return Err(lexer.error(&format!("Unexpected token in FETCH: {token:?}")));
            }
        }
    }

    Ok(items)
}

/// Maps the RFC822 shorthands onto their BODY section names.
fn rfc822_section(name: &str) -> Option<String> {
    match name.to_ascii_uppercase().as_str() {
        "RFC822.HEADER" => Some("HEADER".to_string()),
        "RFC822.TEXT" => Some("TEXT".to_string()),
        _ => None,
    }
}

/// Parses optional `[section]` and `<origin>` after BODY.
///
/// The section is returned upper-cased. `BODY[HEADER.FIELDS (DATE FROM)]`
/// keeps its field list verbatim.
fn parse_body_section_and_origin(lexer: &mut Lexer<'_>) -> (Option<String>, Option<u32>) {
    let mut section = None;
    let mut origin = None;

    if lexer.peek() == Some(b'[') {
        lexer.advance();
        let mut buf = String::new();
        while let Some(b) = lexer.advance() {
            if b == b']' {
                break;
            }
            buf.push(char::from(b));
        }
        if !buf.is_empty() {
            section = Some(buf.to_ascii_uppercase());
        }
    }

    if lexer.peek() == Some(b'<') {
        lexer.advance();
        let mut buf = String::new();
        while let Some(b) = lexer.advance() {
            if b == b'>' {
                break;
            }
            buf.push(char::from(b));
        }
        origin = buf.parse().ok();
    }

    (section, origin)
}

/// Parses an envelope structure.
///
/// Fields are read as tokens, so quotes, parentheses and literals inside a
/// subject cannot shift the fields that follow it.
pub fn parse_envelope(lexer: &mut Lexer<'_>) -> Result<Envelope> {
    lexer.expect(Token::LParen)?;

    let date = lexer.read_nstring()?;
    lexer.expect_space()?;

    let subject = lexer.read_nstring()?;
    lexer.expect_space()?;

    let from = parse_address_list(lexer)?;
    lexer.expect_space()?;

    let sender = parse_address_list(lexer)?;
    lexer.expect_space()?;

    let reply_to = parse_address_list(lexer)?;
    lexer.expect_space()?;

    let to = parse_address_list(lexer)?;
    lexer.expect_space()?;

    let cc = parse_address_list(lexer)?;
    lexer.expect_space()?;

    let bcc = parse_address_list(lexer)?;
    lexer.expect_space()?;

    let in_reply_to = lexer.read_nstring()?;
    lexer.expect_space()?;

    let message_id = lexer.read_nstring()?;

    lexer.expect(Token::RParen)?;

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
    })
}

/// Parses an address list.
pub fn parse_address_list(lexer: &mut Lexer<'_>) -> Result<Vec<Address>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut addresses = Vec::new();
            loop {
                match lexer.peek() {
                    Some(b')') => {
                        lexer.advance();
                        break;
                    }
                    Some(b'(') => addresses.push(parse_address(lexer)?),
                    Some(b' ') => {
                        lexer.advance();
                    }
                    _ => return Err(lexer.error("Unterminated address list")),
                }
            }
            Ok(addresses)
        }
        token => Err(lexer.error(&format!("Expected address list, got {token:?}"))),
    }
}

/// Parses a single address.
fn parse_address(lexer: &mut Lexer<'_>) -> Result<Address> {
    lexer.expect(Token::LParen)?;

    let name = lexer.read_nstring()?;
    lexer.expect_space()?;

    let adl = lexer.read_nstring()?;
    lexer.expect_space()?;

    let mailbox = lexer.read_nstring()?;
    lexer.expect_space()?;

    let host = lexer.read_nstring()?;

    lexer.expect(Token::RParen)?;

    Ok(Address {
        name,
        adl,
        mailbox,
        host,
    })
}

/// Skips the value of a fetch item this client does not model.
///
/// Walks tokens rather than bytes so literals and quoted strings containing
/// parentheses are skipped whole.
fn skip_fetch_item(lexer: &mut Lexer<'_>) -> Result<()> {
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }

    let mut depth = 0usize;
    loop {
        match lexer.peek() {
            Some(b' ' | b')') if depth == 0 => return Ok(()),
            None => return Err(lexer.error("Unexpected end of FETCH item")),
            _ => {}
        }
        match lexer.next_token()? {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Eof => return Err(lexer.error("Unexpected end of FETCH item")),
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_uid() {
        let mut lexer = Lexer::new(b"(UID 123 FLAGS (\\Seen \\Flagged))");
        let items = parse_fetch_response(&mut lexer).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], FetchItem::Uid(123));
        match &items[1] {
            FetchItem::Flags(flags) => assert!(flags.is_seen() && flags.is_flagged()),
            other => panic!("Expected flags, got {other:?}"),
        }
    }

    #[test]
    fn test_body_sections_from_literals() {
        let input = b"(BODY[HEADER] {15}\r\nSubject: Hi\r\n\r\n BODY[TEXT] {5}\r\nhello BODY[1] NIL)";
        let mut lexer = Lexer::new(input);
        let items = parse_fetch_response(&mut lexer).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0].body_section("HEADER"),
            Some(&b"Subject: Hi\r\n\r\n"[..])
        );
        assert_eq!(items[1].body_section("text"), Some(&b"hello"[..]));
        assert_eq!(
            items[2],
            FetchItem::Body {
                section: Some("1".to_string()),
                origin: None,
                data: None,
            }
        );
    }

    #[test]
    fn test_body_section_as_quoted_string() {
        let mut lexer = Lexer::new(b"(BODY[TEXT] \"short body\")");
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(items[0].body_section("TEXT"), Some(&b"short body"[..]));
    }

    #[test]
    fn test_body_section_and_origin() {
        let mut lexer = Lexer::new(b"[text]<100>");
        let (section, origin) = parse_body_section_and_origin(&mut lexer);
        assert_eq!(section, Some("TEXT".to_string()));
        assert_eq!(origin, Some(100));
    }

    #[test]
    fn test_rfc822_header_maps_to_header_section() {
        let mut lexer = Lexer::new(b"(RFC822.HEADER {4}\r\nA: b)");
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(items[0].body_section("HEADER"), Some(&b"A: b"[..]));
    }

    #[test]
    fn test_parse_envelope_with_tricky_subject() {
        let input = br#"("Mon, 7 Feb 1994 21:52:25 -0800" "Re: \"quoted\" (and parens)" (("Fred Foobar" NIL "foobar" "Blurdybloop.example")) NIL NIL ((NIL NIL "mooch" "owatagu.example")) NIL NIL NIL "<B27397-0100000@Blurdybloop.example>")"#;
        let mut lexer = Lexer::new(input);
        let envelope = parse_envelope(&mut lexer).unwrap();

        assert_eq!(
            envelope.subject.as_deref(),
            Some("Re: \"quoted\" (and parens)")
        );
        assert_eq!(
            envelope.from[0].display().as_deref(),
            Some("Fred Foobar <foobar@Blurdybloop.example>")
        );
        assert_eq!(
            envelope.to[0].email().as_deref(),
            Some("mooch@owatagu.example")
        );
        assert!(envelope.sender.is_empty());
        assert_eq!(
            envelope.message_id.as_deref(),
            Some("<B27397-0100000@Blurdybloop.example>")
        );
    }

    #[test]
    fn test_envelope_subject_as_literal() {
        let input = b"(NIL {9}\r\nA (b) \"c\" NIL NIL NIL NIL NIL NIL NIL NIL)";
        let mut lexer = Lexer::new(input);
        let envelope = parse_envelope(&mut lexer).unwrap();
        assert_eq!(envelope.subject.as_deref(), Some("A (b) \"c\""));
        assert!(envelope.date.is_none());
    }

    #[test]
    fn test_unknown_items_are_skipped() {
        let input = b"(X-GM-LABELS (\\Inbox \"a (b)\") MODSEQ (12345) FLAGS (\\Seen))";
        let mut lexer = Lexer::new(input);
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], FetchItem::Flags(_)));
    }

    #[test]
    fn test_truncated_list_is_an_error() {
        let mut lexer = Lexer::new(b"(FLAGS (\\Seen) ENVELOPE (NIL");
        assert!(parse_fetch_response(&mut lexer).is_err());
    }
}
