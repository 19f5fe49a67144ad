//! MIME decoding utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 encoded words in header
//! values.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 data. Whitespace (line breaks in bodies) is ignored.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable data (RFC 2045) to raw bytes.
///
/// Soft line breaks (`=` at end of line) are removed.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            result.push(bytes[i]);
            i += 1;
            continue;
        }

        match bytes.get(i + 1..i + 3) {
            Some(b"\r\n") => i += 3,
            Some([b'\n', ..]) => i += 2,
            Some(&[hi, lo]) => {
                result.push(hex_pair(hi, lo)?);
                i += 3;
            }
            _ => {
                // "=" or "=\r" as the very last bytes is a soft break too.
                if matches!(bytes.get(i + 1..), Some(b"" | b"\r" | b"\n")) {
                    break;
                }
                return Err(Error::InvalidEncoding(
                    "Incomplete escape sequence".to_string(),
                ));
            }
        }
    }

    Ok(result)
}

/// Decodes the Q encoding of RFC 2047: `_` is a space, `=HH` is byte `HH`.
///
/// # Errors
///
/// Returns an error on a malformed `=HH` escape.
pub fn decode_q(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b'=' => {
                let &[hi, lo] = bytes.get(i + 1..i + 3).unwrap_or_default() else {
                    return Err(Error::InvalidEncoding(
                        "Incomplete escape sequence".to_string(),
                    ));
                };
                result.push(hex_pair(hi, lo)?);
                i += 3;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    Ok(result)
}

fn hex_pair(hi: u8, lo: u8) -> Result<u8> {
    let digit = |b: u8| {
        char::from(b)
            .to_digit(16)
            .ok_or_else(|| Error::InvalidEncoding(format!("Invalid hex digit: {:?}", char::from(b))))
    };
    let value = digit(hi)? * 16 + digit(lo)?;
    u8::try_from(value).map_err(|e| Error::InvalidEncoding(e.to_string()))
}

/// Converts bytes in `charset` to a string.
///
/// UTF-8, US-ASCII and ISO-8859-1 are supported. Charset names compare
/// case-insensitively and an RFC 2231 language suffix (`utf-8*en`) is
/// ignored.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCharset`] for any other charset, or
/// [`Error::Utf8Decode`] when UTF-8/ASCII bytes are invalid.
pub fn decode_charset(bytes: Vec<u8>, charset: &str) -> Result<String> {
    let name = charset.split('*').next().unwrap_or(charset).trim();

    if name.eq_ignore_ascii_case("utf-8") || name.eq_ignore_ascii_case("utf8") {
        return String::from_utf8(bytes).map_err(Into::into);
    }
    if name.eq_ignore_ascii_case("us-ascii") || name.eq_ignore_ascii_case("ascii") {
        if !bytes.is_ascii() {
            return Err(Error::InvalidEncoding("non-ASCII byte in US-ASCII text".to_string()));
        }
        return String::from_utf8(bytes).map_err(Into::into);
    }
    if name.eq_ignore_ascii_case("iso-8859-1") || name.eq_ignore_ascii_case("latin1") {
        // Latin-1 bytes are the first 256 code points.
        return Ok(bytes.into_iter().map(char::from).collect());
    }

    Err(Error::UnsupportedCharset(name.to_string()))
}

/// Decodes one encoded word given its three fields.
///
/// # Errors
///
/// Returns an error for an unknown encoding letter, a malformed payload, or
/// an unsupported charset.
pub fn decode_encoded_word(charset: &str, encoding: &str, payload: &str) -> Result<String> {
    let bytes = match encoding {
        "B" | "b" => decode_base64(payload)?,
        "Q" | "q" => decode_q(payload)?,
        other => {
            return Err(Error::InvalidEncoding(format!("Unknown encoding: {other}")));
        }
    };
    decode_charset(bytes, charset)
}

/// One `=?charset?enc?payload?=` run located in a header value.
struct EncodedWord<'a> {
    start: usize,
    end: usize,
    charset: &'a str,
    encoding: &'a str,
    payload: &'a str,
}

/// Finds the next encoded word at or after byte offset `from`.
fn find_encoded_word(text: &str, from: usize) -> Option<EncodedWord<'_>> {
    let mut search = from;

    while let Some(rel) = text.get(search..)?.find("=?") {
        let start = search + rel;
        if let Some(word) = parse_encoded_word_at(text, start) {
            return Some(word);
        }
        search = start + 2;
    }

    None
}

fn parse_encoded_word_at(text: &str, start: usize) -> Option<EncodedWord<'_>> {
    let rest = &text[start + 2..];

    let charset_end = rest.find('?')?;
    let charset = &rest[..charset_end];
    let rest = &rest[charset_end + 1..];

    let encoding_end = rest.find('?')?;
    let encoding = &rest[..encoding_end];
    let rest = &rest[encoding_end + 1..];

    let payload_end = rest.find("?=")?;
    let payload = &rest[..payload_end];

    let valid = !charset.is_empty()
        && !charset.contains(char::is_whitespace)
        && encoding.len() == 1
        && !payload.contains(char::is_whitespace);
    if !valid {
        return None;
    }

    let end = start + 2 + charset_end + 1 + encoding_end + 1 + payload_end + 2;
    Some(EncodedWord {
        start,
        end,
        charset,
        encoding,
        payload,
    })
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Each `=?charset?B?...?=` or `=?charset?Q?...?=` run is decoded on its own
/// and spliced back in place. Runs that fail to decode, or name a charset
/// that is not supported, are kept verbatim, as is all text around them.
/// Whitespace that only separates two decoded runs is dropped (RFC 2047
/// section 6.2), so a subject split across several words reads as one.
/// The result is trimmed.
#[must_use]
pub fn decode_encoded_words(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut cursor = 0;
    let mut previous_decoded = false;

    while let Some(word) = find_encoded_word(field, cursor) {
        let gap = &field[cursor..word.start];

        match decode_encoded_word(word.charset, word.encoding, word.payload) {
            Ok(decoded) => {
                let adjacent = previous_decoded && gap.chars().all(char::is_whitespace);
                if !adjacent {
                    out.push_str(gap);
                }
                out.push_str(&decoded);
                previous_decoded = true;
            }
            Err(_) => {
                out.push_str(gap);
                out.push_str(&field[word.start..word.end]);
                previous_decoded = false;
            }
        }

        cursor = word.end;
    }

    out.push_str(&field[cursor..]);
    out.trim().to_string()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_decode_ignores_line_breaks() {
        let decoded = decode_base64("SGVsbG8s\r\nIFdvcmxkIQ==").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("Hello, World!").unwrap(), b"Hello, World!");
        assert_eq!(
            decode_quoted_printable("H=C3=A9llo").unwrap(),
            "Héllo".as_bytes()
        );
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable("Hello=\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable("trailing=").unwrap(), b"trailing");
    }

    #[test]
    fn test_quoted_printable_rejects_bad_escape() {
        assert!(decode_quoted_printable("=ZZ").is_err());
    }

    #[test]
    fn test_q_underscore_and_hex() {
        assert_eq!(decode_q("a_b=3Dc").unwrap(), b"a b=c");
        assert!(decode_q("broken=4").is_err());
    }

    #[test]
    fn test_charsets() {
        assert_eq!(decode_charset(b"abc".to_vec(), "US-ASCII").unwrap(), "abc");
        assert_eq!(decode_charset(vec![0x63, 0x61, 0x66, 0xE9], "iso-8859-1").unwrap(), "café");
        assert_eq!(decode_charset("ü".as_bytes().to_vec(), "utf-8*de").unwrap(), "ü");
        assert!(matches!(
            decode_charset(b"x".to_vec(), "koi8-r"),
            Err(Error::UnsupportedCharset(_))
        ));
    }

    #[test]
    fn test_decode_base64_word() {
        assert_eq!(decode_encoded_words("=?UTF-8?B?SMOpbGxv?="), "Héllo");
        assert_eq!(decode_encoded_words("=?utf-8?b?SMOpbGxv?="), "Héllo");
    }

    #[test]
    fn test_decode_q_word() {
        assert_eq!(
            decode_encoded_words("=?UTF-8?Q?Caf=C3=A9_au_lait?="),
            "Café au lait"
        );
    }

    #[test]
    fn test_decode_splices_in_place() {
        assert_eq!(
            decode_encoded_words("Re: =?UTF-8?B?SMOpbGxv?= world"),
            "Re: Héllo world"
        );
        assert_eq!(
            decode_encoded_words("\"=?UTF-8?Q?Jos=C3=A9?=\" <jose@example.com>"),
            "\"José\" <jose@example.com>"
        );
    }

    #[test]
    fn test_adjacent_words_join() {
        assert_eq!(
            decode_encoded_words("=?UTF-8?Q?Quarterly_?= =?UTF-8?Q?report?="),
            "Quarterly report"
        );
    }

    #[test]
    fn test_failed_run_passes_through() {
        assert_eq!(
            decode_encoded_words("=?UTF-8?B?!!!?= tail"),
            "=?UTF-8?B?!!!?= tail"
        );
        assert_eq!(
            decode_encoded_words("=?KOI8-R?B?0KLQtdGB0YI=?="),
            "=?KOI8-R?B?0KLQtdGB0YI=?="
        );
        assert_eq!(decode_encoded_words("=?UTF-8?X?abc?="), "=?UTF-8?X?abc?=");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(decode_encoded_words("  Plain subject  "), "Plain subject");
        assert_eq!(decode_encoded_words("What? =? no"), "What? =? no");
    }
}
