//! Command serialization helpers.

use super::types::{FetchAttribute, FetchItems};

/// Writes an astring: a bare atom when safe, otherwise a quoted string.
///
/// Quoted strings escape `"` and `\`. CR and LF cannot appear inside a
/// quoted string at all, so they are dropped.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            match b {
                b'\r' | b'\n' => continue,
                b'"' | b'\\' => {
                    buf.push(b'\\');
                    buf.push(b);
                }
                _ => buf.push(b),
            }
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Returns true if the byte cannot appear in a bare atom.
const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'}' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b >= 0x7F
}

/// Writes FETCH items as a parenthesized list.
pub fn write_fetch_items(buf: &mut Vec<u8>, items: &FetchItems) {
    if let [single] = items.0.as_slice() {
        write_fetch_attribute(buf, single);
        return;
    }

    buf.push(b'(');
    for (i, attr) in items.0.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_fetch_attribute(buf, attr);
    }
    buf.push(b')');
}

/// Writes a single FETCH attribute.
pub fn write_fetch_attribute(buf: &mut Vec<u8>, attr: &FetchAttribute) {
    match attr {
        FetchAttribute::Flags => buf.extend_from_slice(b"FLAGS"),
        FetchAttribute::Envelope => buf.extend_from_slice(b"ENVELOPE"),
        FetchAttribute::Uid => buf.extend_from_slice(b"UID"),
        FetchAttribute::Rfc822Size => buf.extend_from_slice(b"RFC822.SIZE"),
        FetchAttribute::InternalDate => buf.extend_from_slice(b"INTERNALDATE"),
        FetchAttribute::Body { section, peek } => {
            if *peek {
                buf.extend_from_slice(b"BODY.PEEK[");
            } else {
                buf.extend_from_slice(b"BODY[");
            }
            if let Some(s) = section {
                buf.extend_from_slice(s.as_bytes());
            }
            buf.push(b']');
        }
    }
}
