//! Multipart bodies and transfer decoding.
//!
//! Given the header block and raw body of a message, pull out the first
//! text/plain and text/html parts, decode their transfer encoding, and note
//! whether any part is an attachment.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_charset, decode_quoted_printable};
use crate::header::{Headers, split_header_body};

/// Deepest multipart nesting that is still walked.
const MAX_DEPTH: usize = 8;

/// Content-Transfer-Encoding of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// 7-bit, 8-bit or binary: no transformation.
    #[default]
    Identity,
    /// Base64.
    Base64,
    /// Quoted-Printable.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Reads the `Content-Transfer-Encoding` header. Unknown values are
    /// treated as identity.
    #[must_use]
    pub fn from_headers(headers: &Headers) -> Self {
        match headers
            .get("content-transfer-encoding")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("base64") => Self::Base64,
            Some("quoted-printable") => Self::QuotedPrintable,
            _ => Self::Identity,
        }
    }

    /// Decodes `body` to text using `charset` (UTF-8 when absent).
    ///
    /// Anything that fails to decode is returned unchanged.
    #[must_use]
    pub fn decode_text(self, body: &str, charset: Option<&str>) -> String {
        let bytes = match self {
            Self::Identity => return body.to_string(),
            Self::Base64 => decode_base64(body),
            Self::QuotedPrintable => decode_quoted_printable(body),
        };

        let charset = charset.unwrap_or("utf-8");
        bytes
            .and_then(|b| decode_charset(b, charset))
            .unwrap_or_else(|_| body.to_string())
    }
}

/// Text extracted from a message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyParts {
    /// First text/plain part (or the whole body of a non-HTML single part).
    pub text: Option<String>,
    /// First text/html part.
    pub html: Option<String>,
    /// True when the top-level type is `multipart/*`.
    pub multipart: bool,
    /// True when any part declares `Content-Disposition: attachment`.
    pub has_attachment: bool,
}

/// Extracts the readable bodies from a message.
///
/// `headers` is the message header block and `body` the raw text after it.
/// A multipart message is walked recursively; a single-part message is
/// transfer-decoded as a whole.
#[must_use]
pub fn extract_bodies(headers: &Headers, body: &str) -> BodyParts {
    let mut parts = BodyParts::default();
    let content_type = headers
        .get("content-type")
        .and_then(|v| ContentType::parse(v).ok());

    match content_type.as_ref() {
        Some(ct) if ct.is_multipart() => {
            parts.multipart = true;
            if let Some(boundary) = ct.boundary() {
                walk_multipart(body, boundary, 0, &mut parts);
            }
        }
        _ => {
            parts.has_attachment = is_attachment(headers);
            let charset = content_type.as_ref().and_then(ContentType::charset);
            let text = TransferEncoding::from_headers(headers).decode_text(body, charset);
            if content_type.as_ref().is_some_and(|ct| ct.is("text", "html")) {
                parts.html = Some(text);
            } else {
                parts.text = Some(text);
            }
        }
    }

    parts
}

fn walk_multipart(body: &str, boundary: &str, depth: usize, out: &mut BodyParts) {
    if depth >= MAX_DEPTH {
        return;
    }

    for raw_part in split_multipart(body, boundary) {
        let (header_text, part_body) = split_header_body(raw_part);
        let headers = Headers::parse(header_text);
        let content_type = headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(|| ContentType::new("text", "plain"));

        if is_attachment(&headers) {
            out.has_attachment = true;
            continue;
        }

        if content_type.is_multipart() {
            if let Some(nested) = content_type.boundary() {
                walk_multipart(part_body, nested, depth + 1, out);
            }
            continue;
        }

        let encoding = TransferEncoding::from_headers(&headers);
        if content_type.is("text", "plain") && out.text.is_none() {
            out.text = Some(encoding.decode_text(part_body, content_type.charset()));
        } else if content_type.is("text", "html") && out.html.is_none() {
            out.html = Some(encoding.decode_text(part_body, content_type.charset()));
        }
    }
}

/// Splits a multipart body into its raw parts (headers included).
///
/// The preamble before the first delimiter and the epilogue after the
/// closing delimiter are discarded.
#[must_use]
pub fn split_multipart<'a>(body: &'a str, boundary: &str) -> Vec<&'a str> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();

    let mut segments = body.split(delimiter.as_str());
    // Preamble.
    segments.next();

    for segment in segments {
        if segment.starts_with("--") {
            break;
        }
        let part = segment
            .strip_prefix("\r\n")
            .or_else(|| segment.strip_prefix('\n'))
            .unwrap_or(segment);
        let part = part
            .strip_suffix("\r\n")
            .or_else(|| part.strip_suffix('\n'))
            .unwrap_or(part);
        if !part.trim().is_empty() {
            parts.push(part);
        }
    }

    parts
}

/// True when the part headers declare an attachment disposition.
fn is_attachment(headers: &Headers) -> bool {
    headers
        .get("content-disposition")
        .and_then(|v| v.split(';').next())
        .is_some_and(|d| d.trim().eq_ignore_ascii_case("attachment"))
}
