//! MIME header handling.

use std::collections::HashMap;

/// Collection of email headers.
///
/// Names compare case-insensitively. Values are kept raw (still
/// RFC 2047-encoded) with folded lines joined by a single space.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        let value = value.into();
        self.headers.entry(name).or_default().push(value);
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Parses a header block.
    ///
    /// Parsing stops at the first empty line. Lines starting with a space
    /// or tab continue the previous header. Lines without a colon are
    /// skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value.trim());
            }

            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value.trim());
        }

        headers
    }
}

/// Splits a message or part into its header block and body at the first
/// blank line. Without a blank line everything is header.
#[must_use]
pub fn split_header_body(message: &str) -> (&str, &str) {
    let crlf = message.find("\r\n\r\n").map(|i| (i, 4));
    let lf = message.find("\n\n").map(|i| (i, 2));

    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((idx, len)) => (&message[..idx], &message[idx + len..]),
        None => (message, ""),
    }
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
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_headers_parse() {
        let text = "From: sender@example.com\r\nTo: recipient@example.com\r\nSubject: Test\r\n\r\nbody";
        let headers = Headers::parse(text);

        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test"));
        assert_eq!(headers.get("body"), None);
    }

    #[test]
    fn test_headers_parse_continuation() {
        let text = "Subject: This is a long\r\n  subject line\r\n\tcontinued\r\nFrom: a@b.c\r\n";
        let headers = Headers::parse(text);

        assert_eq!(
            headers.get("Subject"),
            Some("This is a long subject line continued")
        );
        assert_eq!(headers.get("From"), Some("a@b.c"));
    }

    #[test]
    fn test_headers_value_with_colon() {
        let headers = Headers::parse("Date: Tue, 3 Jun 2025 10:00:00 +0000\n");
        assert_eq!(headers.get("date"), Some("Tue, 3 Jun 2025 10:00:00 +0000"));
    }

    #[test]
    fn test_headers_repeated() {
        let headers = Headers::parse("Received: a\r\nReceived: b\r\n");
        assert_eq!(headers.get("received"), Some("a"));
    }

    #[test]
    fn test_split_header_body() {
        assert_eq!(split_header_body("A: 1\r\n\r\nbody"), ("A: 1", "body"));
        assert_eq!(split_header_body("A: 1\n\nbody\r\n\r\nmore"), ("A: 1", "body\r\n\r\nmore"));
        assert_eq!(split_header_body("A: 1\r\n"), ("A: 1\r\n", ""));
    }
}
