//! Turning one FETCH response into a [`MailMessage`].
//!
//! Subject and sender come from the header block only. The envelope fills
//! in the recipients and the date when the header block lacks them.

use chrono::{DateTime, Utc};
use mailbridge_imap::{Envelope, FetchItem, Flags, SeqNum};
use mailbridge_mime::{Headers, decode_encoded_words, extract_bodies, normalize_date};

use crate::error::{InboxError, Result};
use crate::model::MailMessage;

/// Builds a record from the items of one FETCH response.
///
/// `batch_millis` is the batch timestamp used in the id; `now` replaces a
/// missing or unparsable date.
///
/// # Errors
///
/// Returns [`InboxError::Protocol`] when the header block yields no
/// `Subject` or no `From`.
pub fn build_message(
    seq: SeqNum,
    items: &[FetchItem],
    batch_millis: i64,
    now: DateTime<Utc>,
) -> Result<MailMessage> {
    let mut flags = None;
    let mut envelope = None;
    for item in items {
        match item {
            FetchItem::Flags(f) => flags = Some(f),
            FetchItem::Envelope(e) => envelope = Some(e.as_ref()),
            _ => {}
        }
    }
    let empty = Flags::new();
    let flags = flags.unwrap_or(&empty);

    let header_text = section_text(items, "HEADER").unwrap_or_default();
    let headers = Headers::parse(&header_text);

    let subject = decoded_header(&headers, "subject");
    if subject.is_empty() {
        return Err(InboxError::Protocol(format!("message {seq} has no Subject")));
    }
    let from = decoded_header(&headers, "from");
    if from.is_empty() {
        return Err(InboxError::Protocol(format!("message {seq} has no From")));
    }

    let to = match decoded_header(&headers, "to") {
        to if to.is_empty() => envelope.map(envelope_recipients).unwrap_or_default(),
        to => to,
    };

    let raw_date = headers
        .get("date")
        .or_else(|| envelope.and_then(|e| e.date.as_deref()));
    let date = normalize_date(raw_date, now);

    let raw_text = section_text(items, "TEXT").unwrap_or_default();
    let parts = extract_bodies(&headers, &raw_text);
    let mut body = parts.text.as_deref().map(str::trim).unwrap_or_default().to_string();
    let mut html_body = parts.html.filter(|h| !h.trim().is_empty());

    if let Some(first) = section_text(items, "1").filter(|s| !s.trim().is_empty()) {
        if looks_like_markup(&first) {
            if html_body.is_none() {
                html_body = Some(first);
            }
        } else if body.is_empty() {
            body = first.trim().to_string();
        }
    }

    let has_attachments = flags.mentions("attachment")
        || mentions_attachment(&body)
        || mentions_attachment(&raw_text)
        || parts.multipart
        || parts.has_attachment;

    Ok(MailMessage {
        id: format!("{seq}-{batch_millis}"),
        from,
        to,
        subject,
        body,
        html_body,
        date,
        read: !flags.contains_named("\\Unseen"),
        starred: flags.is_flagged(),
        has_attachments,
    })
}

fn section_text(items: &[FetchItem], section: &str) -> Option<String> {
    items
        .iter()
        .find_map(|item| item.body_section(section))
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

fn decoded_header(headers: &Headers, name: &str) -> String {
    headers.get(name).map(decode_encoded_words).unwrap_or_default()
}

fn envelope_recipients(envelope: &Envelope) -> String {
    let joined = envelope
        .to
        .iter()
        .filter_map(mailbridge_imap::Address::display)
        .collect::<Vec<_>>()
        .join(", ");
    decode_encoded_words(&joined)
}

/// True if `text` holds a doctype, a comment, or a tag such as `<b>`,
/// `</p>` or `<a href=..>`. `<user@host>` is not a tag.
fn looks_like_markup(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if lower.contains("<!doctype") || lower.contains("<!--") {
        return true;
    }

    let bytes = lower.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'<')
        .any(|(i, _)| is_tag_at(&bytes[i + 1..]))
}

/// Matches an optional `/`, a letter, then letters or digits, ending at
/// whitespace, `/` or `>`.
fn is_tag_at(rest: &[u8]) -> bool {
    let rest = rest.strip_prefix(b"/").unwrap_or(rest);
    let Some((&first, tail)) = rest.split_first() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    let name_len = tail.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
    matches!(tail.get(name_len), Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
}

fn mentions_attachment(text: &str) -> bool {
    text.to_ascii_lowercase().contains("attachment")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use mailbridge_imap::{Address, Flag};

    use super::*;

    const BATCH: i64 = 1_700_000_000_000;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn seq(n: u32) -> SeqNum {
        SeqNum::new(n).unwrap()
    }

    fn body(section: &str, data: &str) -> FetchItem {
        FetchItem::Body {
            section: Some(section.to_string()),
            origin: None,
            data: Some(data.as_bytes().to_vec()),
        }
    }

    fn flags(names: &[&str]) -> FetchItem {
        FetchItem::Flags(Flags::from_vec(names.iter().map(|n| Flag::parse(n)).collect()))
    }

    const HEADER: &str = "Subject: =?UTF-8?B?SGVsbG8gd29ybGQ=?=\r\n\
From: Ann <ann@example.com>\r\n\
To: me@example.com\r\n\
Date: Tue, 3 Jun 2025 10:00:00 +0000\r\n\r\n";

    #[test]
    fn test_plain_message() {
        let items = vec![
            flags(&["\\Seen", "\\Flagged"]),
            body("HEADER", HEADER),
            body("TEXT", "See you at noon.\r\n"),
            body("1", "See you at noon.\r\n"),
        ];

        let message = build_message(seq(3), &items, BATCH, now()).unwrap();
        assert_eq!(message.id, "3-1700000000000");
        assert_eq!(message.subject, "Hello world");
        assert_eq!(message.from, "Ann <ann@example.com>");
        assert_eq!(message.to, "me@example.com");
        assert_eq!(message.date, "2025-06-03T10:00:00.000Z");
        assert_eq!(message.body, "See you at noon.");
        assert!(message.html_body.is_none());
        assert!(message.read);
        assert!(message.starred);
        assert!(!message.has_attachments);
    }

    #[test]
    fn test_unseen_keyword_marks_unread() {
        let items = vec![flags(&["\\Unseen"]), body("HEADER", HEADER)];
        let message = build_message(seq(1), &items, BATCH, now()).unwrap();
        assert!(!message.read);
        assert!(!message.starred);
    }

    #[test]
    fn test_missing_subject_or_from_rejected() {
        let no_subject = vec![body("HEADER", "From: a@b.c\r\n\r\n")];
        assert!(matches!(
            build_message(seq(1), &no_subject, BATCH, now()),
            Err(InboxError::Protocol(_))
        ));

        let no_from = vec![body("HEADER", "Subject: hi\r\n\r\n")];
        assert!(build_message(seq(1), &no_from, BATCH, now()).is_err());

        assert!(build_message(seq(1), &[flags(&["\\Seen"])], BATCH, now()).is_err());
    }

    #[test]
    fn test_envelope_fills_to_and_date() {
        let envelope = Envelope {
            date: Some("Wed, 4 Jun 2025 08:30:00 +0200".to_string()),
            subject: Some("ignored".to_string()),
            to: vec![
                Address {
                    name: Some("Bob".to_string()),
                    adl: None,
                    mailbox: Some("bob".to_string()),
                    host: Some("example.com".to_string()),
                },
                Address {
                    name: None,
                    adl: None,
                    mailbox: Some("carol".to_string()),
                    host: Some("example.org".to_string()),
                },
            ],
            ..Envelope::default()
        };
        let items = vec![
            FetchItem::Envelope(Box::new(envelope)),
            body("HEADER", "Subject: Real\r\nFrom: x@y.z\r\n\r\n"),
        ];

        let message = build_message(seq(2), &items, BATCH, now()).unwrap();
        assert_eq!(message.subject, "Real");
        assert_eq!(message.to, "Bob <bob@example.com>, carol@example.org");
        assert_eq!(message.date, "2025-06-04T06:30:00.000Z");
    }

    #[test]
    fn test_bad_date_falls_back_to_now() {
        let items = vec![body("HEADER", "Subject: s\r\nFrom: f\r\nDate: someday\r\n\r\n")];
        let message = build_message(seq(1), &items, BATCH, now()).unwrap();
        assert_eq!(message.date, "2026-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_multipart_bodies_extracted() {
        let header = "Subject: Menu\r\nFrom: chef@example.com\r\n\
Content-Type: multipart/alternative; boundary=\"b1\"\r\n\r\n";
        let text = "--b1\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\r\n\
Soup =E2=80=93 bread\r\n\
--b1\r\n\
Content-Type: text/html; charset=utf-8\r\n\r\n\
<p>Soup &ndash; bread</p>\r\n\
--b1--\r\n";
        let items = vec![
            body("HEADER", header),
            body("TEXT", text),
            body("1", "Soup =E2=80=93 bread"),
        ];

        let message = build_message(seq(5), &items, BATCH, now()).unwrap();
        assert_eq!(message.body, "Soup \u{2013} bread");
        assert_eq!(message.html_body.as_deref(), Some("<p>Soup &ndash; bread</p>"));
        assert!(message.has_attachments);
    }

    #[test]
    fn test_first_part_markup_becomes_html() {
        let items = vec![
            body("HEADER", "Subject: s\r\nFrom: f\r\n\r\n"),
            body("1", "<html><body><p>Hi</p></body></html>"),
        ];
        let message = build_message(seq(1), &items, BATCH, now()).unwrap();
        assert_eq!(
            message.html_body.as_deref(),
            Some("<html><body><p>Hi</p></body></html>")
        );
        assert_eq!(message.body, "");
    }

    #[test]
    fn test_inline_tags_count_as_markup() {
        let items = vec![
            body("HEADER", "Subject: s\r\nFrom: f\r\n\r\n"),
            body("1", "<b>Sale</b> today"),
        ];
        let message = build_message(seq(1), &items, BATCH, now()).unwrap();
        assert_eq!(message.html_body.as_deref(), Some("<b>Sale</b> today"));
        assert_eq!(message.body, "");

        for html in ["<strong>x</strong>", "<ul><li>a</li></ul>", "<h1>Hi</h1>", "x<br/>y"] {
            assert!(looks_like_markup(html), "{html}");
        }
        for plain in ["a < b", "<user@host>", "1 <2 and 3> 2", "<>", "< b>"] {
            assert!(!looks_like_markup(plain), "{plain}");
        }
    }

    #[test]
    fn test_first_part_fills_empty_body() {
        let items = vec![
            body("HEADER", "Subject: s\r\nFrom: f\r\n\r\n"),
            body("1", "plain words, write to <ann@example.com>\r\n"),
        ];
        let message = build_message(seq(1), &items, BATCH, now()).unwrap();
        assert_eq!(message.body, "plain words, write to <ann@example.com>");
        assert!(message.html_body.is_none());
    }

    #[test]
    fn test_attachment_mentions() {
        let items = vec![
            flags(&["$HasAttachment"]),
            body("HEADER", "Subject: s\r\nFrom: f\r\n\r\n"),
        ];
        assert!(build_message(seq(1), &items, BATCH, now()).unwrap().has_attachments);

        let items = vec![
            body("HEADER", "Subject: s\r\nFrom: f\r\n\r\n"),
            body("TEXT", "The report is in the Attachment."),
        ];
        assert!(build_message(seq(1), &items, BATCH, now()).unwrap().has_attachments);
    }
}
