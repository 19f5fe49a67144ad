//! Illustrative inbox served when the real one cannot be reached.

use chrono::{DateTime, Duration, Utc};
use mailbridge_mime::format_rfc3339;

use crate::model::MailMessage;

/// Returns four sample messages stamped relative to `now`.
///
/// Ids follow the `"{seq}-{batch_millis}"` scheme of real batches.
#[must_use]
pub fn mock_batch(now: DateTime<Utc>) -> Vec<MailMessage> {
    let millis = now.timestamp_millis();
    let message = |seq: u32, hours_ago: i64, from: &str, subject: &str, body: &str| MailMessage {
        id: format!("{seq}-{millis}"),
        from: from.to_string(),
        to: "inbox@example.com".to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        html_body: None,
        date: format_rfc3339(now - Duration::hours(hours_ago)),
        read: true,
        starred: false,
        has_attachments: false,
    };

    vec![
        MailMessage {
            read: false,
            ..message(
                1,
                1,
                "Maria Lopez <maria.lopez@example.com>",
                "Quote request for the spring campaign",
                "Hi, could you send over a quote for 500 printed flyers by Friday?",
            )
        },
        MailMessage {
            starred: true,
            has_attachments: true,
            html_body: Some("<p>Invoice <b>INV-2041</b> is attached.</p>".to_string()),
            ..message(
                2,
                5,
                "Accounts <billing@supplier.example>",
                "Invoice INV-2041",
                "Invoice INV-2041 is attached. Payment is due within 30 days.",
            )
        },
        message(
            3,
            26,
            "Tom Becker <tom@example.net>",
            "Re: Meeting on Thursday",
            "Thursday at 10:00 works for me. See you then.",
        ),
        MailMessage {
            read: false,
            starred: true,
            ..message(
                4,
                72,
                "Support <noreply@service.example>",
                "Your subscription renews soon",
                "Your annual plan renews in 7 days. No action is needed.",
            )
        },
    ]
}
