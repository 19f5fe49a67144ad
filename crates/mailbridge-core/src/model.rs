//! Request and record types.

use serde::{Deserialize, Deserializer, Serialize};

use mailbridge_imap::connection::IMPLICIT_TLS_PORT;

/// Where and as whom to connect for one fetch.
///
/// Built from the request body's `imap_config` object. Absent or `null`
/// string fields become empty strings; the port may be a number or a
/// numeric string and defaults to 993.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname.
    #[serde(default, deserialize_with = "nullable_string")]
    pub host: String,
    /// Server port. 993 means implicit TLS.
    #[serde(default = "default_port", deserialize_with = "port_number_or_text")]
    pub port: u16,
    /// Login name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub user: String,
    /// Login password.
    #[serde(default, deserialize_with = "nullable_string")]
    pub pass: String,
}

impl ConnectionConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        pass: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Returns true when user or password is empty or whitespace.
    #[must_use]
    pub fn has_blank_credentials(&self) -> bool {
        self.user.trim().is_empty() || self.pass.trim().is_empty()
    }
}

// The password never reaches logs.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

const fn default_port() -> u16 {
    IMPLICIT_TLS_PORT
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn port_number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(default_port()),
        Some(Port::Number(n)) => Ok(n),
        Some(Port::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One normalized inbox message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    /// `"{seq}-{batch_millis}"`, unique within a batch.
    pub id: String,
    /// Decoded `From:` header.
    pub from: String,
    /// Decoded `To:` header, or the envelope recipients.
    pub to: String,
    /// Decoded `Subject:` header.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// HTML body, when the message has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    /// RFC 3339 UTC timestamp.
    pub date: String,
    /// False only when the flags carry `\Unseen`.
    pub read: bool,
    /// `\Flagged` is set.
    pub starred: bool,
    /// Attachment heuristic (multipart, disposition, or a mention).
    pub has_attachments: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"host":"imap.example.com","port":993,"user":"a@example.com","pass":"pw"}"#,
        )
        .unwrap();
        assert_eq!(config, ConnectionConfig::new("imap.example.com", 993, "a@example.com", "pw"));
    }

    #[test]
    fn test_config_lenient_fields() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"host":"h","port":"1143","user":null}"#).unwrap();
        assert_eq!(config.port, 1143);
        assert_eq!(config.user, "");
        assert_eq!(config.pass, "");
        assert!(config.has_blank_credentials());

        let config: ConnectionConfig = serde_json::from_str(r#"{"host":"h"}"#).unwrap();
        assert_eq!(config.port, 993);
    }

    #[test]
    fn test_config_rejects_bad_port() {
        assert!(serde_json::from_str::<ConnectionConfig>(r#"{"port":"imap"}"#).is_err());
        assert!(serde_json::from_str::<ConnectionConfig>(r#"{"port":70000}"#).is_err());
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = ConnectionConfig::new("h", 993, "u", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_blank_credentials() {
        assert!(ConnectionConfig::new("h", 993, "  ", "pw").has_blank_credentials());
        assert!(ConnectionConfig::new("h", 993, "u", "").has_blank_credentials());
        assert!(!ConnectionConfig::new("h", 993, "u", "pw").has_blank_credentials());
    }

    #[test]
    fn test_message_json_shape() {
        let message = MailMessage {
            id: "3-1700000000000".to_string(),
            from: "Ann <ann@example.com>".to_string(),
            to: "me@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            html_body: None,
            date: "2025-06-03T10:00:00.000Z".to_string(),
            read: true,
            starred: false,
            has_attachments: false,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["hasAttachments"], false);
        assert_eq!(json["id"], "3-1700000000000");
        assert!(json.get("htmlBody").is_none());

        let with_html = MailMessage {
            html_body: Some("<p>Hello</p>".to_string()),
            ..message
        };
        assert_eq!(serde_json::to_value(&with_html).unwrap()["htmlBody"], "<p>Hello</p>");
    }
}
