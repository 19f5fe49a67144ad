//! IMAP command builder.
//!
//! Only the commands the inbox path needs are modelled. Each serializes to a
//! single CRLF-terminated line; none of them sends a literal.

mod serialize;
mod tag_generator;
mod types;

use crate::types::SeqNum;

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, FetchItems, SearchCriteria};

use serialize::{write_astring, write_fetch_items};

/// IMAP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// SELECT command.
    Select {
        /// Mailbox to select.
        mailbox: String,
    },
    /// SEARCH command.
    Search {
        /// Search criteria.
        criteria: SearchCriteria,
    },
    /// FETCH command for one message.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Items to fetch.
        items: FetchItems,
    },
    /// LOGOUT command.
    Logout,
}

impl Command {
    /// Returns the command keyword.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "LOGIN",
            Self::Select { .. } => "SELECT",
            Self::Search { .. } => "SEARCH",
            Self::Fetch { .. } => "FETCH",
            Self::Logout => "LOGOUT",
        }
    }

    /// Serializes the command with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.name().as_bytes());

        match self {
            Self::Login { username, password } => {
                buf.push(b' ');
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }
            Self::Select { mailbox } => {
                buf.push(b' ');
                write_astring(&mut buf, mailbox);
            }
            Self::Search { criteria } => {
                buf.push(b' ');
                buf.extend_from_slice(criteria.as_str().as_bytes());
            }
            Self::Fetch { seq, items } => {
                buf.extend_from_slice(format!(" {seq} ").as_bytes());
                write_fetch_items(&mut buf, items);
            }
            Self::Logout => {}
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

// Credentials stay out of logs and panic messages.
impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Select { mailbox } => f.debug_struct("Select").field("mailbox", mailbox).finish(),
            Self::Search { criteria } => {
                f.debug_struct("Search").field("criteria", criteria).finish()
            }
            Self::Fetch { seq, items } => f
                .debug_struct("Fetch")
                .field("seq", seq)
                .field("items", items)
                .finish(),
            Self::Logout => f.write_str("Logout"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_plain() {
        let cmd = Command::Login {
            username: "user".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(cmd.serialize("A001"), b"A001 LOGIN user secret\r\n");
    }

    #[test]
    fn test_login_quotes_special_characters() {
        let cmd = Command::Login {
            username: "jane doe@example.com".to_string(),
            password: "p\"w d".to_string(),
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 LOGIN \"jane doe@example.com\" \"p\\\"w d\"\r\n"
        );
    }

    #[test]
    fn test_select() {
        let cmd = Command::Select {
            mailbox: "INBOX".to_string(),
        };
        assert_eq!(cmd.serialize("A002"), b"A002 SELECT INBOX\r\n");
    }

    #[test]
    fn test_search() {
        let recent = Command::Search {
            criteria: SearchCriteria::Recent,
        };
        let all = Command::Search {
            criteria: SearchCriteria::All,
        };
        assert_eq!(recent.serialize("A003"), b"A003 SEARCH RECENT\r\n");
        assert_eq!(all.serialize("A004"), b"A004 SEARCH ALL\r\n");
    }

    #[test]
    fn test_fetch_message_view() {
        let cmd = Command::Fetch {
            seq: SeqNum::new(7).unwrap(),
            items: FetchItems::message_view(),
        };
        assert_eq!(
            cmd.serialize("A005"),
            b"A005 FETCH 7 (FLAGS ENVELOPE BODY.PEEK[HEADER] BODY.PEEK[TEXT] BODY.PEEK[1])\r\n"
        );
    }

    #[test]
    fn test_logout() {
        assert_eq!(Command::Logout.serialize("A006"), b"A006 LOGOUT\r\n");
    }

    #[test]
    fn test_debug_redacts_password() {
        let cmd = Command::Login {
            username: "user".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{cmd:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }
}
