//! Response data types.

use crate::types::{Flags, ResponseCode, SeqNum};

/// FETCH response item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// Message flags.
    Flags(Flags),
    /// Internal date.
    InternalDate(String),
    /// RFC822 size.
    Rfc822Size(u32),
    /// Envelope.
    Envelope(Box<Envelope>),
    /// UID.
    Uid(u32),
    /// BODY section.
    Body {
        /// Section specifier, upper-cased (`HEADER`, `TEXT`, `1`, ...).
        section: Option<String>,
        /// Origin offset for partial fetches.
        origin: Option<u32>,
        /// Body data; `None` for NIL.
        data: Option<Vec<u8>>,
    },
}

impl FetchItem {
    /// Returns the body bytes if this is the `BODY[section]` item asked for.
    #[must_use]
    pub fn body_section(&self, wanted: &str) -> Option<&[u8]> {
        match self {
            Self::Body {
                section: Some(section),
                data: Some(data),
                ..
            } if section.eq_ignore_ascii_case(wanted) => Some(data),
            _ => None,
        }
    }
}

/// Message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Date header.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

/// Email address from envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Source route (obsolete).
    pub adl: Option<String>,
    /// Mailbox name (local part).
    pub mailbox: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

impl Address {
    /// Returns the full email address.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        match (&self.mailbox, &self.host) {
            (Some(m), Some(h)) => Some(format!("{m}@{h}")),
            _ => None,
        }
    }

    /// Formats as `Name <addr>`, or just the address when there is no name.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        let email = self.email()?;
        Some(match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("{name} <{email}>"),
            None => email,
        })
    }
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// OK response with optional code.
    Ok {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// NO response.
    No {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// BAD response.
    Bad {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// PREAUTH greeting.
    PreAuth {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// BYE response.
    Bye {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// CAPABILITY response.
    Capability(Vec<String>),
    /// FLAGS response.
    Flags(Flags),
    /// EXISTS response (message count).
    Exists(u32),
    /// RECENT response.
    Recent(u32),
    /// SEARCH response.
    Search(Vec<SeqNum>),
    /// FETCH response.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Fetched items.
        items: Vec<FetchItem>,
    },
    /// Any untagged data this client does not interpret (LIST, STATUS, EXPUNGE, ...).
    Other {
        /// The response keyword.
        keyword: String,
    },
}
