//! Arguments for SEARCH and FETCH.

/// SEARCH criteria issued by the inbox session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Every message in the mailbox.
    All,
    /// Messages carrying `\Recent`.
    Recent,
}

impl SearchCriteria {
    /// Returns the wire keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Recent => "RECENT",
        }
    }
}

/// A single FETCH data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// `FLAGS`
    Flags,
    /// `ENVELOPE`
    Envelope,
    /// `UID`
    Uid,
    /// `RFC822.SIZE`
    Rfc822Size,
    /// `INTERNALDATE`
    InternalDate,
    /// `BODY[section]` or `BODY.PEEK[section]`.
    Body {
        /// Section specifier such as `HEADER`, `TEXT` or `1`; `None` for the whole message.
        section: Option<String>,
        /// Use `.PEEK` so the server does not set `\Seen`.
        peek: bool,
    },
}

impl FetchAttribute {
    /// `BODY.PEEK[<section>]`
    #[must_use]
    pub fn peek(section: &str) -> Self {
        Self::Body {
            section: Some(section.to_string()),
            peek: true,
        }
    }
}

/// The parenthesized list of FETCH data items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchItems(pub Vec<FetchAttribute>);

impl FetchItems {
    /// The item list used to build an inbox record:
    /// `(FLAGS ENVELOPE BODY.PEEK[HEADER] BODY.PEEK[TEXT] BODY.PEEK[1])`.
    #[must_use]
    pub fn message_view() -> Self {
        Self(vec![
            FetchAttribute::Flags,
            FetchAttribute::Envelope,
            FetchAttribute::peek("HEADER"),
            FetchAttribute::peek("TEXT"),
            FetchAttribute::peek("1"),
        ])
    }
}
