//! Bracketed response codes (`[UIDVALIDITY 3857529045]` and friends).

/// Response code carried in `OK`/`NO`/`BAD` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// Human-readable alert the client must show.
    Alert,
    /// Credentials were rejected (RFC 5530).
    AuthenticationFailed,
    /// Server capabilities.
    Capability(Vec<String>),
    /// Mailbox was opened read-only.
    ReadOnly,
    /// Mailbox was opened read-write.
    ReadWrite,
    /// UIDVALIDITY of the selected mailbox.
    UidValidity(u32),
    /// Predicted next UID.
    UidNext(u32),
    /// First unseen message.
    Unseen(u32),
    /// Anything else; the atom is kept verbatim.
    Other(String),
}
