//! Mailbox state reported by SELECT.

use super::Flags;

/// Mailbox snapshot collected from the untagged data of a SELECT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of messages with the `\Recent` flag.
    pub recent: u32,
    /// Flags defined for the mailbox.
    pub flags: Flags,
    /// UIDVALIDITY value, if announced.
    pub uid_validity: Option<u32>,
    /// Predicted next UID, if announced.
    pub uid_next: Option<u32>,
    /// First unseen sequence number, if announced.
    pub unseen: Option<u32>,
    /// True when the server opened the mailbox read-only.
    pub read_only: bool,
}
