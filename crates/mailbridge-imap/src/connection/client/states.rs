//! Type-state markers for IMAP client connection states.

/// Marker type for the not-authenticated state.
///
/// In this state, only LOGIN and LOGOUT are valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Marker type for the authenticated state.
///
/// In this state, SELECT is valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// Marker type for the selected state.
///
/// In this state, SEARCH and FETCH against the selected mailbox are valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selected;
