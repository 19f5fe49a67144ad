//! Implementation for the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::Client;
use super::states::{Authenticated, Selected};
use crate::Result;
use crate::command::Command;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{MailboxStatus, ResponseCode};

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Selects a mailbox.
    ///
    /// Consumes self and returns a selected client on success, together with
    /// the status collected from the SELECT data. When the server refuses
    /// the mailbox the connection is logged out before the error is
    /// returned.
    pub async fn select(mut self, mailbox: &str) -> Result<(Client<S, Selected>, MailboxStatus)> {
        let command = Command::Select {
            mailbox: mailbox.to_string(),
        };
        let (tag, responses) = self.exchange(&command).await?;
        if let Err(e) = Self::check_tagged_ok(&responses, &tag) {
            self.logout().await;
            return Err(e);
        }

        let status = parse_mailbox_status(&responses);
        debug!(
            mailbox,
            exists = status.exists,
            recent = status.recent,
            "mailbox selected"
        );

        Ok((self.transition(), status))
    }
}

/// Collects mailbox status from SELECT responses.
fn parse_mailbox_status(responses: &[Vec<u8>]) -> MailboxStatus {
    let mut status = MailboxStatus::default();

    for response_bytes in responses {
        match ResponseParser::parse(response_bytes) {
            Ok(Response::Untagged(untagged)) => match untagged {
                UntaggedResponse::Exists(n) => status.exists = n,
                UntaggedResponse::Recent(n) => status.recent = n,
                UntaggedResponse::Flags(flags) => status.flags = flags,
                UntaggedResponse::Ok {
                    code: Some(code), ..
                } => match code {
                    ResponseCode::UidValidity(v) => status.uid_validity = Some(v),
                    ResponseCode::UidNext(v) => status.uid_next = Some(v),
                    ResponseCode::Unseen(v) => status.unseen = Some(v),
                    _ => {}
                },
                _ => {}
            },
            Ok(Response::Tagged {
                code: Some(ResponseCode::ReadOnly),
                ..
            }) => status.read_only = true,
            _ => {}
        }
    }

    status
}
