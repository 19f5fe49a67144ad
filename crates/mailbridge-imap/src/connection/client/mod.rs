//! Type-state IMAP client connection.
//!
//! Uses the type-state pattern to enforce valid state transitions at compile time.
//! The IMAP connection states are:
//!
//! - `NotAuthenticated`: Initial state after the greeting
//! - `Authenticated`: After a successful LOGIN
//! - `Selected`: After a successful SELECT
//!
//! Each state only exposes methods that are valid for that state. Every
//! command exchange is bounded by the client's I/O timeout.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use std::marker::PhantomData;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

pub use self::not_authenticated::{LoginOutcome, classify_login};
pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser};
use crate::types::Status;
use crate::{Error, Result};

/// Default bound on one command exchange.
pub(crate) const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(60);

/// IMAP client connection with type-state.
///
/// The type parameter `State` tracks the connection state at compile time.
pub struct Client<S, State> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<String>,
    pub(crate) io_timeout: Duration,
    _state: PhantomData<State>,
}

// Manual Debug implementation since FramedStream doesn't implement Debug
impl<S, State> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tag_gen", &self.tag_gen)
            .field("capabilities", &self.capabilities)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

/// Shared implementation for all states.
impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Checks if the server announced a capability (case-insensitive).
    #[must_use]
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name))
    }

    /// Returns the bound applied to each command exchange.
    #[must_use]
    pub const fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    /// Replaces the bound applied to each command exchange.
    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Sends LOGOUT and consumes the connection.
    ///
    /// The exchange is bounded by the I/O timeout and its outcome is
    /// ignored. The socket is dropped when this returns.
    pub async fn logout(mut self) {
        if let Err(e) = self.exchange(&Command::Logout).await {
            debug!(error = %e, "logout did not complete cleanly");
        }
    }

    /// Runs one command: writes it under a fresh tag, then reads until the
    /// tagged completion. Returns the tag and every response read.
    pub(crate) async fn exchange(&mut self, command: &Command) -> Result<(String, Vec<Vec<u8>>)> {
        let tag = self.tag_gen.next();
        let bytes = command.serialize(&tag);
        debug!(tag = %tag, command = command.name(), "sending command");

        let timeout = self.io_timeout;
        let stream = &mut self.stream;
        let responses = tokio::time::timeout(timeout, async {
            stream.write_command(&bytes).await?;
            stream.read_until_tagged(&tag).await
        })
        .await
        .map_err(|_| Error::Timeout(timeout))??;

        debug!(tag = %tag, responses = responses.len(), "command completed");
        Ok((tag, responses))
    }

    /// Moves the connection into another state.
    pub(crate) fn transition<Next>(self) -> Client<S, Next> {
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            io_timeout: self.io_timeout,
            _state: PhantomData,
        }
    }

    /// Checks that the tagged response is OK.
    pub(crate) fn check_tagged_ok(responses: &[Vec<u8>], tag: &str) -> Result<()> {
        // The tagged response is the last one.
        for response_bytes in responses.iter().rev() {
            if let Ok(Response::Tagged {
                tag: resp_tag,
                status,
                code: _,
                text,
            }) = ResponseParser::parse(response_bytes)
                && resp_tag.as_str() == tag
            {
                return match status {
                    Status::Ok | Status::PreAuth => Ok(()),
                    Status::No => Err(Error::No(text)),
                    Status::Bad => Err(Error::Bad(text)),
                    Status::Bye => Err(Error::Bye(text)),
                };
            }
        }

        Err(Error::Protocol("missing tagged response".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    #[test]
    fn test_check_tagged_ok() {
        let ok = vec![b"* 1 EXISTS\r\n".to_vec(), b"A001 OK done\r\n".to_vec()];
        assert!(Client::<tokio_test::io::Mock, Selected>::check_tagged_ok(&ok, "A001").is_ok());

        let no = vec![b"A002 NO [NONEXISTENT] no such mailbox\r\n".to_vec()];
        match Client::<tokio_test::io::Mock, Selected>::check_tagged_ok(&no, "A002") {
            Err(Error::No(text)) => assert_eq!(text, "no such mailbox"),
            other => panic!("expected NO, got {other:?}"),
        }

        let bad = vec![b"A003 BAD parse error\r\n".to_vec()];
        assert!(matches!(
            Client::<tokio_test::io::Mock, Selected>::check_tagged_ok(&bad, "A003"),
            Err(Error::Bad(_))
        ));

        let other_tag = vec![b"A009 OK done\r\n".to_vec()];
        assert!(matches!(
            Client::<tokio_test::io::Mock, Selected>::check_tagged_ok(&other_tag, "A004"),
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_times_out() {
        // Server accepts the command and then goes quiet.
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A001 SELECT INBOX\r\n")
            .wait(Duration::from_secs(600))
            .build();

        let client = Client::from_stream(mock)
            .await
            .unwrap()
            .with_io_timeout(Duration::from_secs(5));
        let mut client: Client<_, Authenticated> = client.transition();

        let err = client
            .exchange(&Command::Select {
                mailbox: "INBOX".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(5)));
        assert!(err.is_connection_lost());
    }

    #[tokio::test]
    async fn test_logout_ignores_failure() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A001 LOGOUT\r\n")
            .read(b"* BYE logging out\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        client.logout().await;
    }
}
