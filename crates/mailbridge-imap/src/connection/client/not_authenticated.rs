//! Implementation for the not-authenticated state.

use std::marker::PhantomData;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use super::states::{Authenticated, NotAuthenticated};
use super::{Client, DEFAULT_IO_TIMEOUT};
use crate::command::{Command, TagGenerator};
use crate::connection::config::Config;
use crate::connection::framed::FramedStream;
use crate::connection::stream::{self, ImapStream};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{ResponseCode, Status};
use crate::{Error, Result};

/// Verdict on a LOGIN exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The server accepted the credentials.
    Accepted,
    /// The server refused, or the reply could not be read as acceptance.
    Rejected(String),
}

/// Classifies the responses collected for a LOGIN sent under `tag`.
///
/// A parsed tagged completion decides directly. When the completion line
/// does not parse, the raw text is checked for the markers servers use in
/// practice. Anything unrecognized counts as a rejection.
#[must_use]
pub fn classify_login(tag: &str, responses: &[Vec<u8>]) -> LoginOutcome {
    for response_bytes in responses {
        match ResponseParser::parse(response_bytes) {
            Ok(Response::Untagged(UntaggedResponse::Bye { text, .. })) => {
                return LoginOutcome::Rejected(text);
            }
            Ok(Response::Tagged {
                tag: resp_tag,
                status,
                text,
                ..
            }) if resp_tag.as_str() == tag => {
                if status == Status::Ok {
                    return LoginOutcome::Accepted;
                }
                return LoginOutcome::Rejected(text);
            }
            _ => {}
        }
    }

    let raw: String = responses
        .iter()
        .map(|r| String::from_utf8_lossy(r))
        .collect();

    if raw.contains("AUTHENTICATIONFAILED") || raw.contains("LOGIN failed") || raw.contains(" NO ")
    {
        return LoginOutcome::Rejected(raw.trim().to_string());
    }
    if raw.contains("LOGIN completed") || raw.contains(&format!("{tag} OK")) {
        return LoginOutcome::Accepted;
    }

    debug!("unrecognized LOGIN reply");
    LoginOutcome::Rejected("unrecognized LOGIN response".to_string())
}

impl Client<ImapStream, NotAuthenticated> {
    /// Opens the transport described by `config` and reads the greeting.
    ///
    /// The greeting read is bounded by `config.io_timeout`, which also
    /// becomes the client's per-exchange bound.
    pub async fn connect(config: &Config) -> Result<Self> {
        let stream = stream::connect(config).await?;
        let timeout = config.io_timeout;
        let client = tokio::time::timeout(timeout, Self::from_stream(stream))
            .await
            .map_err(|_| Error::Timeout(timeout))??;

        info!(host = %config.host, port = config.port, "connected");
        Ok(client.with_io_timeout(timeout))
    }
}

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new client from a connected stream.
    ///
    /// Reads the server greeting and any capabilities it carries. A BYE
    /// greeting is an error.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);

        let greeting = framed.read_response().await?;
        let response = ResponseParser::parse(&greeting)?;

        let mut capabilities = Vec::new();
        if let Response::Untagged(untagged) = response {
            match untagged {
                UntaggedResponse::Ok {
                    code: Some(ResponseCode::Capability(caps)),
                    ..
                }
                | UntaggedResponse::PreAuth {
                    code: Some(ResponseCode::Capability(caps)),
                    ..
                } => {
                    capabilities = caps;
                }
                UntaggedResponse::Bye { text, .. } => {
                    return Err(Error::Bye(text));
                }
                _ => {}
            }
        }

        Ok(Self {
            stream: framed,
            tag_gen: TagGenerator::default(),
            capabilities,
            io_timeout: DEFAULT_IO_TIMEOUT,
            _state: PhantomData,
        })
    }

    /// Authenticates with the server using LOGIN.
    ///
    /// Consumes self and returns an authenticated client on success. A
    /// rejected LOGIN is [`Error::Auth`]; the connection is logged out
    /// before the error is returned. A BYE followed by a close is also
    /// [`Error::Auth`], with nothing left to log out of. LOGIN is not sent
    /// at all when the greeting announced `LOGINDISABLED`.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        if self.has_capability("LOGINDISABLED") {
            self.logout().await;
            return Err(Error::Auth("LOGIN disabled by server".to_string()));
        }

        let command = Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        let (tag, responses) = match self.exchange(&command).await {
            Ok(exchanged) => exchanged,
            Err(Error::Bye(text)) => return Err(Error::Auth(text)),
            Err(e) => return Err(e),
        };

        for response_bytes in &responses {
            if let Ok(Response::Untagged(UntaggedResponse::Capability(caps))) =
                ResponseParser::parse(response_bytes)
            {
                self.capabilities = caps;
            }
        }

        match classify_login(&tag, &responses) {
            LoginOutcome::Accepted => {
                debug!(tag = %tag, "login accepted");
                Ok(self.transition())
            }
            LoginOutcome::Rejected(text) => {
                self.logout().await;
                Err(Error::Auth(text))
            }
        }
    }
}
