//! Connecting and logging in.
//!
//! Maps transport and LOGIN failures onto [`InboxError`] classes: a refused
//! LOGIN (or blank credentials) is [`InboxError::Authentication`], anything
//! that breaks the connection first is [`InboxError::Connection`].

use mailbridge_imap::{Authenticated, Client, Config, ImapStream, NotAuthenticated};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::error::{InboxError, Result};
use crate::handler::FetchOptions;
use crate::model::ConnectionConfig;

/// Rejects empty or whitespace-only user and password before any I/O.
///
/// # Errors
///
/// Returns [`InboxError::Authentication`] for blank credentials.
pub fn validate_credentials(config: &ConnectionConfig) -> Result<()> {
    if config.has_blank_credentials() {
        return Err(InboxError::Authentication(
            "Missing email credentials".to_string(),
        ));
    }
    Ok(())
}

/// Builds the transport configuration for `config`.
#[must_use]
pub fn transport_config(config: &ConnectionConfig, options: &FetchOptions) -> Config {
    Config::builder(config.host.trim())
        .port(config.port)
        .connect_timeout(options.connect_timeout)
        .io_timeout(options.io_timeout)
        .build()
}

/// Opens the connection and reads the greeting.
///
/// # Errors
///
/// Any transport, TLS or greeting failure is [`InboxError::Connection`].
pub async fn connect(
    config: &ConnectionConfig,
    options: &FetchOptions,
) -> Result<Client<ImapStream, NotAuthenticated>> {
    let transport = transport_config(config, options);
    debug!(
        host = %transport.host,
        port = transport.port,
        security = ?transport.security,
        "connecting"
    );

    Client::connect(&transport).await.map_err(|e| {
        warn!(host = %transport.host, port = transport.port, error = %e, "connection failed");
        InboxError::Connection(e.to_string())
    })
}

/// Sends LOGIN with the configured credentials.
///
/// # Errors
///
/// A refused LOGIN, or a BYE in place of its completion, is
/// [`InboxError::Authentication`]; the connection is already closed by then.
/// A broken connection is [`InboxError::Connection`].
pub async fn authenticate<S>(
    client: Client<S, NotAuthenticated>,
    config: &ConnectionConfig,
) -> Result<Client<S, Authenticated>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match client.login(&config.user, &config.pass).await {
        Ok(client) => {
            debug!(user = %config.user, "authenticated");
            Ok(client)
        }
        Err(mailbridge_imap::Error::Auth(text)) => {
            warn!(user = %config.user, reason = %text, "login rejected");
            Err(InboxError::Authentication(text))
        }
        Err(e) => Err(InboxError::Connection(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use mailbridge_imap::Security;
    use tokio_test::io::Builder;

    use super::*;

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials(&ConnectionConfig::new("h", 993, "u", "p")).is_ok());
        assert!(
            validate_credentials(&ConnectionConfig::new("h", 993, "", "p"))
                .unwrap_err()
                .is_auth()
        );
        assert!(
            validate_credentials(&ConnectionConfig::new("h", 993, "u", " \t"))
                .unwrap_err()
                .is_auth()
        );
    }

    #[test]
    fn test_transport_config_follows_port() {
        let options = FetchOptions {
            io_timeout: Duration::from_secs(7),
            ..FetchOptions::default()
        };

        let tls = transport_config(
            &ConnectionConfig::new(" imap.example.com ", 993, "u", "p"),
            &options,
        );
        assert_eq!(tls.host, "imap.example.com");
        assert_eq!(tls.security, Security::Implicit);
        assert_eq!(tls.io_timeout, Duration::from_secs(7));

        let plain =
            transport_config(&ConnectionConfig::new("localhost", 1143, "u", "p"), &options);
        assert_eq!(plain.security, Security::None);
    }

    #[tokio::test]
    async fn test_rejected_login_is_authentication() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A001 LOGIN u wrong\r\n")
            .read(b"A001 NO [AUTHENTICATIONFAILED] Invalid credentials (Failure)\r\n")
            .write(b"A002 LOGOUT\r\n")
            .read(b"A002 OK bye\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let err = authenticate(client, &ConnectionConfig::new("h", 993, "u", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InboxError::Authentication("Invalid credentials (Failure)".to_string())
        );
    }

    #[tokio::test]
    async fn test_bye_during_login_is_authentication() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A001 LOGIN u p\r\n")
            .read(b"* BYE Too many login failures\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let err = authenticate(client, &ConnectionConfig::new("h", 993, "u", "p"))
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(
            err,
            InboxError::Authentication("Too many login failures".to_string())
        );
    }

    #[tokio::test]
    async fn test_dropped_connection_during_login_is_connection() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A001 LOGIN u p\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let err = authenticate(client, &ConnectionConfig::new("h", 993, "u", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, InboxError::Connection(_)));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = connect(
            &ConnectionConfig::new("127.0.0.1", port, "u", "p"),
            &FetchOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, InboxError::Connection(_)));
    }
}
