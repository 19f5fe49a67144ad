//! One inbox fetch, from request body to HTTP status and response body.
//!
//! [`fetch_inbox`] runs the pipeline: connect, log in, select, search,
//! fetch, log out. [`handle`] wraps it with the failure policy:
//!
//! | Outcome                    | Status | `success` | `emails`        |
//! |----------------------------|--------|-----------|-----------------|
//! | messages fetched           | 200    | true      | the batch       |
//! | blank or rejected login    | 401    | false     | empty           |
//! | other failure, substitute  | 200    | true      | sample messages |
//! | other failure, strict      | 500    | false     | empty           |
//! | missing or malformed body  | 500    | false     | empty           |

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::auth::{authenticate, connect, validate_credentials};
use crate::error::{InboxError, Result};
use crate::fallback::mock_batch;
use crate::fetcher::fetch_messages;
use crate::model::{ConnectionConfig, MailMessage};
use crate::session::{MAX_MESSAGES, RECENT_FALLBACK_LIMIT, open_inbox};

/// What to do with failures that are not authentication failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Answer 200 with the sample messages and the error text.
    #[default]
    Substitute,
    /// Answer 500 with the error text.
    Strict,
}

/// Tuning for one fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// TCP connect plus TLS handshake.
    pub connect_timeout: Duration,
    /// Greeting and each command exchange.
    pub io_timeout: Duration,
    /// The whole fetch, login to logout.
    pub deadline: Duration,
    /// Failure policy.
    pub policy: FallbackPolicy,
    /// Mailbox to read.
    pub mailbox: String,
    /// Highest `SEARCH ALL` results kept when nothing is recent.
    pub recent_fallback_limit: usize,
    /// Cap on messages per fetch.
    pub max_messages: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
            deadline: Duration::from_secs(120),
            policy: FallbackPolicy::default(),
            mailbox: "INBOX".to_string(),
            recent_fallback_limit: RECENT_FALLBACK_LIMIT,
            max_messages: MAX_MESSAGES,
        }
    }
}

/// Result of one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchBatch {
    /// Messages in ascending sequence order.
    pub messages: Vec<MailMessage>,
    /// FETCH commands issued.
    pub attempted: usize,
    /// Attempts that produced no message.
    pub dropped: usize,
}

/// Request body: `{ "imap_config": { ... } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchRequest {
    /// Connection settings. Absent or `null` is a request error.
    #[serde(default)]
    pub imap_config: Option<ConnectionConfig>,
}

impl FetchRequest {
    /// Parses a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`InboxError::Unclassified`] if the body is not a JSON object
    /// of the expected shape.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| InboxError::Unclassified(format!("Invalid request body: {e}")))
    }
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    /// False for authentication failures and strict-mode failures.
    pub success: bool,
    /// Fetched (or sample) messages.
    pub emails: Vec<MailMessage>,
    /// `emails.len()`.
    pub count: usize,
    /// Failure text, also present when sample messages were substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present and true only for authentication failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_error: Option<bool>,
}

impl FetchResponse {
    fn fetched(emails: Vec<MailMessage>) -> Self {
        Self {
            success: true,
            count: emails.len(),
            emails,
            error: None,
            auth_error: None,
        }
    }

    fn substituted(emails: Vec<MailMessage>, error: &InboxError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::fetched(emails)
        }
    }

    fn failed(error: &InboxError) -> Self {
        Self {
            success: false,
            emails: Vec::new(),
            count: 0,
            error: Some(error.to_string()),
            auth_error: error.is_auth().then_some(true),
        }
    }
}

/// Status code of a [`FetchResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    /// 200.
    Ok,
    /// 401.
    Unauthorized,
    /// 500.
    InternalServerError,
}

impl HttpStatus {
    /// Numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Unauthorized => 401,
            Self::InternalServerError => 500,
        }
    }
}

/// Fetches the inbox described by `config`.
///
/// Credentials are checked before any I/O. The pipeline runs under
/// `options.deadline`; on expiry the connection is dropped without LOGOUT.
///
/// # Errors
///
/// Returns the classified failure; see [`InboxError`].
pub async fn fetch_inbox(config: &ConnectionConfig, options: &FetchOptions) -> Result<FetchBatch> {
    validate_credentials(config)?;

    tokio::time::timeout(options.deadline, run_pipeline(config, options))
        .await
        .unwrap_or_else(|_| {
            Err(InboxError::Unclassified(format!(
                "Inbox fetch did not finish within {:?}",
                options.deadline
            )))
        })
}

async fn run_pipeline(config: &ConnectionConfig, options: &FetchOptions) -> Result<FetchBatch> {
    let client = connect(config, options).await?;
    let client = authenticate(client, config).await?;
    let (mut client, seqs) = open_inbox(client, options).await?;

    let batch = fetch_messages(&mut client, &seqs, Utc::now()).await;
    client.logout().await;
    Ok(batch)
}

/// Handles one request: runs the fetch and applies the failure policy.
pub async fn handle(request: FetchRequest, options: &FetchOptions) -> (HttpStatus, FetchResponse) {
    let Some(config) = request.imap_config else {
        let err = InboxError::Unclassified("Missing imap_config in request body".to_string());
        error!(error = %err, "rejecting request");
        return (HttpStatus::InternalServerError, FetchResponse::failed(&err));
    };

    match fetch_inbox(&config, options).await {
        Ok(batch) => {
            info!(
                host = %config.host,
                count = batch.messages.len(),
                attempted = batch.attempted,
                dropped = batch.dropped,
                "inbox fetched"
            );
            (HttpStatus::Ok, FetchResponse::fetched(batch.messages))
        }
        Err(err) if err.is_auth() => {
            warn!(host = %config.host, user = %config.user, error = %err, "authentication failed");
            (HttpStatus::Unauthorized, FetchResponse::failed(&err))
        }
        Err(err) => match options.policy {
            FallbackPolicy::Substitute => {
                warn!(
                    host = %config.host,
                    error = %err,
                    "inbox unavailable, serving sample messages"
                );
                (
                    HttpStatus::Ok,
                    FetchResponse::substituted(mock_batch(Utc::now()), &err),
                )
            }
            FallbackPolicy::Strict => {
                error!(host = %config.host, error = %err, "inbox fetch failed");
                (HttpStatus::InternalServerError, FetchResponse::failed(&err))
            }
        },
    }
}

/// Parses a raw request body and handles it.
///
/// A body that is not valid JSON is answered like a missing configuration.
pub async fn handle_body(body: &[u8], options: &FetchOptions) -> (HttpStatus, FetchResponse) {
    match FetchRequest::from_json(body) {
        Ok(request) => handle(request, options).await,
        Err(err) => {
            error!(error = %err, "rejecting request");
            (HttpStatus::InternalServerError, FetchResponse::failed(&err))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> FetchRequest {
        FetchRequest::from_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_request_parsing() {
        let req = request(r#"{"imap_config":{"host":"h","port":993,"user":"u","pass":"p"}}"#);
        assert_eq!(req.imap_config.unwrap().host, "h");

        assert!(request("{}").imap_config.is_none());
        assert!(request(r#"{"imap_config":null}"#).imap_config.is_none());
        assert!(FetchRequest::from_json(b"not json").is_err());
    }

    #[test]
    fn test_response_shape() {
        let failed = FetchResponse::failed(&InboxError::Authentication("bad".into()));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["authError"], true);
        assert_eq!(json["count"], 0);
        assert_eq!(json["emails"], serde_json::json!([]));

        let fetched = serde_json::to_value(FetchResponse::fetched(Vec::new())).unwrap();
        assert!(fetched.get("error").is_none());
        assert!(fetched.get("authError").is_none());

        let strict = serde_json::to_value(FetchResponse::failed(&InboxError::Connection(
            "refused".into(),
        )))
        .unwrap();
        assert!(strict.get("authError").is_none());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpStatus::Ok.code(), 200);
        assert_eq!(HttpStatus::Unauthorized.code(), 401);
        assert_eq!(HttpStatus::InternalServerError.code(), 500);
    }

    #[tokio::test]
    async fn test_blank_credentials_are_401_without_fallback() {
        let req = request(r#"{"imap_config":{"host":"imap.example.com","port":993}}"#);
        let (status, response) = handle(req, &FetchOptions::default()).await;

        assert_eq!(status, HttpStatus::Unauthorized);
        assert!(!response.success);
        assert_eq!(response.auth_error, Some(true));
        assert!(response.emails.is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_is_500() {
        let (status, response) = handle(request("{}"), &FetchOptions::default()).await;
        assert_eq!(status, HttpStatus::InternalServerError);
        assert!(!response.success);
        assert!(response.auth_error.is_none());

        let (status, _) = handle_body(b"{", &FetchOptions::default()).await;
        assert_eq!(status, HttpStatus::InternalServerError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_unclassified() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accepts and never greets.
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let options = FetchOptions {
            deadline: Duration::from_secs(5),
            ..FetchOptions::default()
        };
        let err = fetch_inbox(&ConnectionConfig::new("127.0.0.1", port, "u", "p"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, InboxError::Unclassified(_)));
    }
}
