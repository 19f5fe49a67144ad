//! Per-message FETCH loop.

use chrono::{DateTime, Utc};
use mailbridge_imap::{Client, FetchItems, Selected, SeqNum};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::handler::FetchBatch;
use crate::message::build_message;

/// Fetches and converts each message in `seqs`, one command at a time.
///
/// A message that the server refuses, that fails to parse or that lacks a
/// subject or sender is skipped. A lost connection stops the loop; the
/// messages gathered so far are kept.
pub async fn fetch_messages<S>(
    client: &mut Client<S, Selected>,
    seqs: &[SeqNum],
    batch_time: DateTime<Utc>,
) -> FetchBatch
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let items = FetchItems::message_view();
    let batch_millis = batch_time.timestamp_millis();
    let mut batch = FetchBatch::default();

    for &seq in seqs {
        batch.attempted += 1;

        let fetched = match client.fetch(seq, &items).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_connection_lost() => {
                warn!(%seq, error = %e, "connection lost while fetching, stopping");
                batch.dropped += 1;
                break;
            }
            Err(e) => {
                warn!(%seq, error = %e, "fetch failed, skipping message");
                batch.dropped += 1;
                continue;
            }
        };

        match build_message(seq, &fetched, batch_millis, batch_time) {
            Ok(message) => batch.messages.push(message),
            Err(e) => {
                warn!(%seq, error = %e, "unusable message, skipping");
                batch.dropped += 1;
            }
        }
    }

    debug!(
        attempted = batch.attempted,
        dropped = batch.dropped,
        kept = batch.messages.len(),
        "fetch loop done"
    );
    batch
}
