//! Mailbox session: SELECT and choosing which messages to fetch.

use mailbridge_imap::{Authenticated, Client, SearchCriteria, Selected, SeqNum};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::error::{InboxError, Result};
use crate::handler::FetchOptions;

/// How many of the highest `ALL` results are kept when nothing is recent.
pub const RECENT_FALLBACK_LIMIT: usize = 20;

/// Upper bound on the messages fetched per invocation.
pub const MAX_MESSAGES: usize = 50;

/// Chooses the sequence numbers to fetch with the default limits.
///
/// `recent` is the `SEARCH RECENT` result; `all` is only consulted when it
/// is empty. The result is ascending.
#[must_use]
pub fn select_sequence_numbers(recent: &[u32], all: &[u32]) -> Vec<u32> {
    select_with_limits(recent, all, RECENT_FALLBACK_LIMIT, MAX_MESSAGES)
}

/// Chooses the sequence numbers to fetch.
///
/// With no recent messages, the `fallback_limit` highest numbers of `all`
/// are taken. Either way the set is then capped to the `max` highest.
#[must_use]
pub fn select_with_limits(
    recent: &[u32],
    all: &[u32],
    fallback_limit: usize,
    max: usize,
) -> Vec<u32> {
    let mut chosen = if recent.is_empty() {
        highest(all, fallback_limit)
    } else {
        normalized(recent)
    };

    let excess = chosen.len().saturating_sub(max);
    chosen.drain(..excess);
    chosen
}

fn normalized(nums: &[u32]) -> Vec<u32> {
    let mut nums: Vec<u32> = nums.iter().copied().filter(|&n| n > 0).collect();
    nums.sort_unstable();
    nums.dedup();
    nums
}

fn highest(nums: &[u32], limit: usize) -> Vec<u32> {
    let mut nums = normalized(nums);
    let excess = nums.len().saturating_sub(limit);
    nums.drain(..excess);
    nums
}

/// Selects the mailbox and picks the messages to fetch.
///
/// Issues `SELECT`, then `SEARCH RECENT`, then `SEARCH ALL` only if nothing
/// is recent. An empty selection is not an error.
///
/// # Errors
///
/// SELECT or SEARCH failures are [`InboxError::Unclassified`]. The
/// connection has been logged out when an error is returned.
pub async fn open_inbox<S>(
    client: Client<S, Authenticated>,
    options: &FetchOptions,
) -> Result<(Client<S, Selected>, Vec<SeqNum>)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client, status) = client.select(&options.mailbox).await.map_err(|e| {
        warn!(mailbox = %options.mailbox, error = %e, "select failed");
        InboxError::Unclassified(format!("SELECT {} failed: {e}", options.mailbox))
    })?;
    debug!(mailbox = %options.mailbox, exists = status.exists, "inbox open");

    let recent = match search(&mut client, SearchCriteria::Recent).await {
        Ok(nums) => nums,
        Err(e) => {
            client.logout().await;
            return Err(e);
        }
    };

    let all = if recent.is_empty() {
        match search(&mut client, SearchCriteria::All).await {
            Ok(nums) => nums,
            Err(e) => {
                client.logout().await;
                return Err(e);
            }
        }
    } else {
        Vec::new()
    };

    let chosen: Vec<SeqNum> = select_with_limits(
        &recent,
        &all,
        options.recent_fallback_limit,
        options.max_messages,
    )
    .into_iter()
    .filter_map(SeqNum::new)
    .collect();

    debug!(
        recent = recent.len(),
        all = all.len(),
        chosen = chosen.len(),
        "messages selected"
    );
    Ok((client, chosen))
}

async fn search<S>(client: &mut Client<S, Selected>, criteria: SearchCriteria) -> Result<Vec<u32>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let label = criteria.as_str();
    client
        .search(criteria)
        .await
        .map(|nums| nums.into_iter().map(SeqNum::get).collect())
        .map_err(|e| {
            warn!(criteria = %label, error = %e, "search failed");
            InboxError::Unclassified(format!("SEARCH {label} failed: {e}"))
        })
}
