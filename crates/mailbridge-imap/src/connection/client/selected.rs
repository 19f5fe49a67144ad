//! Implementation for the selected state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::Selected;
use crate::command::{Command, FetchItems, SearchCriteria};
use crate::parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
use crate::types::SeqNum;
use crate::{Error, Result};

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Searches the selected mailbox.
    ///
    /// Returns the sequence numbers of every `* SEARCH` line, in server
    /// order.
    pub async fn search(&mut self, criteria: SearchCriteria) -> Result<Vec<SeqNum>> {
        let (tag, responses) = self.exchange(&Command::Search { criteria }).await?;
        Self::check_tagged_ok(&responses, &tag)?;

        let mut results = Vec::new();
        for response_bytes in &responses {
            if let Ok(Response::Untagged(UntaggedResponse::Search(ids))) =
                ResponseParser::parse(response_bytes)
            {
                results.extend(ids);
            }
        }

        Ok(results)
    }

    /// Fetches data items for one message.
    ///
    /// Items from every FETCH response the server sends for `seq` are
    /// merged. FETCH data for other messages (unsolicited flag updates) is
    /// ignored. A completion without any data for `seq` is a protocol error.
    pub async fn fetch(&mut self, seq: SeqNum, items: &FetchItems) -> Result<Vec<FetchItem>> {
        let command = Command::Fetch {
            seq,
            items: items.clone(),
        };
        let (tag, responses) = self.exchange(&command).await?;
        Self::check_tagged_ok(&responses, &tag)?;

        let mut merged = Vec::new();
        let mut found = false;
        for response_bytes in &responses {
            match ResponseParser::parse(response_bytes) {
                Ok(Response::Untagged(UntaggedResponse::Fetch { seq: got, items })) if got == seq => {
                    found = true;
                    merged.extend(items);
                }
                Ok(_) => {}
                Err(e) if response_bytes.starts_with(format!("* {seq} FETCH").as_bytes()) => {
                    return Err(e);
                }
                Err(_) => {}
            }
        }

        if !found {
            return Err(Error::Protocol(format!("no FETCH data for message {seq}")));
        }
        Ok(merged)
    }
}
