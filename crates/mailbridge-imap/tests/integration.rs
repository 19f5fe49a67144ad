//! Integration tests for the IMAP client.
//!
//! Most tests drive the client over a mock stream with a canned server
//! script. One test runs the full connect path against a scripted server
//! on a local socket.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use proptest::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};
use tokio::net::TcpListener;

use mailbridge_imap::{
    Client, Config, Error, FetchItem, FetchItems, ResponseParser, SearchCriteria, SeqNum,
    parse_search_line,
};

/// Mock stream that returns predefined responses and swallows writes.
struct MockStream {
    /// Responses to return (in order).
    responses: Cursor<Vec<u8>>,
}

impl MockStream {
    fn new(responses: &[u8]) -> Self {
        Self {
            responses: Cursor::new(responses.to_vec()),
        }
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let data = self.responses.get_ref();
        let pos = usize::try_from(self.responses.position()).unwrap_or(usize::MAX);

        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }

        let remaining = &data[pos..];
        let to_read = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..to_read]);
        self.responses.set_position((pos + to_read) as u64);

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

const MESSAGE_2: &[u8] = b"* 2 FETCH (FLAGS (\\Flagged) \
ENVELOPE (\"Tue, 3 Jun 2025 10:00:00 +0000\" \"Quarterly (draft) \\\"numbers\\\"\" \
((\"Ann\" NIL \"ann\" \"example.com\")) NIL NIL ((NIL NIL \"me\" \"example.com\")) NIL NIL NIL \"<id@x>\") \
BODY[HEADER] {45}\r\nSubject: Quarterly\r\nFrom: ann@example.com\r\n\r\n \
BODY[TEXT] {25}\r\nA004 OK not really done\r\n)\r\n";

#[tokio::test]
async fn test_full_session_over_mock_stream() {
    let mut script = Vec::new();
    script.extend_from_slice(b"* OK [CAPABILITY IMAP4rev1] ready\r\n");
    script.extend_from_slice(b"A001 OK LOGIN completed\r\n");
    script.extend_from_slice(b"* 2 EXISTS\r\n* 0 RECENT\r\nA002 OK [READ-WRITE] done\r\n");
    script.extend_from_slice(b"* SEARCH 1 2\r\nA003 OK done\r\n");
    script.extend_from_slice(MESSAGE_2);
    script.extend_from_slice(b"A004 OK FETCH completed\r\n");

    let client = Client::from_stream(MockStream::new(&script)).await.unwrap();
    let client = client.login("user@example.com", "hunter 2").await.unwrap();
    let (mut client, status) = client.select("INBOX").await.unwrap();
    assert_eq!(status.exists, 2);

    let all = client.search(SearchCriteria::All).await.unwrap();
    assert_eq!(all.len(), 2);

    let seq = SeqNum::new(2).unwrap();
    let items = client.fetch(seq, &FetchItems::message_view()).await.unwrap();

    let flags = items
        .iter()
        .find_map(|i| match i {
            FetchItem::Flags(f) => Some(f),
            _ => None,
        })
        .unwrap();
    assert!(flags.is_flagged());

    let envelope = items
        .iter()
        .find_map(|i| match i {
            FetchItem::Envelope(e) => Some(e),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        envelope.subject.as_deref(),
        Some("Quarterly (draft) \"numbers\"")
    );

    let text = items.iter().find_map(|i| i.body_section("TEXT")).unwrap();
    assert_eq!(text, b"A004 OK not really done\r\n");
}

#[tokio::test]
async fn test_login_failure_over_mock_stream() {
    let script = b"* OK ready\r\nA001 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n";

    let client = Client::from_stream(MockStream::new(script)).await.unwrap();
    let err = client.login("user", "bad").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_connect_and_exchange_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();

        write.write_all(b"* OK test server ready\r\n").await.unwrap();
        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            let tag = line.split(' ').next().unwrap_or_default().to_string();
            let reply = if line.contains("LOGOUT") {
                format!("* BYE bye\r\n{tag} OK LOGOUT completed\r\n")
            } else {
                format!("{tag} OK done\r\n")
            };
            received.push(line);
            write.write_all(reply.as_bytes()).await.unwrap();
        }
        received
    });

    let config = Config::builder("127.0.0.1")
        .port(port)
        .io_timeout(Duration::from_secs(5))
        .build();
    let client = Client::connect(&config).await.unwrap();
    assert_eq!(client.io_timeout(), Duration::from_secs(5));

    let client = client.login("user", "pw").await.unwrap();
    client.logout().await;

    let received = server.await.unwrap();
    assert_eq!(received, vec!["A001 LOGIN user pw", "A002 LOGOUT"]);
}

#[test]
fn test_search_line_helper() {
    assert_eq!(parse_search_line("* SEARCH 3 7 9"), vec![3, 7, 9]);
    assert!(parse_search_line("* SEARCH").is_empty());
}

proptest! {
    #[test]
    fn parser_never_panics(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = ResponseParser::parse(&input);
    }

    #[test]
    fn search_line_keeps_every_number(nums in proptest::collection::vec(1u32..100_000, 0..40)) {
        let line = std::iter::once("* SEARCH".to_string())
            .chain(nums.iter().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(parse_search_line(&line), nums);
    }
}
