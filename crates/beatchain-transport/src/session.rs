//! Line-delimited peer sessions
//!
//! A session carries one newline-terminated message per line in each
//! direction. Reading and writing are split so the receive loop and the
//! broadcasters can own their halves independently.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use beatchain_core::{BeatError, BeatResult};

use crate::codec::LineDecoder;

/// In-memory pipe capacity for `PeerSession::pair`
const DUPLEX_BUFFER_SIZE: usize = 64 * 1024;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Bidirectional line-delimited connection to one peer
pub struct PeerSession {
    reader: SessionReader,
    writer: SessionWriter,
}

impl PeerSession {
    /// Wrap a bidirectional byte stream
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        Self::from_parts(reader, writer)
    }

    /// Build a session from separate read and write halves
    pub fn from_parts<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        PeerSession {
            reader: SessionReader::new(Box::new(reader)),
            writer: SessionWriter::new(Box::new(writer)),
        }
    }

    /// Two sessions connected to each other in memory
    pub fn pair() -> (PeerSession, PeerSession) {
        let (a, b) = tokio::io::duplex(DUPLEX_BUFFER_SIZE);
        (PeerSession::new(a), PeerSession::new(b))
    }

    /// Split into independently owned halves
    pub fn split(self) -> (SessionReader, SessionWriter) {
        (self.reader, self.writer)
    }
}

impl std::fmt::Debug for PeerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerSession").finish_non_exhaustive()
    }
}

/// Receiving half of a session
pub struct SessionReader {
    inner: FramedRead<BoxedReader, LineDecoder>,
}

impl SessionReader {
    fn new(reader: BoxedReader) -> Self {
        SessionReader {
            inner: FramedRead::new(reader, LineDecoder::new()),
        }
    }

    /// Receive the next line, or `None` once the peer has closed the stream.
    ///
    /// A line that is too long (`MessageTooLong`) or not UTF-8
    /// (`InvalidWireFormat`) is skipped and reported; the reader stays
    /// usable afterwards. Any other error means the stream is broken.
    pub async fn recv_line(&mut self) -> BeatResult<Option<String>> {
        match self.inner.next().await {
            Some(Ok(line)) => line.map(Some),
            Some(Err(e)) => Err(BeatError::TransportError(e.to_string())),
            None => Ok(None),
        }
    }
}

/// Sending half of a session
pub struct SessionWriter {
    inner: FramedWrite<BoxedWriter, LinesCodec>,
}

impl SessionWriter {
    fn new(writer: BoxedWriter) -> Self {
        SessionWriter {
            inner: FramedWrite::new(writer, LinesCodec::new()),
        }
    }

    /// Write one line followed by the newline delimiter, then flush
    pub async fn send_line(&mut self, line: &str) -> BeatResult<()> {
        self.inner
            .send(line)
            .await
            .map_err(|e| BeatError::TransportError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatchain_wire::MAX_LINE_LENGTH;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_pair_exchanges_lines() {
        let (a, b) = PeerSession::pair();
        let (_a_rx, mut a_tx) = a.split();
        let (mut b_rx, _b_tx) = b.split();

        a_tx.send_line("hello").await.unwrap();
        a_tx.send_line("world").await.unwrap();

        assert_eq!(b_rx.recv_line().await.unwrap().as_deref(), Some("hello"));
        assert_eq!(b_rx.recv_line().await.unwrap().as_deref(), Some("world"));
    }

    #[tokio::test]
    async fn test_closed_peer_yields_none() {
        let (a, b) = PeerSession::pair();
        let (mut b_rx, _b_tx) = b.split();
        drop(a);

        assert!(b_rx.recv_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_line_is_delivered_as_empty() {
        let (client, server) = tokio::io::duplex(1024);
        let (mut rx, _tx) = PeerSession::new(server).split();
        let (_r, mut w) = tokio::io::split(client);

        w.write_all(b"\nnext\n").await.unwrap();
        assert_eq!(rx.recv_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(rx.recv_line().await.unwrap().as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn test_overlong_line_is_skipped() {
        let (client, server) = tokio::io::duplex(1024 * 1024);
        let (mut rx, _tx) = PeerSession::new(server).split();
        let (_r, mut w) = tokio::io::split(client);

        let writer = tokio::spawn(async move {
            let big = vec![b'x'; MAX_LINE_LENGTH + 1];
            w.write_all(&big).await.unwrap();
            w.write_all(b"\nafter\n").await.unwrap();
        });

        assert!(matches!(
            rx.recv_line().await,
            Err(BeatError::MessageTooLong { .. })
        ));
        assert_eq!(rx.recv_line().await.unwrap().as_deref(), Some("after"));
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_skipped() {
        let (client, server) = tokio::io::duplex(1024);
        let (mut rx, _tx) = PeerSession::new(server).split();
        let (_r, mut w) = tokio::io::split(client);

        w.write_all(b"\xff\xfe garbage\nafter\n").await.unwrap();
        assert!(matches!(
            rx.recv_line().await,
            Err(BeatError::InvalidWireFormat(_))
        ));
        assert_eq!(rx.recv_line().await.unwrap().as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn test_send_after_peer_gone_fails() {
        let (a, b) = PeerSession::pair();
        let (_a_rx, mut a_tx) = a.split();
        drop(b);

        let mut failed = false;
        for _ in 0..64 {
            if a_tx.send_line("ping").await.is_err() {
                failed = true;
                break;
            }
        }
        assert!(failed);
    }
}
