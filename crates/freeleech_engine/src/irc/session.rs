use std::sync::Arc;
use std::time::Duration;

use freeleech_core::LineBuffer;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::Mutex;

use super::{BoxedTransport, IrcError};

const READ_CHUNK: usize = 4096;

/// Write half of the current transport, shared with the client so the leave
/// notice can still go out when the read loop is gone.
pub(super) type Outbound = Mutex<Option<WriteHalf<BoxedTransport>>>;

/// One established transport plus its line framing.
pub(super) struct Session {
    reader: ReadHalf<BoxedTransport>,
    writer: Arc<Outbound>,
    lines: LineBuffer,
}

impl Session {
    pub(super) async fn new(transport: BoxedTransport, writer: Arc<Outbound>) -> Self {
        let (reader, write_half) = tokio::io::split(transport);
        *writer.lock().await = Some(write_half);
        Self {
            reader,
            writer,
            lines: LineBuffer::new(),
        }
    }

    pub(super) async fn send(&mut self, line: &str) -> Result<(), IrcError> {
        let mut slot = self.writer.lock().await;
        let writer = slot.as_mut().ok_or(IrcError::NotConnected)?;
        write_line(writer, line).await
    }

    /// Waits at most `wait` for data. An empty result means nothing arrived.
    pub(super) async fn read_lines(&mut self, wait: Duration) -> Result<Vec<String>, IrcError> {
        let mut buf = [0u8; READ_CHUNK];
        match tokio::time::timeout(wait, self.reader.read(&mut buf)).await {
            Err(_) => Ok(Vec::new()),
            Ok(Ok(0)) => Err(IrcError::Closed),
            Ok(Ok(n)) => Ok(self.lines.push(&buf[..n])),
            Ok(Err(err)) => Err(err.into()),
        }
    }

    /// The write half stays in the slot until its shutdown completes.
    pub(super) async fn close(self) {
        let mut slot = self.writer.lock().await;
        if let Some(writer) = slot.as_mut() {
            let _ = writer.shutdown().await;
        }
        *slot = None;
    }
}

pub(super) async fn write_line<W>(writer: &mut W, line: &str) -> Result<(), IrcError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await?;
    Ok(())
}
