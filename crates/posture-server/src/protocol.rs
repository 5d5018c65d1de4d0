//! Wire protocol.
//!
//! Version 1 is a label stream: after accept the server writes zero or more
//! ASCII lines, each exactly one [`PostureLabel`] name followed by `\n`.
//! There is no handshake, framing or acknowledgement.

use std::time::Duration;

use posture_models::PostureLabel;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SendError;

/// Protocol version implemented by this build.
pub const PROTOCOL_VERSION: u32 = 1;

/// Line terminator for every message. Never varies within a build.
pub const LINE_TERMINATOR: &str = "\n";

/// Append one protocol line for `label` to `buf`.
pub fn encode_label(label: PostureLabel, buf: &mut Vec<u8>) {
    buf.extend_from_slice(label.as_str().as_bytes());
    buf.extend_from_slice(LINE_TERMINATOR.as_bytes());
}

/// Writes label lines to a client, each under a send deadline.
#[derive(Debug)]
pub struct LineWriter<W> {
    inner: W,
    send_timeout: Duration,
    line: Vec<u8>,
}

impl<W> LineWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W, send_timeout: Duration) -> Self {
        Self {
            inner,
            send_timeout,
            line: Vec::with_capacity(32),
        }
    }

    /// Write one label line.
    ///
    /// The whole line must be accepted by the transport within the send
    /// deadline. A partially written line is not retried; callers treat any
    /// error as the end of the connection.
    pub async fn send(&mut self, label: PostureLabel) -> Result<(), SendError> {
        self.line.clear();
        encode_label(label, &mut self.line);

        let inner = &mut self.inner;
        let line = &self.line;
        let write = async move {
            inner.write_all(line).await?;
            inner.flush().await
        };

        match tokio::time::timeout(self.send_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SendError::from_io(e)),
            Err(_) => Err(SendError::Timeout(self.send_timeout)),
        }
    }

    /// Best-effort graceful close, bounded by the send deadline.
    pub async fn close(&mut self) {
        let _ = tokio::time::timeout(self.send_timeout, self.inner.shutdown()).await;
    }
}
