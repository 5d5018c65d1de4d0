//! Label line reader.

use posture_models::PostureLabel;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

/// Reads posture labels from a line stream.
///
/// Accepts both `\n` and `\r\n` terminators. Lines that are not a known
/// label are logged and skipped.
pub struct LabelReader<R> {
    inner: R,
    line: String,
}

impl<R> LabelReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
        }
    }

    /// Read the next label. `Ok(None)` once the server closes the stream.
    pub async fn next_label(&mut self) -> std::io::Result<Option<PostureLabel>> {
        loop {
            self.line.clear();
            if self.inner.read_line(&mut self.line).await? == 0 {
                return Ok(None);
            }

            let text = self.line.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }

            match text.parse::<PostureLabel>() {
                Ok(label) => return Ok(Some(label)),
                Err(e) => warn!("Skipping line: {}", e),
            }
        }
    }
}
