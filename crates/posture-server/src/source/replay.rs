//! JSON-lines replay of recorded pose frames.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use posture_models::{Frame, PoseSample};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

use super::PoseSource;
use crate::error::{SourceError, SourceResult};

/// Replays frames recorded one JSON value per line.
///
/// Each non-blank line is either a pose sample object
/// (`{"left_ear": {"x":..,"y":..,"z":..,"visibility":..}, ...}`) or `null`
/// for a frame without a pose. A line that is neither fails acquisition.
pub struct ReplaySource<R> {
    lines: Lines<R>,
    line_no: usize,
    pacing: Option<Interval>,
}

impl<R> ReplaySource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            pacing: None,
        }
    }

    /// Emit at most one frame per `interval`. Zero disables pacing.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.pacing = (!interval.is_zero()).then(|| {
            let mut pacing = tokio::time::interval(interval);
            pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
            pacing
        });
        self
    }

    fn parse_line(&self, line: &str) -> SourceResult<Frame> {
        serde_json::from_str::<Option<PoseSample>>(line)
            .map(Frame::from)
            .map_err(|e| SourceError::Malformed {
                line: self.line_no,
                message: e.to_string(),
            })
    }
}

impl ReplaySource<BufReader<File>> {
    /// Replay a recording from disk.
    pub async fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        debug!("Replaying pose frames from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl ReplaySource<BufReader<Stdin>> {
    /// Replay frames piped into standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> PoseSource for ReplaySource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let frame = self.parse_line(line)?;
            if let Some(pacing) = self.pacing.as_mut() {
                pacing.tick().await;
            }
            return Ok(Some(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_models::LandmarkPoint;
    use std::io::{Cursor, Write};

    const STRAIGHT: &str = r#"{"left_ear":{"x":0.3,"y":0.2,"z":0.5,"visibility":0.95},"right_ear":{"x":0.7,"y":0.2,"z":0.5,"visibility":0.95},"left_shoulder":{"x":0.3,"y":0.4,"z":0.0,"visibility":0.95},"right_shoulder":{"x":0.7,"y":0.4,"z":0.0,"visibility":0.95}}"#;

    fn replay(text: impl Into<String>) -> ReplaySource<Cursor<Vec<u8>>> {
        ReplaySource::new(Cursor::new(text.into().into_bytes()))
    }

    #[tokio::test]
    async fn test_replays_samples_and_null() {
        let mut source = replay(format!("{STRAIGHT}\nnull\n\n  \n{STRAIGHT}\n"));

        let first = source.next_frame().await.unwrap().unwrap();
        let sample = first.sample().unwrap();
        assert_eq!(sample.left_ear, LandmarkPoint::new(0.3, 0.2, 0.5, 0.95));
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::NoPose));
        assert!(matches!(source.next_frame().await.unwrap(), Some(Frame::Pose(_))));
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_line_reports_line_number() {
        let mut source = replay("null\n\n{\"left_ear\": 1}\n");

        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::NoPose));
        let err = source.next_frame().await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed { line: 3, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{STRAIGHT}").unwrap();
        writeln!(file, "null").unwrap();
        file.flush().unwrap();

        let mut source = ReplaySource::open(file.path()).await.unwrap();
        assert!(matches!(source.next_frame().await.unwrap(), Some(Frame::Pose(_))));
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::NoPose));
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing() {
        let mut source = replay("null\nnull\nnull\n").with_frame_interval(Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            source.next_frame().await.unwrap();
        }
        // First tick is immediate, then one interval per frame.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "elapsed {elapsed:?}");
    }
}
