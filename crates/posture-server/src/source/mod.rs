//! Upstream pose sources.
//!
//! The pose estimator and camera live outside this crate. They reach the
//! server through [`PoseSource`], which yields one [`Frame`] per tick:
//!
//! - `Ok(Some(Frame::Pose(_)))`: a pose was detected
//! - `Ok(Some(Frame::NoPose))`: the frame had no pose
//! - `Ok(None)`: end of stream
//! - `Err(_)`: the producer cannot yield frames anymore

mod replay;
mod synthetic;

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use posture_models::Frame;
use tokio::sync::mpsc;

use crate::config::SourceSpec;
use crate::error::{SourceError, SourceResult};

pub use replay::ReplaySource;
pub use synthetic::SyntheticSource;

/// Producer of per-frame pose data.
///
/// `next_frame` is the loop's suspension point: it waits until the producer
/// has the next frame or is exhausted.
#[async_trait]
pub trait PoseSource: Send {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Acquire the next frame.
    async fn next_frame(&mut self) -> SourceResult<Option<Frame>>;
}

#[async_trait]
impl<T: PoseSource + ?Sized> PoseSource for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        (**self).next_frame().await
    }
}

/// Open the source described by `spec`.
pub async fn open(spec: &SourceSpec, frame_interval: Duration) -> SourceResult<Box<dyn PoseSource>> {
    let source: Box<dyn PoseSource> = match spec {
        SourceSpec::Synthetic => Box::new(SyntheticSource::new().with_frame_interval(frame_interval)),
        SourceSpec::Stdin => Box::new(ReplaySource::stdin().with_frame_interval(frame_interval)),
        SourceSpec::File(path) => {
            Box::new(ReplaySource::open(path).await?.with_frame_interval(frame_interval))
        }
    };
    Ok(source)
}

/// Frames pushed in by an in-process producer.
///
/// End of stream once every sender is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Frame>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Frame>) -> Self {
        Self { rx }
    }

    /// Create a bounded channel and the source reading from it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Frame>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl PoseSource for ChannelSource {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        Ok(self.rx.recv().await)
    }
}

/// A fixed script of frames, optionally ending in a failure instead of
/// end of stream.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    frames: VecDeque<Frame>,
    failure: Option<String>,
}

impl VecSource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            failure: None,
        }
    }

    /// Fail with `message` once the scripted frames run out.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

#[async_trait]
impl PoseSource for VecSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => match &self.failure {
                Some(message) => Err(SourceError::acquisition(message.clone())),
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vec_source_ends() {
        let mut source = VecSource::new(vec![Frame::NoPose]);
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::NoPose));
        assert_eq!(source.next_frame().await.unwrap(), None);
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_vec_source_failure() {
        let mut source = VecSource::new(Vec::new()).with_failure("device gone");
        let err = source.next_frame().await.unwrap_err();
        assert!(matches!(err, SourceError::Acquisition(ref m) if m == "device gone"));
    }

    #[tokio::test]
    async fn test_channel_source_ends_when_senders_drop() {
        let (tx, mut source) = ChannelSource::channel(2);
        tx.send(Frame::NoPose).await.unwrap();
        drop(tx);

        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::NoPose));
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_boxed_source_delegates() {
        let mut source: Box<dyn PoseSource> = Box::new(VecSource::new(vec![Frame::NoPose]));
        assert_eq!(source.name(), "scripted");
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::NoPose));
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let spec = SourceSpec::File("/nonexistent/posture/frames.jsonl".into());
        assert!(matches!(
            open(&spec, Duration::ZERO).await,
            Err(SourceError::Io(_))
        ));
    }
}
