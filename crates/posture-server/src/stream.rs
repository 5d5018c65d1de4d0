//! The per-connection acquire, classify, send loop.

use std::fmt;

use posture_classifier::PostureClassifier;
use posture_models::{Frame, PoseSample};
use tokio::io::AsyncWrite;
use tracing::trace;

use crate::error::SendError;
use crate::logging::ConnectionLogger;
use crate::metrics::{self, FrameOutcome};
use crate::protocol::LineWriter;
use crate::shutdown::Shutdown;
use crate::source::PoseSource;

/// Lifecycle of one client connection.
///
/// `AwaitingConnection -> Streaming -> {ClosedByPeer | ClosedByProducerEof | Failed}`.
/// `Cancelled` is the clean exit taken when shutdown interrupts streaming
/// before any of the other end states is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    AwaitingConnection,
    Streaming,
    ClosedByPeer,
    ClosedByProducerEof,
    Failed,
    Cancelled,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::AwaitingConnection => "awaiting_connection",
            ConnectionState::Streaming => "streaming",
            ConnectionState::ClosedByPeer => "closed_by_peer",
            ConnectionState::ClosedByProducerEof => "closed_by_producer_eof",
            ConnectionState::Failed => "failed",
            ConnectionState::Cancelled => "cancelled",
        }
    }

    /// Check if this is an end state.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ConnectionState::AwaitingConnection | ConnectionState::Streaming
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why streaming to a connection stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The client went away.
    ClosedByPeer,
    /// The upstream producer reported end-of-stream.
    ProducerEof,
    /// A line could not be written within the send deadline.
    WriteTimeout,
    /// Writing failed for a reason other than the peer closing.
    WriteFailed(String),
    /// The upstream producer could not yield a frame.
    AcquisitionFailed(String),
    /// Shutdown was requested.
    Cancelled,
}

impl Termination {
    /// The connection state this termination ends in.
    pub fn state(&self) -> ConnectionState {
        match self {
            Termination::ClosedByPeer => ConnectionState::ClosedByPeer,
            Termination::ProducerEof => ConnectionState::ClosedByProducerEof,
            Termination::WriteTimeout
            | Termination::WriteFailed(_)
            | Termination::AcquisitionFailed(_) => ConnectionState::Failed,
            Termination::Cancelled => ConnectionState::Cancelled,
        }
    }

    /// Check if no further connection can be served after this one.
    ///
    /// Only client-side failures leave the producer usable for a next client.
    pub fn ends_serving(&self) -> bool {
        matches!(
            self,
            Termination::ProducerEof | Termination::AcquisitionFailed(_) | Termination::Cancelled
        )
    }
}

impl From<SendError> for Termination {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Timeout(_) => Termination::WriteTimeout,
            SendError::PeerClosed(_) => Termination::ClosedByPeer,
            SendError::Io(e) => Termination::WriteFailed(e.to_string()),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::ClosedByPeer => write!(f, "closed by peer"),
            Termination::ProducerEof => write!(f, "producer end of stream"),
            Termination::WriteTimeout => write!(f, "send deadline exceeded"),
            Termination::WriteFailed(e) => write!(f, "write failed: {e}"),
            Termination::AcquisitionFailed(e) => write!(f, "acquisition failed: {e}"),
            Termination::Cancelled => write!(f, "cancelled by shutdown"),
        }
    }
}

/// Counters for one connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames pulled from the producer.
    pub frames: u64,
    /// Frames without a detected pose.
    pub no_pose: u64,
    /// Frames dropped by the visibility gate.
    pub below_visibility: u64,
    /// Label lines fully written.
    pub lines_sent: u64,
}

/// Result of streaming to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamOutcome {
    pub stats: StreamStats,
    pub termination: Termination,
}

/// Runs the frame loop for a single connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStreamer {
    classifier: PostureClassifier,
    min_visibility: f32,
}

impl FrameStreamer {
    pub fn new(classifier: PostureClassifier) -> Self {
        Self {
            classifier,
            min_visibility: 0.0,
        }
    }

    /// Treat samples whose least visible point is below `min_visibility` as
    /// frames without a pose. 0 disables the gate.
    pub fn with_min_visibility(mut self, min_visibility: f32) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    /// Count `frame` and return the sample to classify, if any.
    ///
    /// Frames without a pose and samples under the visibility gate yield
    /// `None`.
    fn admit(&self, frame: Frame, stats: &mut StreamStats) -> Option<PoseSample> {
        stats.frames += 1;

        let sample = match frame {
            Frame::Pose(sample) => sample,
            Frame::NoPose => {
                stats.no_pose += 1;
                metrics::record_frame(FrameOutcome::NoPose);
                return None;
            }
        };

        if self.min_visibility > 0.0 && sample.min_visibility() < self.min_visibility {
            stats.below_visibility += 1;
            metrics::record_frame(FrameOutcome::BelowVisibility);
            trace!(min_visibility = sample.min_visibility(), "Sample below visibility gate");
            return None;
        }

        metrics::record_frame(FrameOutcome::Pose);
        Some(sample)
    }

    /// Stream labels until the producer ends, the write side fails or
    /// shutdown is requested.
    ///
    /// Frame acquisition is raced against shutdown; each write is bounded by
    /// the writer's send deadline. Nothing is retried.
    pub async fn run<S, W>(
        &self,
        source: &mut S,
        writer: &mut LineWriter<W>,
        shutdown: &mut Shutdown,
        logger: &ConnectionLogger,
    ) -> StreamOutcome
    where
        S: PoseSource + ?Sized,
        W: AsyncWrite + Unpin,
    {
        let mut stats = StreamStats::default();

        let termination = loop {
            if shutdown.is_triggered() {
                break Termination::Cancelled;
            }

            let next = tokio::select! {
                biased;
                _ = shutdown.wait() => break Termination::Cancelled,
                next = source.next_frame() => next,
            };

            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => break Termination::ProducerEof,
                Err(e) => {
                    logger.log_error(&format!("Frame acquisition failed: {e}"));
                    break Termination::AcquisitionFailed(e.to_string());
                }
            };

            let Some(sample) = self.admit(frame, &mut stats) else {
                continue;
            };

            let measured = self.classifier.measure(&sample);
            let label = self.classifier.classify_metrics(&measured);
            trace!(?measured, label = %label, "Classified frame");

            if let Err(e) = writer.send(label).await {
                logger.log_warning(&format!("Failed to send {label}: {e}"));
                break Termination::from(e);
            }

            stats.lines_sent += 1;
            metrics::record_label_sent(label);
            logger.log_progress(label.as_str());
        };

        StreamOutcome { stats, termination }
    }
}
