//! Prometheus metrics for the streaming server.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use posture_models::PostureLabel;

use crate::error::{ServerError, ServerResult};
use crate::stream::ConnectionState;

/// Install the Prometheus recorder and serve it over HTTP on `addr`.
///
/// Must be called from within a tokio runtime. Without it every recording
/// function below is a no-op.
pub fn init_metrics(addr: SocketAddr) -> ServerResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| ServerError::Metrics(e.to_string()))
}

/// Metric names as constants for consistency.
pub mod names {
    // Frame metrics
    pub const FRAMES_TOTAL: &str = "posture_frames_total";
    pub const FRAMES_POSE_TOTAL: &str = "posture_frames_pose_total";
    pub const FRAMES_NO_POSE_TOTAL: &str = "posture_frames_no_pose_total";
    pub const FRAMES_BELOW_VISIBILITY_TOTAL: &str = "posture_frames_below_visibility_total";
    pub const LABELS_SENT_TOTAL: &str = "posture_labels_sent_total";

    // Connection metrics
    pub const CONNECTIONS_TOTAL: &str = "posture_connections_total";
    pub const CONNECTIONS_CLOSED_TOTAL: &str = "posture_connections_closed_total";
}

/// What became of an acquired frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A pose was detected and passed on for classification.
    Pose,
    /// No pose in the frame.
    NoPose,
    /// A pose was detected but dropped by the visibility gate.
    BelowVisibility,
}

/// Record one acquired frame.
pub fn record_frame(outcome: FrameOutcome) {
    counter!(names::FRAMES_TOTAL).increment(1);
    let name = match outcome {
        FrameOutcome::Pose => names::FRAMES_POSE_TOTAL,
        FrameOutcome::NoPose => names::FRAMES_NO_POSE_TOTAL,
        FrameOutcome::BelowVisibility => names::FRAMES_BELOW_VISIBILITY_TOTAL,
    };
    counter!(name).increment(1);
}

/// Record a label written to a client.
pub fn record_label_sent(label: PostureLabel) {
    let labels = [("label", label.as_str().to_string())];
    counter!(names::LABELS_SENT_TOTAL, &labels).increment(1);
}

/// Record an accepted connection.
pub fn record_connection() {
    counter!(names::CONNECTIONS_TOTAL).increment(1);
}

/// Record the state a connection ended in.
pub fn record_connection_closed(state: ConnectionState) {
    let labels = [("state", state.as_str().to_string())];
    counter!(names::CONNECTIONS_CLOSED_TOTAL, &labels).increment(1);
}
