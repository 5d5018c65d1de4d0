//! Landmark geometry produced by the upstream pose estimator.

use serde::{Deserialize, Serialize};

/// One tracked body point.
///
/// `x` and `y` are normalized image-plane coordinates with the origin at the
/// top-left. They are conceptually in `[0, 1]` but are not clamped upstream.
/// `z` is a signed depth relative to the hips; more negative is closer to
/// the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Confidence in `[0, 1]` that the point is actually visible.
    pub visibility: f32,
}

impl LandmarkPoint {
    /// Create a new landmark point.
    pub const fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }
}

/// The four landmarks a posture is judged from.
///
/// A sample is always complete. A frame where the estimator found no pose is
/// represented by [`Frame::NoPose`], never by a partially filled sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub left_ear: LandmarkPoint,
    pub right_ear: LandmarkPoint,
    pub left_shoulder: LandmarkPoint,
    pub right_shoulder: LandmarkPoint,
}

impl PoseSample {
    /// Create a sample from its four points.
    pub const fn new(
        left_ear: LandmarkPoint,
        right_ear: LandmarkPoint,
        left_shoulder: LandmarkPoint,
        right_shoulder: LandmarkPoint,
    ) -> Self {
        Self {
            left_ear,
            right_ear,
            left_shoulder,
            right_shoulder,
        }
    }

    /// Lowest visibility among the four points.
    pub fn min_visibility(&self) -> f32 {
        self.left_ear
            .visibility
            .min(self.right_ear.visibility)
            .min(self.left_shoulder.visibility)
            .min(self.right_shoulder.visibility)
    }
}

/// Result of one upstream acquisition tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// A pose was detected this frame.
    Pose(PoseSample),
    /// The estimator ran but found no pose.
    NoPose,
}

impl Frame {
    /// Get the sample, if a pose was detected.
    pub fn sample(&self) -> Option<&PoseSample> {
        match self {
            Frame::Pose(sample) => Some(sample),
            Frame::NoPose => None,
        }
    }
}

impl From<Option<PoseSample>> for Frame {
    fn from(value: Option<PoseSample>) -> Self {
        match value {
            Some(sample) => Frame::Pose(sample),
            None => Frame::NoPose,
        }
    }
}
