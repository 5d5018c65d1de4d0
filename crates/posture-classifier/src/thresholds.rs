//! Calibration constants for the posture rules.

/// Ears must sit at least this far in front of the shoulders (in depth
/// units) before the pose counts as slouching back.
pub const SLOUCH_DEPTH_MARGIN: f32 = 0.2;

/// Slouching is only reported while the shoulders are deeper than this.
pub const SLOUCH_SHOULDER_DEPTH_FLOOR: f32 = -0.33;

/// Ears must sit at least this far in front of the shoulders before the pose
/// counts as leaning in.
pub const LEAN_DEPTH_MARGIN: f32 = 0.33;

/// Absolute ear or shoulder slope beyond which the line counts as tilted.
pub const TILT_SLOPE_THRESHOLD: f32 = 0.05;

/// Tunable thresholds for [`PostureClassifier`](crate::PostureClassifier).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub slouch_depth_margin: f32,
    pub slouch_shoulder_depth_floor: f32,
    pub lean_depth_margin: f32,
    pub tilt_slope: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            slouch_depth_margin: SLOUCH_DEPTH_MARGIN,
            slouch_shoulder_depth_floor: SLOUCH_SHOULDER_DEPTH_FLOOR,
            lean_depth_margin: LEAN_DEPTH_MARGIN,
            tilt_slope: TILT_SLOPE_THRESHOLD,
        }
    }
}
