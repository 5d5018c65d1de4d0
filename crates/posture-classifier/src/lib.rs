//! Posture classification.
//!
//! Turns the four ear and shoulder landmarks of one frame into a single
//! [`PostureLabel`](posture_models::PostureLabel). Classification is pure:
//! no state is carried between frames and the same sample always yields
//! the same label.

pub mod classifier;
pub mod geometry;
pub mod thresholds;

pub use classifier::{classify, PostureClassifier};
pub use geometry::{slope, PostureMetrics};
pub use thresholds::{
    Thresholds, LEAN_DEPTH_MARGIN, SLOUCH_DEPTH_MARGIN, SLOUCH_SHOULDER_DEPTH_FLOOR,
    TILT_SLOPE_THRESHOLD,
};
