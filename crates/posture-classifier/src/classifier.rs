//! Ordered posture rules.

use posture_models::{PoseSample, PostureLabel};

use crate::geometry::PostureMetrics;
use crate::thresholds::Thresholds;

/// Classify a sample with the default thresholds.
pub fn classify(sample: &PoseSample) -> PostureLabel {
    PostureClassifier::default().classify(sample)
}

/// Rule-based posture classifier.
///
/// Rules are evaluated in a fixed order and the first match wins. Depth
/// rules (slouching, leaning in) always take priority over tilt rules, and
/// head tilt takes priority over body tilt.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostureClassifier {
    thresholds: Thresholds,
}

impl PostureClassifier {
    /// Create a classifier with custom thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Measure a sample without classifying it.
    pub fn measure(&self, sample: &PoseSample) -> PostureMetrics {
        PostureMetrics::from_sample(sample)
    }

    /// Classify a sample.
    pub fn classify(&self, sample: &PoseSample) -> PostureLabel {
        self.classify_metrics(&self.measure(sample))
    }

    /// Classify already computed measurements.
    pub fn classify_metrics(&self, metrics: &PostureMetrics) -> PostureLabel {
        let t = &self.thresholds;

        if metrics.avg_ear_depth + t.slouch_depth_margin < metrics.avg_shoulder_depth
            && metrics.avg_shoulder_depth > t.slouch_shoulder_depth_floor
        {
            return PostureLabel::SlouchingBack;
        }

        if metrics.avg_ear_depth + t.lean_depth_margin < metrics.avg_shoulder_depth {
            return PostureLabel::LeaningIn;
        }

        if metrics.ear_slope > t.tilt_slope {
            return PostureLabel::HeadTiltRight;
        }
        if metrics.ear_slope < -t.tilt_slope {
            return PostureLabel::HeadTiltLeft;
        }

        if metrics.shoulder_slope > t.tilt_slope {
            return PostureLabel::BodyTiltRight;
        }
        if metrics.shoulder_slope < -t.tilt_slope {
            return PostureLabel::BodyTiltLeft;
        }

        PostureLabel::Straight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_models::LandmarkPoint;

    const VIS: f32 = 0.95;

    /// Build a sample from ear and shoulder (x, y, z) triples.
    fn sample(ears: [(f32, f32, f32); 2], shoulders: [(f32, f32, f32); 2]) -> PoseSample {
        let p = |(x, y, z): (f32, f32, f32)| LandmarkPoint::new(x, y, z, VIS);
        PoseSample::new(p(ears[0]), p(ears[1]), p(shoulders[0]), p(shoulders[1]))
    }

    /// Level ears and shoulders at the given average depths.
    fn level(ear_z: f32, shoulder_z: f32) -> PoseSample {
        sample(
            [(0.3, 0.2, ear_z), (0.7, 0.2, ear_z)],
            [(0.3, 0.4, shoulder_z), (0.7, 0.4, shoulder_z)],
        )
    }

    /// Ears at the given slope, shoulders level, no depth offset.
    fn ear_tilt(ear_slope: f32) -> PoseSample {
        // left.x - right.x = -0.4
        let left_y = 0.2 + ear_slope * -0.4;
        sample(
            [(0.3, left_y, 0.0), (0.7, 0.2, 0.0)],
            [(0.3, 0.4, 0.0), (0.7, 0.4, 0.0)],
        )
    }

    fn shoulder_tilt(shoulder_slope: f32) -> PoseSample {
        let left_y = 0.4 + shoulder_slope * -0.4;
        sample(
            [(0.3, 0.2, 0.0), (0.7, 0.2, 0.0)],
            [(0.3, left_y, 0.0), (0.7, 0.4, 0.0)],
        )
    }

    #[test]
    fn test_straight_reference_pose() {
        let s = sample(
            [(0.3, 0.2, 0.5), (0.7, 0.2, 0.5)],
            [(0.3, 0.4, 0.0), (0.7, 0.4, 0.0)],
        );
        assert_eq!(classify(&s), PostureLabel::Straight);
    }

    #[test]
    fn test_slouching_reference_pose() {
        let s = sample(
            [(0.3, 0.3, -0.1), (0.7, 0.3, -0.1)],
            [(0.3, 0.4, 0.2), (0.7, 0.4, 0.2)],
        );
        assert_eq!(classify(&s), PostureLabel::SlouchingBack);
    }

    #[test]
    fn test_slouch_condition_always_slouches() {
        for shoulder_z in [-0.3_f32, -0.1, 0.0, 0.2, 0.6, 1.0] {
            for gap in [0.21_f32, 0.3, 0.5, 1.0] {
                let s = level(shoulder_z - gap, shoulder_z);
                assert_eq!(
                    classify(&s),
                    PostureLabel::SlouchingBack,
                    "shoulder_z={shoulder_z} gap={gap}"
                );
            }
        }
    }

    #[test]
    fn test_deep_forward_pose_leans_in() {
        // Shoulders too close to the camera for slouching, but the ear gap
        // still exceeds the lean margin.
        let s = level(-0.9, -0.5);
        assert_eq!(classify(&s), PostureLabel::LeaningIn);
    }

    #[test]
    fn test_small_depth_gap_is_not_lean() {
        let s = level(-0.7, -0.5);
        assert_eq!(classify(&s), PostureLabel::Straight);
    }

    #[test]
    fn test_head_tilt_right_iff_slope_above_threshold() {
        for slope in [0.06_f32, 0.1, 0.3, 1.0] {
            assert_eq!(classify(&ear_tilt(slope)), PostureLabel::HeadTiltRight, "slope={slope}");
        }
        for slope in [0.0_f32, 0.01, 0.04, -0.04] {
            assert_ne!(classify(&ear_tilt(slope)), PostureLabel::HeadTiltRight, "slope={slope}");
        }
    }

    #[test]
    fn test_head_tilt_left() {
        assert_eq!(classify(&ear_tilt(-0.125)), PostureLabel::HeadTiltLeft);
    }

    #[test]
    fn test_body_tilt() {
        assert_eq!(classify(&shoulder_tilt(0.125)), PostureLabel::BodyTiltRight);
        assert_eq!(classify(&shoulder_tilt(-0.125)), PostureLabel::BodyTiltLeft);
        assert_eq!(classify(&shoulder_tilt(0.02)), PostureLabel::Straight);
    }

    #[test]
    fn test_depth_rules_dominate_tilt() {
        // Slouching with both head and body tilted.
        let s = sample(
            [(0.3, 0.15, -0.1), (0.7, 0.3, -0.1)],
            [(0.3, 0.3, 0.2), (0.7, 0.45, 0.2)],
        );
        assert_eq!(classify(&s), PostureLabel::SlouchingBack);

        // Leaning in with a head tilt.
        let s = sample(
            [(0.3, 0.15, -0.9), (0.7, 0.3, -0.9)],
            [(0.3, 0.4, -0.5), (0.7, 0.4, -0.5)],
        );
        assert_eq!(classify(&s), PostureLabel::LeaningIn);
    }

    #[test]
    fn test_head_tilt_dominates_body_tilt() {
        let s = sample(
            [(0.3, 0.15, 0.0), (0.7, 0.2, 0.0)],
            [(0.3, 0.45, 0.0), (0.7, 0.4, 0.0)],
        );
        assert_eq!(classify(&s), PostureLabel::HeadTiltRight);
    }

    #[test]
    fn test_equal_ear_x_falls_back_to_zero_slope() {
        let s = sample(
            [(0.5, 0.1, 0.0), (0.5, 0.3, 0.0)],
            [(0.3, 0.4, 0.0), (0.7, 0.4, 0.0)],
        );
        assert_eq!(classify(&s), PostureLabel::Straight);

        // Shoulders still decide when only the ears are degenerate.
        let s = sample(
            [(0.5, 0.1, 0.0), (0.5, 0.3, 0.0)],
            [(0.3, 0.35, 0.0), (0.7, 0.4, 0.0)],
        );
        assert_eq!(classify(&s), PostureLabel::BodyTiltRight);
    }

    #[test]
    fn test_equal_shoulder_x_falls_back_to_zero_slope() {
        let s = sample(
            [(0.3, 0.2, 0.0), (0.7, 0.2, 0.0)],
            [(0.5, 0.3, 0.0), (0.5, 0.5, 0.0)],
        );
        assert_eq!(classify(&s), PostureLabel::Straight);
    }

    #[test]
    fn test_non_finite_input_is_total() {
        let s = sample(
            [(f32::NAN, 0.2, f32::NAN), (0.7, 0.2, 0.0)],
            [(0.3, 0.4, 0.0), (0.7, f32::INFINITY, 0.0)],
        );
        assert_eq!(classify(&s), PostureLabel::Straight);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let samples = [level(0.5, 0.0), level(-0.1, 0.2), ear_tilt(0.2), shoulder_tilt(-0.3)];
        for s in &samples {
            assert_eq!(classify(s), classify(s));
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = PostureClassifier::new(Thresholds {
            tilt_slope: 0.01,
            ..Thresholds::default()
        });
        let s = ear_tilt(0.03);
        assert_eq!(classify(&s), PostureLabel::Straight);
        assert_eq!(strict.classify(&s), PostureLabel::HeadTiltRight);
    }
}
