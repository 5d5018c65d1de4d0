//! Geometric measurements the posture rules are evaluated on.

use posture_models::{LandmarkPoint, PoseSample};

/// Image-plane slope from `right` to `left`.
///
/// Two points sharing an x-coordinate have no defined slope; that case, and
/// any non-finite quotient, reads as `0.0` (no tilt).
pub fn slope(left: &LandmarkPoint, right: &LandmarkPoint) -> f32 {
    let run = left.x - right.x;
    if run == 0.0 {
        return 0.0;
    }

    let slope = (left.y - right.y) / run;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

fn average_depth(a: &LandmarkPoint, b: &LandmarkPoint) -> f32 {
    (a.z + b.z) / 2.0
}

/// Depth and slope measurements for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureMetrics {
    pub avg_ear_depth: f32,
    pub avg_shoulder_depth: f32,
    pub ear_slope: f32,
    pub shoulder_slope: f32,
}

impl PostureMetrics {
    /// Measure a sample.
    pub fn from_sample(sample: &PoseSample) -> Self {
        Self {
            avg_ear_depth: average_depth(&sample.left_ear, &sample.right_ear),
            avg_shoulder_depth: average_depth(&sample.left_shoulder, &sample.right_shoulder),
            ear_slope: slope(&sample.left_ear, &sample.right_ear),
            shoulder_slope: slope(&sample.left_shoulder, &sample.right_shoulder),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> LandmarkPoint {
        LandmarkPoint::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn test_slope_level_line() {
        assert_eq!(slope(&point(0.3, 0.2), &point(0.7, 0.2)), 0.0);
    }

    #[test]
    fn test_slope_sign() {
        // Left point higher in the image (smaller y) than the right one.
        assert!(slope(&point(0.3, 0.15), &point(0.7, 0.2)) > 0.0);
        assert!(slope(&point(0.3, 0.25), &point(0.7, 0.2)) < 0.0);
    }

    #[test]
    fn test_slope_equal_x_is_zero() {
        assert_eq!(slope(&point(0.5, 0.1), &point(0.5, 0.9)), 0.0);
        assert_eq!(slope(&point(0.5, 0.4), &point(0.5, 0.4)), 0.0);
    }

    #[test]
    fn test_slope_non_finite_is_zero() {
        assert_eq!(slope(&point(f32::NAN, 0.1), &point(0.5, 0.2)), 0.0);
        assert_eq!(slope(&point(f32::INFINITY, 0.1), &point(0.5, 0.2)), 0.0);
    }

    #[test]
    fn test_metrics_from_sample() {
        let sample = PoseSample::new(
            LandmarkPoint::new(0.3, 0.3, -0.1, 0.95),
            LandmarkPoint::new(0.7, 0.3, -0.3, 0.95),
            LandmarkPoint::new(0.3, 0.4, 0.2, 0.95),
            LandmarkPoint::new(0.7, 0.4, 0.4, 0.95),
        );

        let metrics = PostureMetrics::from_sample(&sample);
        assert!((metrics.avg_ear_depth - -0.2).abs() < 1e-6);
        assert!((metrics.avg_shoulder_depth - 0.3).abs() < 1e-6);
        assert_eq!(metrics.ear_slope, 0.0);
        assert_eq!(metrics.shoulder_slope, 0.0);
    }
}
