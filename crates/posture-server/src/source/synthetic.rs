//! Synthetic frames for running without a camera.

use std::time::Duration;

use async_trait::async_trait;
use posture_models::{Frame, LandmarkPoint, PoseSample};
use tokio::time::{Interval, MissedTickBehavior};

use super::PoseSource;
use crate::error::SourceResult;

const VISIBILITY: f32 = 0.95;

/// Ears over level shoulders.
const STRAIGHT: PoseSample = PoseSample::new(
    LandmarkPoint::new(0.3, 0.2, 0.5, VISIBILITY),
    LandmarkPoint::new(0.7, 0.2, 0.5, VISIBILITY),
    LandmarkPoint::new(0.3, 0.4, 0.0, VISIBILITY),
    LandmarkPoint::new(0.7, 0.4, 0.0, VISIBILITY),
);

/// Shoulders pushed back behind the ears.
const SLOUCHING: PoseSample = PoseSample::new(
    LandmarkPoint::new(0.3, 0.3, -0.1, VISIBILITY),
    LandmarkPoint::new(0.7, 0.3, -0.1, VISIBILITY),
    LandmarkPoint::new(0.3, 0.4, 0.2, VISIBILITY),
    LandmarkPoint::new(0.7, 0.4, 0.2, VISIBILITY),
);

/// Alternates between a straight and a slouching pose, one per frame.
pub struct SyntheticSource {
    emitted: u64,
    limit: Option<u64>,
    pacing: Option<Interval>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            emitted: 0,
            limit: None,
            pacing: None,
        }
    }

    /// End the stream after `limit` frames.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
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

    /// The sample emitted for frame number `n`.
    pub fn sample_at(n: u64) -> PoseSample {
        if n % 2 == 0 {
            STRAIGHT
        } else {
            SLOUCHING
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoseSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            return Ok(None);
        }

        if let Some(pacing) = self.pacing.as_mut() {
            pacing.tick().await;
        } else {
            // Unpaced, the loop would otherwise never yield to the runtime.
            tokio::task::yield_now().await;
        }

        let sample = Self::sample_at(self.emitted);
        self.emitted += 1;
        Ok(Some(Frame::Pose(sample)))
    }
}
