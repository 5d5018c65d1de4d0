//! Posture change tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use posture_models::PostureLabel;

/// A transition between two consecutive labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostureChange {
    /// `None` for the first label of a session.
    pub previous: Option<PostureLabel>,
    pub current: PostureLabel,
}

impl PostureChange {
    /// Check if this change moved into good posture.
    pub fn is_recovery(&self) -> bool {
        self.current.is_good() && self.previous.is_some_and(|p| !p.is_good())
    }
}

/// Remembers the current label and accumulates time spent in each one.
#[derive(Debug, Default)]
pub struct PostureTracker {
    current: Option<(PostureLabel, Instant)>,
    time_in: HashMap<PostureLabel, Duration>,
    changes: u64,
}

impl PostureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label received now.
    pub fn observe(&mut self, label: PostureLabel) -> Option<PostureChange> {
        self.observe_at(label, Instant::now())
    }

    /// Record a label received at `at`. Returns a change only when the label
    /// differs from the previous one.
    pub fn observe_at(&mut self, label: PostureLabel, at: Instant) -> Option<PostureChange> {
        let previous = match self.current {
            Some((current, _)) if current == label => return None,
            Some((current, since)) => {
                *self.time_in.entry(current).or_default() += at.saturating_duration_since(since);
                Some(current)
            }
            None => None,
        };

        self.current = Some((label, at));
        self.changes += 1;
        Some(PostureChange {
            previous,
            current: label,
        })
    }

    /// Close the running interval, e.g. when the connection drops. The next
    /// label starts a fresh session.
    pub fn reset_at(&mut self, at: Instant) {
        if let Some((current, since)) = self.current.take() {
            *self.time_in.entry(current).or_default() += at.saturating_duration_since(since);
        }
    }

    pub fn current(&self) -> Option<PostureLabel> {
        self.current.map(|(label, _)| label)
    }

    /// Number of label changes observed, including the first label.
    pub fn changes(&self) -> u64 {
        self.changes
    }

    /// Time spent in `label` over closed intervals.
    pub fn time_in(&self, label: PostureLabel) -> Duration {
        self.time_in.get(&label).copied().unwrap_or_default()
    }

    /// Share of tracked time spent in good posture, if any time was tracked.
    pub fn good_ratio(&self) -> Option<f64> {
        let total: Duration = self.time_in.values().sum();
        if total.is_zero() {
            return None;
        }
        Some(self.time_in(PostureLabel::Straight).as_secs_f64() / total.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_label_is_a_change() {
        let mut tracker = PostureTracker::new();
        let change = tracker.observe(PostureLabel::Straight).unwrap();
        assert_eq!(change.previous, None);
        assert_eq!(change.current, PostureLabel::Straight);
        assert!(!change.is_recovery());
    }

    #[test]
    fn test_repeated_label_is_not_a_change() {
        let mut tracker = PostureTracker::new();
        tracker.observe(PostureLabel::Straight);
        assert!(tracker.observe(PostureLabel::Straight).is_none());
        assert_eq!(tracker.changes(), 1);
    }

    #[test]
    fn test_time_accumulates_per_label() {
        let start = Instant::now();
        let mut tracker = PostureTracker::new();

        tracker.observe_at(PostureLabel::Straight, start);
        tracker.observe_at(PostureLabel::Straight, start + Duration::from_secs(1));
        let change = tracker
            .observe_at(PostureLabel::SlouchingBack, start + Duration::from_secs(3))
            .unwrap();
        assert_eq!(change.previous, Some(PostureLabel::Straight));

        let change = tracker
            .observe_at(PostureLabel::Straight, start + Duration::from_secs(4))
            .unwrap();
        assert!(change.is_recovery());
        tracker.reset_at(start + Duration::from_secs(6));

        assert_eq!(tracker.time_in(PostureLabel::Straight), Duration::from_secs(5));
        assert_eq!(tracker.time_in(PostureLabel::SlouchingBack), Duration::from_secs(1));
        assert_eq!(tracker.current(), None);
        assert!((tracker.good_ratio().unwrap() - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_good_ratio_without_history() {
        assert_eq!(PostureTracker::new().good_ratio(), None);
    }
}
