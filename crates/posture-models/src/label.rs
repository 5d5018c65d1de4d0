//! Posture labels.
//!
//! The label set is closed: these seven names are the only values ever
//! written to a client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Discrete classification of body alignment for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostureLabel {
    /// Ears over shoulders, level head and shoulders.
    Straight,
    /// Shoulders pushed back behind the ears.
    SlouchingBack,
    /// Head pushed far forward of the shoulders.
    LeaningIn,
    /// Ear line slopes down toward the right.
    HeadTiltRight,
    /// Ear line slopes down toward the left.
    HeadTiltLeft,
    /// Shoulder line slopes down toward the right.
    BodyTiltRight,
    /// Shoulder line slopes down toward the left.
    BodyTiltLeft,
}

impl PostureLabel {
    /// All posture labels.
    pub const ALL: &'static [PostureLabel] = &[
        PostureLabel::Straight,
        PostureLabel::SlouchingBack,
        PostureLabel::LeaningIn,
        PostureLabel::HeadTiltRight,
        PostureLabel::HeadTiltLeft,
        PostureLabel::BodyTiltRight,
        PostureLabel::BodyTiltLeft,
    ];

    /// Returns the wire name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureLabel::Straight => "STRAIGHT",
            PostureLabel::SlouchingBack => "SLOUCHING_BACK",
            PostureLabel::LeaningIn => "LEANING_IN",
            PostureLabel::HeadTiltRight => "HEAD_TILT_RIGHT",
            PostureLabel::HeadTiltLeft => "HEAD_TILT_LEFT",
            PostureLabel::BodyTiltRight => "BODY_TILT_RIGHT",
            PostureLabel::BodyTiltLeft => "BODY_TILT_LEFT",
        }
    }

    /// Returns a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            PostureLabel::Straight => "Straight",
            PostureLabel::SlouchingBack => "Slouching back",
            PostureLabel::LeaningIn => "Leaning in",
            PostureLabel::HeadTiltRight => "Head tilt right",
            PostureLabel::HeadTiltLeft => "Head tilt left",
            PostureLabel::BodyTiltRight => "Body tilt right",
            PostureLabel::BodyTiltLeft => "Body tilt left",
        }
    }

    /// Returns true if this is good posture.
    pub fn is_good(&self) -> bool {
        matches!(self, PostureLabel::Straight)
    }
}

impl fmt::Display for PostureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PostureLabel {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostureLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| LabelParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown posture label: {0}")]
pub struct LabelParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!("STRAIGHT".parse::<PostureLabel>().unwrap(), PostureLabel::Straight);
        assert_eq!(
            "SLOUCHING_BACK".parse::<PostureLabel>().unwrap(),
            PostureLabel::SlouchingBack
        );
        assert_eq!(
            "BODY_TILT_LEFT".parse::<PostureLabel>().unwrap(),
            PostureLabel::BodyTiltLeft
        );
        assert!("straight".parse::<PostureLabel>().is_err());
        assert!("UNKNOWN".parse::<PostureLabel>().is_err());
        assert!("".parse::<PostureLabel>().is_err());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(PostureLabel::Straight.to_string(), "STRAIGHT");
        assert_eq!(PostureLabel::HeadTiltRight.to_string(), "HEAD_TILT_RIGHT");
        assert_eq!(PostureLabel::SlouchingBack.description(), "Slouching back");
    }

    #[test]
    fn test_serde_matches_wire_name() {
        for label in PostureLabel::ALL {
            let json = serde_json::to_string(label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
        }
    }

    #[test]
    fn test_only_straight_is_good() {
        let good: Vec<_> = PostureLabel::ALL.iter().filter(|l| l.is_good()).collect();
        assert_eq!(good, vec![&PostureLabel::Straight]);
    }

    #[test]
    fn test_names_are_ascii() {
        for label in PostureLabel::ALL {
            assert!(label.as_str().is_ascii());
            assert!(!label.as_str().contains('\n'));
        }
    }
}
