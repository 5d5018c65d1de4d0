//! Shared data models for the posture stream.
//!
//! This crate provides Serde-serializable types for:
//! - Landmark points and per-frame pose samples
//! - Upstream producer frames (pose or no pose)
//! - The closed set of posture labels sent over the wire
//! - Connection identifiers used for logging

pub mod connection;
pub mod label;
pub mod landmark;

// Re-export common types
pub use connection::ConnectionId;
pub use label::{LabelParseError, PostureLabel};
pub use landmark::{Frame, LandmarkPoint, PoseSample};
