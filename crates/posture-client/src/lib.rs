//! Posture stream client.
//!
//! This crate provides:
//! - A line reader that parses posture labels off the wire
//! - Posture change tracking with time spent per label
//! - A reconnecting client that reports updates over a channel

pub mod client;
pub mod config;
pub mod error;
pub mod reader;
pub mod tracker;

pub use client::{ClientEvent, StreamClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use reader::LabelReader;
pub use tracker::{PostureChange, PostureTracker};
