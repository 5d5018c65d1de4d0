//! Posture streaming server.
//!
//! This crate provides:
//! - Upstream pose sources (replay, channel, synthetic)
//! - The acquire, classify, send loop for one connection
//! - A line-oriented label protocol with per-message send deadlines
//! - A TCP server with an explicit connection state machine
//! - Graceful shutdown

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod shutdown;
pub mod source;
pub mod stream;

pub use config::{ServeMode, ServerConfig, SourceSpec};
pub use error::{SendError, ServerError, ServerResult, SourceError, SourceResult};
pub use logging::ConnectionLogger;
pub use protocol::{LineWriter, LINE_TERMINATOR, PROTOCOL_VERSION};
pub use server::{ConnectionSummary, PostureServer, ServeReport};
pub use shutdown::Shutdown;
pub use source::{ChannelSource, PoseSource, ReplaySource, SyntheticSource, VecSource};
pub use stream::{ConnectionState, FrameStreamer, StreamOutcome, StreamStats, Termination};
