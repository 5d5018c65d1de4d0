//! Structured connection logging utilities.
//!
//! Provides consistent, structured logging for a client connection's
//! lifecycle with tracing spans and contextual information.

use std::net::SocketAddr;

use posture_models::ConnectionId;
use tracing::{debug, error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with colored output for dev, JSON when `LOG_FORMAT=json`.
pub fn init_tracing(default_directive: &str) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = default_directive.parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Connection logger for structured logging with consistent formatting.
///
/// Every event carries the connection ID and peer address so that a
/// client's whole life can be followed in aggregated logs.
#[derive(Debug, Clone)]
pub struct ConnectionLogger {
    connection_id: String,
    peer: String,
}

impl ConnectionLogger {
    /// Create a new logger for an accepted connection.
    pub fn new(connection_id: &ConnectionId, peer: SocketAddr) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            peer: peer.to_string(),
        }
    }

    /// Create a logger for a stream that is not backed by a socket.
    pub fn detached(connection_id: &ConnectionId) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            peer: "detached".to_string(),
        }
    }

    /// Log that streaming started.
    pub fn log_start(&self, message: &str) {
        info!(
            connection_id = %self.connection_id,
            peer = %self.peer,
            "Connection started: {}", message
        );
    }

    /// Log per-frame progress. Debug level, this fires at frame rate.
    pub fn log_progress(&self, message: &str) {
        debug!(
            connection_id = %self.connection_id,
            peer = %self.peer,
            "Connection progress: {}", message
        );
    }

    /// Log a warning.
    pub fn log_warning(&self, message: &str) {
        warn!(
            connection_id = %self.connection_id,
            peer = %self.peer,
            "Connection warning: {}", message
        );
    }

    /// Log an error.
    pub fn log_error(&self, message: &str) {
        error!(
            connection_id = %self.connection_id,
            peer = %self.peer,
            "Connection error: {}", message
        );
    }

    /// Log the end of the connection.
    pub fn log_completion(&self, message: &str) {
        info!(
            connection_id = %self.connection_id,
            peer = %self.peer,
            "Connection closed: {}", message
        );
    }

    /// Get the connection ID.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Get the peer address.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Create a tracing span for this connection.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "connection",
            connection_id = %self.connection_id,
            peer = %self.peer
        )
    }
}
