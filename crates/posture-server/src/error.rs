//! Server error types.

use std::time::Duration;

use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Frame acquisition failed: {0}")]
    Acquisition(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }
}

/// Upstream producer failures. Any of these ends frame acquisition.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Malformed record on line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }
}

/// Failure to deliver one line to the client.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Send deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("Peer closed the connection: {0}")]
    PeerClosed(#[source] std::io::Error),

    #[error("Write failed: {0}")]
    Io(#[source] std::io::Error),
}

impl SendError {
    /// Classify a write error.
    pub fn from_io(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::WriteZero
            | ErrorKind::UnexpectedEof => Self::PeerClosed(err),
            _ => Self::Io(err),
        }
    }

    /// Check if the peer went away (as opposed to a local failure).
    pub fn is_peer_closed(&self) -> bool {
        matches!(self, SendError::PeerClosed(_))
    }
}
