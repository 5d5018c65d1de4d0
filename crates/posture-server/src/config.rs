//! Server configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use posture_classifier::Thresholds;

use crate::error::{ServerError, ServerResult};

/// What the server does after a connection ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServeMode {
    /// Serve exactly one connection, then return.
    #[default]
    Single,
    /// After a client disconnects or fails, wait for the next one. Producer
    /// end-of-stream, acquisition failure and shutdown still end serving.
    Sequential,
}

impl ServeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServeMode::Single => "single",
            ServeMode::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ServeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServeMode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(ServeMode::Single),
            "sequential" => Ok(ServeMode::Sequential),
            other => Err(ServerError::config_error(format!("Unknown serve mode: {other}"))),
        }
    }
}

/// Where pose frames come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSpec {
    /// Alternating straight and slouching samples.
    #[default]
    Synthetic,
    /// JSON lines on standard input.
    Stdin,
    /// JSON lines read from a file.
    File(PathBuf),
}

impl FromStr for SourceSpec {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ServerError::config_error("Empty pose source")),
            "synthetic" => Ok(SourceSpec::Synthetic),
            "stdin" | "-" => Ok(SourceSpec::Stdin),
            path => Ok(SourceSpec::File(PathBuf::from(path))),
        }
    }
}

/// Streaming server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Deadline for writing one line to the client
    pub send_timeout: Duration,
    /// Single-shot or sequential service
    pub serve_mode: ServeMode,
    /// Frames whose least visible point is below this are treated as no pose.
    /// 0 disables the gate.
    pub min_visibility: f32,
    /// Upstream pose source
    pub source: SourceSpec,
    /// Pacing for replay and synthetic sources
    pub frame_interval: Duration,
    /// Classifier calibration
    pub thresholds: Thresholds,
    /// Prometheus exporter listen address
    pub metrics_addr: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9876,
            send_timeout: Duration::from_millis(2000),
            serve_mode: ServeMode::Single,
            min_visibility: 0.0,
            source: SourceSpec::Synthetic,
            frame_interval: Duration::from_millis(33), // ~30 fps
            thresholds: Thresholds::default(),
            metrics_addr: None,
        }
    }
}

/// Parse `key` if it is set. A set but unparseable value is an error, never
/// a silent fallback to the default.
fn lookup_parse<T, F>(lookup: &F, key: &str) -> ServerResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ServerError::config_error(format!("Invalid {key}={raw:?}: {e}"))),
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let thresholds = Thresholds {
            slouch_depth_margin: lookup_parse(&lookup, "POSTURE_SLOUCH_MARGIN")?
                .unwrap_or(defaults.thresholds.slouch_depth_margin),
            slouch_shoulder_depth_floor: lookup_parse(&lookup, "POSTURE_SLOUCH_FLOOR")?
                .unwrap_or(defaults.thresholds.slouch_shoulder_depth_floor),
            lean_depth_margin: lookup_parse(&lookup, "POSTURE_LEAN_MARGIN")?
                .unwrap_or(defaults.thresholds.lean_depth_margin),
            tilt_slope: lookup_parse(&lookup, "POSTURE_TILT_THRESHOLD")?
                .unwrap_or(defaults.thresholds.tilt_slope),
        };

        Ok(Self {
            host: lookup("POSTURE_HOST").unwrap_or(defaults.host),
            port: lookup_parse(&lookup, "POSTURE_PORT")?.unwrap_or(defaults.port),
            send_timeout: lookup_parse(&lookup, "POSTURE_SEND_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.send_timeout),
            serve_mode: lookup_parse(&lookup, "POSTURE_SERVE_MODE")?
                .unwrap_or(defaults.serve_mode),
            min_visibility: lookup_parse(&lookup, "POSTURE_MIN_VISIBILITY")?
                .unwrap_or(defaults.min_visibility),
            source: lookup_parse(&lookup, "POSTURE_SOURCE")?.unwrap_or(defaults.source),
            frame_interval: lookup_parse(&lookup, "POSTURE_FRAME_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.frame_interval),
            thresholds,
            metrics_addr: lookup("METRICS_ADDR").filter(|s| !s.trim().is_empty()),
        })
    }

    /// Address to bind, as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.send_timeout.is_zero() {
            return Err(ServerError::config_error("send timeout must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(ServerError::config_error(format!(
                "min visibility must be within [0, 1], got {}",
                self.min_visibility
            )));
        }
        let t = &self.thresholds;
        for (name, value) in [
            ("slouch depth margin", t.slouch_depth_margin),
            ("slouch shoulder depth floor", t.slouch_shoulder_depth_floor),
            ("lean depth margin", t.lean_depth_margin),
            ("tilt slope threshold", t.tilt_slope),
        ] {
            if !value.is_finite() {
                return Err(ServerError::config_error(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
