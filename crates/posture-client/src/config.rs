//! Client configuration.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Stream client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address as `host:port`
    pub server_addr: String,
    /// Delay between a lost connection and the next attempt
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:9876".to_string(),
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let reconnect_delay = match lookup("POSTURE_RECONNECT_DELAY_MS") {
            None => defaults.reconnect_delay,
            Some(raw) => raw.parse().map(Duration::from_millis).map_err(|e| {
                ClientError::ConfigError(format!("Invalid POSTURE_RECONNECT_DELAY_MS={raw:?}: {e}"))
            })?,
        };

        Ok(Self {
            server_addr: lookup("POSTURE_SERVER_ADDR").unwrap_or(defaults.server_addr),
            reconnect_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_vars_keep_defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:9876");
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_vars_override_defaults() {
        let config = ClientConfig::from_lookup(|key| match key {
            "POSTURE_SERVER_ADDR" => Some("10.0.0.5:9000".to_string()),
            "POSTURE_RECONNECT_DELAY_MS" => Some("500".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.server_addr, "10.0.0.5:9000");
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_bad_reconnect_delay_is_an_error() {
        let err = ClientConfig::from_lookup(|key| {
            (key == "POSTURE_RECONNECT_DELAY_MS").then(|| "3s".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::ConfigError(ref m) if m.contains("POSTURE_RECONNECT_DELAY_MS")));
    }
}
