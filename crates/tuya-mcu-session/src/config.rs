//! Session timing configuration.

use serde::{Deserialize, Serialize};

/// Timing and framing knobs for a [`Session`](crate::Session).
///
/// Every field has a default, so a config file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sleep at the end of every poll.
    pub poll_delay_ms: u64,
    /// Sleep after each handshake query.
    pub command_delay_ms: u64,
    /// Heartbeat period until the MCU has answered one.
    pub heartbeat_interval_ms: u64,
    /// Heartbeat period once the MCU is known to be alive.
    pub heartbeat_keepalive_ms: u64,
    /// Drop whatever follows a complete frame in the input.
    pub discard_trailing_input: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_delay_ms: 250,
            command_delay_ms: 250,
            heartbeat_interval_ms: 1000,
            heartbeat_keepalive_ms: 15000,
            discard_trailing_input: true,
        }
    }
}

impl SessionConfig {
    /// Config with no sleeps, for tests and simulation.
    pub fn immediate() -> Self {
        Self {
            poll_delay_ms: 0,
            command_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Heartbeat period for the given handshake progress.
    pub fn heartbeat_period_ms(&self, heartbeat_acquired: bool) -> u64 {
        if heartbeat_acquired {
            self.heartbeat_keepalive_ms
        } else {
            self.heartbeat_interval_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: SessionConfig = serde_yaml::from_str("poll_delay_ms: 10\n").unwrap();
        assert_eq!(config.poll_delay_ms, 10);
        assert_eq!(config.command_delay_ms, 250);
        assert_eq!(config.heartbeat_keepalive_ms, 15000);
        assert!(config.discard_trailing_input);
    }

    #[test]
    fn test_heartbeat_period() {
        let config = SessionConfig::default();
        assert_eq!(config.heartbeat_period_ms(false), 1000);
        assert_eq!(config.heartbeat_period_ms(true), 15000);
    }
}
