//! Monitor configuration file.
//!
//! ```yaml
//! connect: 127.0.0.1:9000
//! summary_interval_secs: 5
//! frame_timeout_ms: 1000
//! session:
//!   poll_delay_ms: 100
//! thresholds:
//!   max_temperature: 30.0
//!   min_tds: 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tuya_mcu_session::{SessionConfig, SessionError};
use tuya_water_quality::WaterQualityMonitor;

use crate::error::MonitorError;

/// Everything the monitor can be told through its config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// `host:port` of the TCP-bridged UART.
    pub connect: Option<String>,
    /// Session timing.
    pub session: SessionConfig,
    /// Thresholds programmed once the sensor is ready.
    pub thresholds: Thresholds,
    /// Seconds between summary printouts.
    pub summary_interval_secs: u64,
    /// How long the link may stall in the middle of a frame.
    pub frame_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            connect: None,
            session: SessionConfig::default(),
            thresholds: Thresholds::default(),
            summary_interval_secs: 5,
            frame_timeout_ms: 1000,
        }
    }
}

impl MonitorConfig {
    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, MonitorError> {
        let text = std::fs::read_to_string(path).map_err(|source| MonitorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| MonitorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Alarm thresholds to program. Unset entries are left as they are on the
/// sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_ph: Option<f64>,
    pub min_ph: Option<f64>,
    pub max_tds: Option<i32>,
    pub min_tds: Option<i32>,
}

impl Thresholds {
    pub fn is_empty(&self) -> bool {
        *self == Thresholds::default()
    }

    /// Send every configured threshold to the sensor.
    pub fn program(&self, monitor: &mut WaterQualityMonitor) -> Result<(), SessionError> {
        if let Some(v) = self.max_temperature {
            monitor.set_max_temperature(v)?;
        }
        if let Some(v) = self.min_temperature {
            monitor.set_min_temperature(v)?;
        }
        if let Some(v) = self.max_ph {
            monitor.set_max_ph(v)?;
        }
        if let Some(v) = self.min_ph {
            monitor.set_min_ph(v)?;
        }
        if let Some(v) = self.max_tds {
            monitor.set_max_tds(v)?;
        }
        if let Some(v) = self.min_tds {
            monitor.set_min_tds(v)?;
        }
        Ok(())
    }
}
