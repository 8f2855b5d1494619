//! Monitor error types.

use std::path::PathBuf;

use thiserror::Error;
use tuya_mcu_session::SessionError;

/// Errors that stop the monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for [`MonitorConfig`](crate::config::MonitorConfig).
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Neither `--connect` nor `--simulate` was given.
    #[error("no endpoint configured; pass --connect HOST:PORT or --simulate")]
    NoEndpoint,

    /// TCP connection to the UART bridge failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A command to the sensor failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Signal handler could not be installed.
    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
