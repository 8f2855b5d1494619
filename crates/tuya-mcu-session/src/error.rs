//! Session error types.

use thiserror::Error;
use tuya_mcu_protocol::ProtocolError;

/// Errors returned by explicit session commands.
///
/// Problems on the receive path never surface here; the poll absorbs them
/// into readiness state, logs and [`LinkStats`](crate::LinkStats).
#[derive(Error, Debug)]
pub enum SessionError {
    /// No transport is attached.
    #[error("no transport attached")]
    NoTransport,

    /// The transport failed while writing.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame or datapoint could not be built.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
