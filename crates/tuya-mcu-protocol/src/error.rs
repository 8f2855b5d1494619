//! Protocol error types.

use thiserror::Error;

use crate::types::DataType;

/// Errors that can occur when working with the Tuya MCU protocol.
///
/// "No data pending" is not an error; frame readers report it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame checksum does not match its contents.
    #[error("checksum mismatch: computed 0x{expected:02X}, frame carried 0x{actual:02X}")]
    Checksum {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte carried by the frame.
        actual: u8,
    },

    /// Declared payload length exceeds the payload capacity.
    #[error("payload overflow: maximum {max} bytes, declared {declared}")]
    Overflow {
        /// Payload capacity.
        max: usize,
        /// Length declared (or requested) for the payload.
        declared: usize,
    },

    /// Input ran dry before the frame was complete.
    #[error("frame truncated: expected {expected} more bytes, got {actual}")]
    Truncated {
        /// Bytes still required.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },

    /// Payload is too short for the structure it should hold.
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Datapoint carries a different type tag than required.
    #[error("unexpected datapoint type: expected {expected:?}, got {actual:?}")]
    UnexpectedDataType {
        /// Required type.
        expected: DataType,
        /// Type tag found in the payload.
        actual: DataType,
    },

    /// Datapoint id is not known to the decoder.
    #[error("unknown datapoint id: 0x{0:02X}")]
    UnknownDatapoint(u8),

    /// Product info payload is not a valid JSON document.
    #[error("invalid product info: {0}")]
    InvalidProductInfo(String),

    /// Invalid data in a payload.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// UTF-8 decoding error.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
}
