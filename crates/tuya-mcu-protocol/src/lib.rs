//! Tuya MCU Serial Protocol
//!
//! This crate provides the wire layer for talking to a Tuya-style MCU over a
//! serial link: frame encoding and decoding, the command and datapoint
//! vocabulary, and the byte transport contract the rest of the stack is
//! written against.
//!
//! # Protocol Overview
//!
//! Every message is a frame of the form
//! `55 AA <version> <command> <len_hi> <len_lo> <payload> <checksum>`.
//! The version byte doubles as the sender tag (`0x00` for the module,
//! `0x03` for the MCU) and the checksum is the byte sum modulo 256.
//!
//! - **Module → MCU**: heartbeats, product/mode queries, datapoint commands
//! - **MCU → module**: heartbeat replies, product info, datapoint reports
//!
//! # Example
//!
//! ```rust
//! use tuya_mcu_protocol::{Command, DeviceType, Frame, FrameReader, LoopbackTransport};
//!
//! let (mut module, mut mcu) = LoopbackTransport::pair();
//! let heartbeat = Frame::empty(DeviceType::Module, Command::Heartbeats);
//! heartbeat.write_to(&mut module).unwrap();
//!
//! let received = FrameReader::default().read(&mut mcu).unwrap();
//! assert_eq!(received, Some(heartbeat));
//! ```

mod constants;
mod datapoint;
mod error;
mod frame;
mod transport;
mod types;

pub use constants::*;
pub use datapoint::*;
pub use error::*;
pub use frame::*;
pub use transport::*;
pub use types::*;
