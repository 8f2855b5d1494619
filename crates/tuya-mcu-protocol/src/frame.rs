//! Frame encoding/decoding utilities.
//!
//! Every message on the link is one frame:
//!
//! ```text
//! +------+------+---------+---------+--------+--------+-------------------+----------+
//! | 0x55 | 0xAA | version | command | len_hi | len_lo | payload[0..len]   | checksum |
//! +------+------+---------+---------+--------+--------+-------------------+----------+
//! ```
//!
//! The checksum is the sum of every preceding byte, modulo 256. Readers scan
//! for the two header bytes one byte at a time, so a lost or garbled byte
//! never leaves the parser permanently out of step.

use std::io;

use bytes::{Buf, BytesMut};

use crate::constants::*;
use crate::error::ProtocolError;
use crate::transport::Transport;
use crate::types::{Command, DeviceType};

/// Sum of `bytes`, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    version: u8,
    command: u8,
    payload: Vec<u8>,
}

impl Frame {
    /// Build a frame, rejecting payloads above [`MAX_PAYLOAD_LEN`].
    pub fn new(
        device_type: DeviceType,
        command: Command,
        payload: &[u8],
    ) -> Result<Self, ProtocolError> {
        Self::from_parts(device_type.into(), command.into(), payload.to_vec())
    }

    /// Build a frame without payload.
    pub fn empty(device_type: DeviceType, command: Command) -> Self {
        Frame {
            version: device_type.into(),
            command: command.into(),
            payload: Vec::new(),
        }
    }

    /// Build a frame from raw header bytes.
    pub fn from_parts(version: u8, command: u8, payload: Vec<u8>) -> Result<Self, ProtocolError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::Overflow {
                max: MAX_PAYLOAD_LEN,
                declared: payload.len(),
            });
        }
        Ok(Frame {
            version,
            command,
            payload,
        })
    }

    /// Raw version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Sender recorded in the version byte.
    pub fn device_type(&self) -> DeviceType {
        DeviceType::from(self.version)
    }

    /// Raw command byte.
    pub fn command_code(&self) -> u8 {
        self.command
    }

    /// Decoded command.
    pub fn command(&self) -> Command {
        Command::from(self.command)
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Declared payload length.
    pub fn payload_len(&self) -> u16 {
        // Bounded by MAX_PAYLOAD_LEN at construction.
        self.payload.len() as u16
    }

    fn preamble(&self) -> [u8; FRAME_PREAMBLE_LEN] {
        let [len_hi, len_lo] = self.payload_len().to_be_bytes();
        [
            FRAME_HEADER_HI,
            FRAME_HEADER_LO,
            self.version,
            self.command,
            len_hi,
            len_lo,
        ]
    }

    /// Checksum over the preamble and payload.
    pub fn checksum(&self) -> u8 {
        checksum(&self.preamble()).wrapping_add(checksum(&self.payload))
    }

    /// Exact wire image of the frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_PREAMBLE_LEN + self.payload.len() + FRAME_CHECKSUM_LEN);
        buf.extend_from_slice(&self.preamble());
        buf.extend_from_slice(&self.payload);
        buf.push(self.checksum());
        buf
    }

    /// Serialize the frame onto a transport and flush it.
    pub fn write_to<T: Transport + ?Sized>(&self, transport: &mut T) -> io::Result<()> {
        transport.write_all(&self.preamble())?;
        if !self.payload.is_empty() {
            transport.write_all(&self.payload)?;
        }
        transport.write_byte(self.checksum())?;
        transport.flush()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from {:?}, {} byte payload",
            self.command(),
            self.device_type(),
            self.payload.len()
        )
    }
}

/// Reads one frame at a time straight off a [`Transport`].
#[derive(Debug, Clone, Copy)]
pub struct FrameReader {
    discard_trailing_input: bool,
}

impl Default for FrameReader {
    fn default() -> Self {
        FrameReader {
            discard_trailing_input: true,
        }
    }
}

impl FrameReader {
    /// Create a reader.
    ///
    /// With `discard_trailing_input` set, whatever follows a complete frame in
    /// the input is dropped. Overflow, truncation and checksum failures always
    /// drop the remaining input.
    pub fn new(discard_trailing_input: bool) -> Self {
        FrameReader {
            discard_trailing_input,
        }
    }

    /// Whether input following a complete frame is dropped.
    pub fn discards_trailing_input(&self) -> bool {
        self.discard_trailing_input
    }

    /// Attempt to read one frame.
    ///
    /// Returns `Ok(None)` when no frame header is available.
    pub fn read<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
    ) -> Result<Option<Frame>, ProtocolError> {
        if !Self::find_header(transport) {
            return Ok(None);
        }

        let mut head = [0u8; FRAME_PREAMBLE_LEN - 2];
        let got = transport.read_bytes(&mut head);
        if got < head.len() {
            transport.discard_input();
            return Err(ProtocolError::Truncated {
                expected: head.len(),
                actual: got,
            });
        }
        let [version, command, len_hi, len_lo] = head;
        let len = u16::from_be_bytes([len_hi, len_lo]) as usize;

        if len > MAX_PAYLOAD_LEN {
            transport.discard_input();
            return Err(ProtocolError::Overflow {
                max: MAX_PAYLOAD_LEN,
                declared: len,
            });
        }

        let mut payload = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = transport.read_bytes(&mut payload[filled..]);
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < len {
            transport.discard_input();
            return Err(ProtocolError::Truncated {
                expected: len + FRAME_CHECKSUM_LEN,
                actual: filled,
            });
        }

        let Some(carried) = transport.read_byte() else {
            transport.discard_input();
            return Err(ProtocolError::Truncated {
                expected: FRAME_CHECKSUM_LEN,
                actual: 0,
            });
        };

        let frame = Frame {
            version,
            command,
            payload,
        };
        let computed = frame.checksum();
        if computed != carried {
            transport.discard_input();
            return Err(ProtocolError::Checksum {
                expected: computed,
                actual: carried,
            });
        }

        if self.discard_trailing_input {
            transport.discard_input();
        }
        Ok(Some(frame))
    }

    /// Consume input up to and including the next `0x55 0xAA` pair.
    fn find_header<T: Transport + ?Sized>(transport: &mut T) -> bool {
        let mut skipped = 0usize;
        let mut previous = None;
        while transport.available() > 0 {
            let Some(byte) = transport.read_byte() else {
                break;
            };
            if previous == Some(FRAME_HEADER_HI) && byte == FRAME_HEADER_LO {
                if skipped > 1 {
                    log::trace!("resynchronised after {} stray bytes", skipped - 1);
                }
                return true;
            }
            previous = Some(byte);
            skipped += 1;
        }
        false
    }
}

/// A codec for frames arriving in arbitrary chunks.
///
/// Same framing rules as [`FrameReader`], but bytes are pushed in and frames
/// popped out, so partial frames are kept until the rest arrives.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl FrameCodec {
    /// Create a new frame codec.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode a complete frame from the buffer.
    ///
    /// Returns `Ok(None)` if more data is needed. A checksum failure drops
    /// only the offending header so that a real frame hiding behind it can
    /// still be found; an overflow drops the whole buffer.
    pub fn decode(&mut self) -> Result<Option<Frame>, ProtocolError> {
        // Scan for the header, discarding any preceding garbage
        while self.buffer.len() >= 2
            && !(self.buffer[0] == FRAME_HEADER_HI && self.buffer[1] == FRAME_HEADER_LO)
        {
            self.buffer.advance(1);
        }

        if self.buffer.len() < FRAME_PREAMBLE_LEN {
            return Ok(None);
        }

        let len = u16::from_be_bytes([self.buffer[4], self.buffer[5]]) as usize;
        if len > MAX_PAYLOAD_LEN {
            self.buffer.clear();
            return Err(ProtocolError::Overflow {
                max: MAX_PAYLOAD_LEN,
                declared: len,
            });
        }

        let total = FRAME_PREAMBLE_LEN + len + FRAME_CHECKSUM_LEN;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let computed = checksum(&self.buffer[..total - 1]);
        let carried = self.buffer[total - 1];
        if computed != carried {
            self.buffer.advance(2);
            return Err(ProtocolError::Checksum {
                expected: computed,
                actual: carried,
            });
        }

        let raw = self.buffer.split_to(total);
        Ok(Some(Frame {
            version: raw[2],
            command: raw[3],
            payload: raw[FRAME_PREAMBLE_LEN..total - 1].to_vec(),
        }))
    }

    /// Decode every complete frame in the buffer, skipping corrupt ones.
    pub fn decode_all(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        loop {
            match self.decode() {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(e) => log::debug!("dropping corrupt frame: {}", e),
            }
        }
        frames
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;

    fn heartbeat_reply() -> Frame {
        Frame::new(DeviceType::Mcu, Command::Heartbeats, &[0x01]).unwrap()
    }

    #[test]
    fn test_wire_image() {
        let frame = Frame::empty(DeviceType::Module, Command::Heartbeats);
        assert_eq!(frame.to_bytes(), vec![0x55, 0xAA, 0x00, 0x00, 0x00, 0x00, 0xFF]);

        let frame = Frame::new(DeviceType::Module, Command::ReportNetworkStatus, &[0x04]).unwrap();
        assert_eq!(
            frame.to_bytes(),
            vec![0x55, 0xAA, 0x00, 0x03, 0x00, 0x01, 0x04, 0x07]
        );
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[]), 0x00);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            Frame::new(DeviceType::Module, Command::SendCommand, &payload),
            Err(ProtocolError::Overflow {
                max: MAX_PAYLOAD_LEN,
                declared: MAX_PAYLOAD_LEN + 1,
            })
        );
        let payload = vec![0u8; MAX_PAYLOAD_LEN];
        assert!(Frame::new(DeviceType::Module, Command::SendCommand, &payload).is_ok());
    }

    #[test]
    fn test_write_to_matches_wire_image() {
        let (mut module, mut mcu) = LoopbackTransport::pair();
        let frame = heartbeat_reply();
        frame.write_to(&mut module).unwrap();
        assert_eq!(mcu.drain(), frame.to_bytes());
    }

    #[test]
    fn test_reader_no_data() {
        let (mut module, mut mcu) = LoopbackTransport::pair();
        assert_eq!(FrameReader::default().read(&mut module), Ok(None));

        mcu.write_all(&[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(FrameReader::default().read(&mut module), Ok(None));
        assert_eq!(module.available(), 0);
    }

    #[test]
    fn test_reader_header_split_across_repeat() {
        // 0x55 0x55 0xAA must still be recognised as a header
        let (mut module, mut mcu) = LoopbackTransport::pair();
        let frame = heartbeat_reply();
        mcu.write_all(&[0x55]).unwrap();
        mcu.write_all(&frame.to_bytes()).unwrap();
        assert_eq!(FrameReader::default().read(&mut module), Ok(Some(frame)));
    }

    #[test]
    fn test_reader_keeps_trailing_input_when_asked() {
        let (mut module, mut mcu) = LoopbackTransport::pair();
        let frame = heartbeat_reply();
        mcu.write_all(&frame.to_bytes()).unwrap();
        mcu.write_all(&frame.to_bytes()).unwrap();

        let reader = FrameReader::new(false);
        assert_eq!(reader.read(&mut module), Ok(Some(frame.clone())));
        assert_eq!(reader.read(&mut module), Ok(Some(frame)));
        assert_eq!(reader.read(&mut module), Ok(None));
    }

    #[test]
    fn test_reader_discards_trailing_input_by_default() {
        let (mut module, mut mcu) = LoopbackTransport::pair();
        let frame = heartbeat_reply();
        mcu.write_all(&frame.to_bytes()).unwrap();
        mcu.write_all(&frame.to_bytes()).unwrap();

        let reader = FrameReader::default();
        assert!(reader.discards_trailing_input());
        assert_eq!(reader.read(&mut module), Ok(Some(frame)));
        assert_eq!(module.available(), 0);
    }

    #[test]
    fn test_reader_truncated_frame() {
        let (mut module, mut mcu) = LoopbackTransport::pair();
        let bytes = heartbeat_reply().to_bytes();
        mcu.write_all(&bytes[..bytes.len() - 1]).unwrap();
        assert_eq!(
            FrameReader::default().read(&mut module),
            Err(ProtocolError::Truncated {
                expected: FRAME_CHECKSUM_LEN,
                actual: 0,
            })
        );
        assert_eq!(module.available(), 0);
    }

    #[test]
    fn test_frame_codec_partial() {
        let mut codec = FrameCodec::new();
        let frame = heartbeat_reply();
        let encoded = frame.to_bytes();

        codec.push(&encoded[..4]);
        assert_eq!(codec.decode(), Ok(None));

        codec.push(&encoded[4..]);
        assert_eq!(codec.decode(), Ok(Some(frame)));
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_frame_codec_multiple_with_garbage() {
        let mut codec = FrameCodec::new();
        let first = heartbeat_reply();
        let second = Frame::new(DeviceType::Mcu, Command::QueryWorkingMode, &[]).unwrap();

        codec.push(&[0x00, 0x55, 0x13]);
        codec.push(&first.to_bytes());
        codec.push(&[0xAA]);
        codec.push(&second.to_bytes());

        assert_eq!(codec.decode_all(), vec![first, second]);
        assert!(codec.decode().unwrap().is_none());
    }

    #[test]
    fn test_frame_codec_checksum_then_recover() {
        let mut codec = FrameCodec::new();
        let good = heartbeat_reply();
        let mut bad = good.to_bytes();
        let last = bad.len() - 1;
        bad[last] ^= 0x01;

        codec.push(&bad);
        codec.push(&good.to_bytes());

        assert!(matches!(codec.decode(), Err(ProtocolError::Checksum { .. })));
        assert_eq!(codec.decode(), Ok(Some(good)));
    }

    #[test]
    fn test_frame_codec_overflow() {
        let mut codec = FrameCodec::new();
        codec.push(&[0x55, 0xAA, 0x03, 0x07, 0x04, 0x01, 0x00]);
        assert_eq!(
            codec.decode(),
            Err(ProtocolError::Overflow {
                max: MAX_PAYLOAD_LEN,
                declared: 0x0401,
            })
        );
        assert_eq!(codec.buffered_len(), 0);
    }
}
