//! UART over TCP.
//!
//! Talks to a serial bridge (ser2net, a simulator UART port, ...) that
//! exposes the MCU link as a raw TCP byte stream.

use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use tracing::{debug, warn};
use tuya_mcu_protocol::Transport;

/// How long a single socket read may wait before reporting no data.
const READ_TIMEOUT: Duration = Duration::from_millis(1);

/// [`Transport`] over a blocking TCP stream.
///
/// `available` only peeks with a short socket timeout. Reads ask for bytes
/// that belong to a frame already started, so they keep waiting for the rest
/// until `frame_timeout` runs out.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    rx: BytesMut,
    frame_timeout: Duration,
    closed: bool,
}

impl TcpTransport {
    /// Connect to a bridge at `host:port`.
    pub fn connect(addr: &str, frame_timeout: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream, frame_timeout)
    }

    pub fn from_stream(stream: TcpStream, frame_timeout: Duration) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(Self {
            stream,
            rx: BytesMut::with_capacity(1024),
            frame_timeout,
            closed: false,
        })
    }

    /// Fill until `want` bytes are buffered, the bridge closes or the frame
    /// timeout expires.
    fn fill_until(&mut self, want: usize) {
        let deadline = Instant::now() + self.frame_timeout;
        while self.rx.len() < want && !self.closed {
            self.fill();
            if self.rx.len() < want && Instant::now() >= deadline {
                debug!(
                    "UART bridge stalled mid-frame: have {} of {} bytes",
                    self.rx.len(),
                    want
                );
                break;
            }
        }
    }

    /// Pull whatever the socket has into the receive buffer.
    fn fill(&mut self) {
        if self.closed {
            return;
        }
        let mut buf = [0u8; 256];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    warn!("UART bridge closed the connection");
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    self.rx.extend_from_slice(&buf[..n]);
                    if n < buf.len() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
                Err(e) => {
                    warn!("UART bridge read failed: {}", e);
                    self.closed = true;
                    break;
                }
            }
        }
    }
}

impl Transport for TcpTransport {
    fn available(&mut self) -> usize {
        if self.rx.is_empty() {
            self.fill();
        }
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.rx.is_empty() {
            self.fill_until(1);
        }
        if self.rx.has_remaining() {
            Some(self.rx.get_u8())
        } else {
            None
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        if self.rx.len() < buf.len() {
            self.fill_until(buf.len());
        }
        let count = buf.len().min(self.rx.len());
        self.rx.copy_to_slice(&mut buf[..count]);
        count
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }

    fn discard_input(&mut self) {
        if !self.rx.is_empty() {
            debug!("discarding {} buffered bytes", self.rx.len());
        }
        self.rx.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use tuya_mcu_protocol::{Command, Datapoint, DeviceType, Frame, FrameReader, ProtocolError};

    fn connected_pair_with(frame_timeout: Duration) -> (TcpTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let transport = TcpTransport::connect(&addr.to_string(), frame_timeout).unwrap();
        let (peer, _) = listener.accept().unwrap();
        (transport, peer)
    }

    fn connected_pair() -> (TcpTransport, TcpStream) {
        connected_pair_with(Duration::from_millis(1000))
    }

    fn read_frame(transport: &mut TcpTransport) -> Result<Frame, ProtocolError> {
        let reader = FrameReader::default();
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(f) = reader.read(transport)? {
                return Ok(f);
            }
            assert!(Instant::now() < deadline, "frame never arrived");
        }
    }

    #[test]
    fn test_frames_cross_the_socket() {
        let (mut transport, mut peer) = connected_pair();

        let frame = Frame::new(DeviceType::Mcu, Command::Heartbeats, &[0x01]).unwrap();
        peer.write_all(&frame.to_bytes()).unwrap();

        assert_eq!(read_frame(&mut transport).unwrap(), frame);

        Frame::empty(DeviceType::Module, Command::Heartbeats)
            .write_to(&mut transport)
            .unwrap();
        let mut buf = [0u8; 7];
        peer.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0x55, 0xAA, 0x00, 0x00, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_peer_close_detected() {
        let (mut transport, peer) = connected_pair();
        drop(peer);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !transport.closed {
            assert_eq!(transport.available(), 0);
            assert!(Instant::now() < deadline, "close never observed");
        }
        assert_eq!(transport.read_byte(), None);
    }

    fn report_bytes() -> (Frame, Vec<u8>) {
        let payload = Datapoint::value(0x08, 200).encode();
        let frame = Frame::new(DeviceType::Mcu, Command::ReportStatusAsync, &payload).unwrap();
        let bytes = frame.to_bytes();
        (frame, bytes)
    }

    #[test]
    fn test_frame_split_across_segments() {
        let (mut transport, mut peer) = connected_pair();
        let (frame, bytes) = report_bytes();
        assert_eq!(bytes.len(), 15);

        let writer = thread::spawn(move || {
            peer.write_all(&bytes[..8]).unwrap();
            peer.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
            peer.write_all(&bytes[8..]).unwrap();
            peer
        });

        assert_eq!(read_frame(&mut transport).unwrap(), frame);
        writer.join().unwrap();
    }

    #[test]
    fn test_stalled_frame_times_out() {
        let (mut transport, mut peer) = connected_pair_with(Duration::from_millis(30));
        let (_, bytes) = report_bytes();
        peer.write_all(&bytes[..8]).unwrap();

        let result = read_frame(&mut transport);
        assert!(matches!(result, Err(ProtocolError::Truncated { .. })), "{:?}", result);
        assert_eq!(transport.available(), 0);
    }
}
