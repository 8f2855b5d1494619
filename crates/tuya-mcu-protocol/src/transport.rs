//! Byte transport contract.
//!
//! The protocol never assumes anything about the link beyond byte
//! granularity. A transport is a duplex byte stream that can report how many
//! bytes are waiting, read them one at a time or in bulk, write, push pending
//! output out, and drop unread input.

use std::io;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use parking_lot::Mutex;

/// A duplex byte stream carrying protocol frames.
pub trait Transport: Send {
    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> usize;

    /// Read one byte, or `None` if nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.read_byte() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_all(&[byte])
    }

    /// Write a whole buffer.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Push pending output onto the link.
    fn flush(&mut self) -> io::Result<()>;

    /// Drop every byte of input that has not been read yet.
    fn discard_input(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        (**self).read_bytes(buf)
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn discard_input(&mut self) {
        (**self).discard_input()
    }
}

type SharedBuffer = Arc<Mutex<BytesMut>>;

/// One end of an in-memory duplex link.
///
/// Bytes written on one end become readable on the other. Used for tests and
/// for driving a simulated peripheral in-process.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    rx: SharedBuffer,
    tx: SharedBuffer,
}

impl LoopbackTransport {
    /// Create two connected ends.
    pub fn pair() -> (LoopbackTransport, LoopbackTransport) {
        let a_to_b: SharedBuffer = Arc::new(Mutex::new(BytesMut::new()));
        let b_to_a: SharedBuffer = Arc::new(Mutex::new(BytesMut::new()));
        (
            LoopbackTransport {
                rx: b_to_a.clone(),
                tx: a_to_b.clone(),
            },
            LoopbackTransport {
                rx: a_to_b,
                tx: b_to_a,
            },
        )
    }

    /// Take everything currently readable on this end.
    pub fn drain(&mut self) -> Vec<u8> {
        self.rx.lock().split().to_vec()
    }

    /// Number of bytes written by this end that the peer has not read yet.
    pub fn unread_by_peer(&self) -> usize {
        self.tx.lock().len()
    }
}

impl Transport for LoopbackTransport {
    fn available(&mut self) -> usize {
        self.rx.lock().len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut rx = self.rx.lock();
        if rx.has_remaining() {
            Some(rx.get_u8())
        } else {
            None
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let mut rx = self.rx.lock();
        let count = buf.len().min(rx.len());
        rx.copy_to_slice(&mut buf[..count]);
        count
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.tx.lock().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn discard_input(&mut self) {
        self.rx.lock().clear();
    }
}
