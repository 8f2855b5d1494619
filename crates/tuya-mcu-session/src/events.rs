//! Callback types and the debug echo sink.

use std::fmt;
use std::io::Write;

use tuya_mcu_protocol::Frame;

/// Invoked when the MCU asks the module to reset Wi-Fi pairing.
pub type PairingResetCallback = Box<dyn FnMut() + Send>;

/// Human-readable trace of link traffic written to an arbitrary sink.
///
/// Write failures are swallowed; the echo must never disturb the poll.
pub struct DebugSink {
    out: Box<dyn Write + Send>,
}

impl DebugSink {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self { out: Box::new(out) }
    }

    /// Hex dump of a received frame.
    pub fn frame(&mut self, frame: &Frame) {
        self.line(format_args!(
            "Received frame: {} [{}]",
            hex::encode_upper(frame.to_bytes()),
            frame
        ));
    }

    /// One narrative line.
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        let result = self
            .out
            .write_fmt(args)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::trace!("debug sink write failed: {}", e);
        }
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugSink").finish_non_exhaustive()
    }
}
