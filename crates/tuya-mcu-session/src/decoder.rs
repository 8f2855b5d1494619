//! Pluggable decoding of datapoint status reports.

use tuya_mcu_protocol::ProtocolError;

/// Interprets the payload of `ReportStatusAsync` and `ReportStatusSync`
/// frames.
///
/// A session is built around one decoder. Returning an error marks the
/// report as rejected; for synchronous reports that decides the
/// `ResponseStatusSync` result sent back to the MCU.
pub trait ReportDecoder: Send {
    fn decode_report(&mut self, payload: &[u8]) -> Result<(), ProtocolError>;
}

/// Decoder that accepts every report without looking at it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllReports;

impl ReportDecoder for AcceptAllReports {
    fn decode_report(&mut self, _payload: &[u8]) -> Result<(), ProtocolError> {
        Ok(())
    }
}

impl<F> ReportDecoder for F
where
    F: FnMut(&[u8]) -> Result<(), ProtocolError> + Send,
{
    fn decode_report(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        self(payload)
    }
}
