//! Handshake progress and link statistics.

use serde::Serialize;
use tuya_mcu_protocol::{NetworkStatus, ProductInfo};

/// What the module knows about the MCU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    pub(crate) product_info: ProductInfo,
    pub(crate) network_status: NetworkStatus,
    pub(crate) heartbeats_received: bool,
    pub(crate) product_info_received: bool,
    pub(crate) working_mode_received: bool,
}

impl ModuleInfo {
    /// Product info from the last successful `QueryProductInfo` reply.
    pub fn product_info(&self) -> &ProductInfo {
        &self.product_info
    }

    /// Network status the module reports to the MCU.
    pub fn network_status(&self) -> NetworkStatus {
        self.network_status
    }

    /// The MCU has answered a heartbeat.
    pub fn heartbeats_received(&self) -> bool {
        self.heartbeats_received
    }

    /// The MCU has sent valid product info.
    pub fn product_info_received(&self) -> bool {
        self.product_info_received
    }

    /// The MCU has answered a working mode query.
    pub fn working_mode_received(&self) -> bool {
        self.working_mode_received
    }

    /// All three handshake steps are done.
    pub fn initialized(&self) -> bool {
        self.heartbeats_received && self.product_info_received && self.working_mode_received
    }

    /// Handshake progress as a single state.
    pub fn handshake_state(&self) -> HandshakeState {
        if self.initialized() {
            HandshakeState::Ready
        } else if self.heartbeats_received && self.product_info_received {
            HandshakeState::ProductInfoAcquired
        } else if self.heartbeats_received {
            HandshakeState::HeartbeatAcquired
        } else {
            HandshakeState::Cold
        }
    }
}

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HandshakeState {
    /// Nothing heard from the MCU yet.
    Cold,
    /// The MCU answers heartbeats.
    HeartbeatAcquired,
    /// Product info received.
    ProductInfoAcquired,
    /// Working mode received as well; the link is up.
    Ready,
}

impl std::fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandshakeState::Cold => "cold",
            HandshakeState::HeartbeatAcquired => "heartbeat acquired",
            HandshakeState::ProductInfoAcquired => "product info acquired",
            HandshakeState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Counters for what crossed the link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Frames that passed the checksum.
    pub frames_received: u64,
    /// Frames written to the transport.
    pub frames_sent: u64,
    /// Frames dropped on checksum mismatch.
    pub checksum_errors: u64,
    /// Frames dropped for declaring an oversize payload.
    pub overflows: u64,
    /// Frames cut short by the link.
    pub truncated: u64,
    /// Valid frames with no handler.
    pub unknown_commands: u64,
    /// Product info or reports a handler could not decode.
    pub decode_failures: u64,
}

impl LinkStats {
    /// Total receive-side errors.
    pub fn receive_errors(&self) -> u64 {
        self.checksum_errors + self.overflows + self.truncated
    }
}
