//! In-process stand-in for a water-quality probe.
//!
//! Plays the MCU side of the link on a loopback transport: answers the
//! handshake, reports every datapoint on `QueryDpStatus`, applies threshold
//! commands and echoes them back, and lets the live readings wander a little.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};
use tuya_mcu_protocol::{Command, Datapoint, DeviceType, Frame, FrameCodec, LoopbackTransport};
use tuya_water_quality::WaterQualityDp;

/// Steps between unsolicited reading updates.
const DRIFT_PERIOD: u64 = 8;

// ============================================================================
// Probe
// ============================================================================

/// Simulated MCU driving the peer end of a [`LoopbackTransport`].
pub struct SimulatedProbe {
    link: LoopbackTransport,
    codec: FrameCodec,
    outbox: VecDeque<Frame>,
    /// Wire values indexed like [`WaterQualityDp::ALL`].
    raw: [i32; 9],
    rng: ChaCha8Rng,
    heartbeats_answered: u64,
    steps: u64,
}

impl SimulatedProbe {
    pub fn new(link: LoopbackTransport, seed: u64) -> Self {
        Self {
            link,
            codec: FrameCodec::new(),
            outbox: VecDeque::new(),
            // 24.5 °C in [10, 30], pH 7.20 in [6.00, 8.00], 320 ppm in [100, 1200]
            raw: [245, 300, 100, 720, 800, 600, 320, 1200, 100],
            rng: ChaCha8Rng::seed_from_u64(seed),
            heartbeats_answered: 0,
            steps: 0,
        }
    }

    /// Handle everything the module sent and emit at most one frame.
    ///
    /// The module drops input that trails a frame, so the next frame waits
    /// until the previous one has been read.
    pub fn step(&mut self) {
        self.steps += 1;

        let incoming = self.link.drain();
        if !incoming.is_empty() {
            self.codec.push(&incoming);
            for frame in self.codec.decode_all() {
                self.handle(frame);
            }
        }

        let idle = self.outbox.is_empty();
        if self.steps % DRIFT_PERIOD == 0 && self.heartbeats_answered > 0 && idle {
            self.drift();
        }

        if self.link.unread_by_peer() == 0 {
            if let Some(frame) = self.outbox.pop_front() {
                trace!("Probe: sending {}", frame);
                if let Err(e) = frame.write_to(&mut self.link) {
                    warn!("Probe: write failed: {}", e);
                }
            }
        }
    }

    /// Frames waiting to be sent.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    fn handle(&mut self, frame: Frame) {
        trace!("Probe: received {}", frame);
        match frame.command() {
            Command::Heartbeats => {
                // 0x00 on the first answer after power-up, 0x01 afterwards
                let first = if self.heartbeats_answered == 0 { 0x00 } else { 0x01 };
                self.heartbeats_answered += 1;
                self.queue(Command::Heartbeats, &[first]);
            }
            Command::QueryProductInfo => {
                let info = serde_json::json!({
                    "product_id": "sim-wq01",
                    "version": "1.0.0",
                    "operation_mode": 0,
                });
                self.queue(Command::QueryProductInfo, info.to_string().as_bytes());
            }
            Command::QueryWorkingMode => self.queue(Command::QueryWorkingMode, &[]),
            Command::ReportNetworkStatus => self.queue(Command::ReportNetworkStatus, &[]),
            Command::QueryDpStatus => {
                for index in 0..self.raw.len() {
                    self.report(index);
                }
            }
            Command::SendCommand => self.apply_command(frame.payload()),
            other => debug!("Probe: ignoring {}", other),
        }
    }

    fn apply_command(&mut self, payload: &[u8]) {
        let record = match Datapoint::decode(payload) {
            Ok((record, _)) => record,
            Err(e) => {
                warn!("Probe: malformed command: {}", e);
                return;
            }
        };
        let target = WaterQualityDp::try_from(record.id)
            .ok()
            .filter(|dp| dp.is_threshold())
            .and_then(|dp| WaterQualityDp::ALL.iter().position(|d| *d == dp));
        match (target, record.as_value()) {
            (Some(index), Ok(value)) => {
                self.raw[index] = value;
                self.report(index);
            }
            _ => debug!("Probe: rejecting command for dp 0x{:02X}", record.id),
        }
    }

    fn drift(&mut self) {
        for dp in [WaterQualityDp::Temperature, WaterQualityDp::Ph, WaterQualityDp::Tds] {
            let Some(index) = WaterQualityDp::ALL.iter().position(|d| *d == dp) else {
                continue;
            };
            let step: i32 = self.rng.gen_range(-3..=3);
            self.raw[index] = (self.raw[index] + step).max(0);
            self.report(index);
        }
    }

    fn report(&mut self, index: usize) {
        let dp = WaterQualityDp::ALL[index];
        let payload = Datapoint::value(dp.id(), self.raw[index]).encode();
        self.queue(Command::ReportStatusAsync, &payload);
    }

    fn queue(&mut self, command: Command, payload: &[u8]) {
        match Frame::new(DeviceType::Mcu, command, payload) {
            Ok(frame) => self.outbox.push_back(frame),
            Err(e) => warn!("Probe: cannot build {}: {}", command, e),
        }
    }
}
