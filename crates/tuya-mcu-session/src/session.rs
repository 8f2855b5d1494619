//! Poll-driven session with the MCU.
//!
//! The session owns the transport and runs the module side of the
//! handshake: heartbeats until the MCU answers, then product info and working
//! mode queries until each has been acknowledged. Every [`Session::poll`]
//! reads at most one frame and dispatches it by command byte.

use std::fmt;
use std::io::Write;

use tracing::{debug, info, trace, warn};
use tuya_mcu_protocol::{
    Command, DeviceType, Frame, FrameReader, NetworkStatus, ProductInfo, ProtocolError, Transport,
    SYNC_REPORT_FAILED, SYNC_REPORT_OK,
};

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::decoder::{AcceptAllReports, ReportDecoder};
use crate::error::SessionError;
use crate::events::{DebugSink, PairingResetCallback};
use crate::link_metrics::metric_defs;
use crate::state::{HandshakeState, LinkStats, ModuleInfo};

/// Module side of a Tuya MCU link.
pub struct Session<D: ReportDecoder = AcceptAllReports> {
    transport: Option<Box<dyn Transport>>,
    clock: Box<dyn Clock>,
    config: SessionConfig,
    reader: FrameReader,
    info: ModuleInfo,
    /// `None` until the first heartbeat goes out.
    last_heartbeat_ms: Option<u64>,
    decoder: D,
    on_reset_pairing_mode: Option<PairingResetCallback>,
    debug: Option<DebugSink>,
    stats: LinkStats,
}

impl<D: ReportDecoder + Default> Default for Session<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: ReportDecoder> Session<D> {
    /// Create a session with default timing and the system clock.
    pub fn new(decoder: D) -> Self {
        Self::with_config(decoder, SessionConfig::default())
    }

    /// Create a session with explicit timing.
    pub fn with_config(decoder: D, config: SessionConfig) -> Self {
        Self {
            transport: None,
            clock: Box::new(SystemClock::new()),
            reader: FrameReader::new(config.discard_trailing_input),
            config,
            info: ModuleInfo::default(),
            last_heartbeat_ms: None,
            decoder,
            on_reset_pairing_mode: None,
            debug: None,
            stats: LinkStats::default(),
        }
    }

    /// Replace the clock.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Bind the transport. Until one is attached, [`poll`](Self::poll) does
    /// nothing and commands fail with [`SessionError::NoTransport`].
    pub fn attach<T: Transport + 'static>(&mut self, transport: T) {
        self.transport = Some(Box::new(transport));
    }

    /// Unbind and return the transport.
    pub fn detach(&mut self) -> Option<Box<dyn Transport>> {
        self.transport.take()
    }

    /// A transport is bound.
    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Run one scheduling step.
    pub fn poll(&mut self) {
        if self.transport.is_none() {
            return;
        }
        let before = self.info.handshake_state();

        let now = self.clock.now_ms();
        if self.heartbeat_due(now) {
            self.last_heartbeat_ms = Some(now);
            self.send_or_log(Command::Heartbeats, &[]);
        }

        if self.info.heartbeats_received && !self.info.product_info_received {
            self.send_or_log(Command::QueryProductInfo, &[]);
            self.clock.sleep(self.config.command_delay_ms);
        }

        if self.info.heartbeats_received && !self.info.working_mode_received {
            self.send_or_log(Command::QueryWorkingMode, &[]);
            self.clock.sleep(self.config.command_delay_ms);
        }

        self.receive();

        let after = self.info.handshake_state();
        if after != before {
            if after == HandshakeState::Ready {
                info!(
                    "Session: MCU ready (product {}, version {})",
                    self.info.product_info.product_id, self.info.product_info.version
                );
            } else {
                debug!("Session: handshake {} -> {}", before, after);
            }
        }

        self.clock.sleep(self.config.poll_delay_ms);
    }

    fn heartbeat_due(&self, now: u64) -> bool {
        match self.last_heartbeat_ms {
            None => true,
            Some(last) => {
                now.saturating_sub(last)
                    > self.config.heartbeat_period_ms(self.info.heartbeats_received)
            }
        }
    }

    fn receive(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        match self.reader.read(transport) {
            Ok(Some(frame)) => {
                self.stats.frames_received += 1;
                metric_defs::FRAMES_RECEIVED.increment();
                self.dispatch(frame);
            }
            Ok(None) => {}
            Err(e) => self.record_receive_error(&e),
        }
    }

    fn record_receive_error(&mut self, error: &ProtocolError) {
        match error {
            ProtocolError::Checksum { .. } => {
                self.stats.checksum_errors += 1;
                metric_defs::CHECKSUM_ERRORS.increment();
            }
            ProtocolError::Overflow { .. } => {
                self.stats.overflows += 1;
                metric_defs::OVERFLOWS.increment();
            }
            ProtocolError::Truncated { .. } => {
                self.stats.truncated += 1;
                metric_defs::TRUNCATED.increment();
            }
            _ => {
                self.stats.decode_failures += 1;
                metric_defs::DECODE_FAILURES.increment();
            }
        }
        debug!("Session: dropped inbound frame: {}", error);
        self.echo(format_args!("Dropped frame: {}", error));
    }

    fn record_decode_failure(&mut self, command: Command, error: &ProtocolError) {
        self.stats.decode_failures += 1;
        metric_defs::DECODE_FAILURES.increment();
        debug!("Session: could not decode {}: {}", command, error);
        self.echo(format_args!("Failed to decode {}: {}", command, error));
    }

    fn dispatch(&mut self, frame: Frame) {
        if let Some(sink) = self.debug.as_mut() {
            sink.frame(&frame);
        }
        trace!("Session: received {}", frame);

        match frame.command() {
            Command::Heartbeats => {
                self.echo(format_args!("Received heartbeats"));
                self.info.heartbeats_received = true;
            }
            Command::QueryProductInfo => {
                self.echo(format_args!("Received query product info"));
                match ProductInfo::from_json(frame.payload()) {
                    Ok(product_info) => {
                        debug!(
                            "Session: product info: id={} version={} mode={}",
                            product_info.product_id,
                            product_info.version,
                            product_info.operation_mode
                        );
                        self.info.product_info = product_info;
                        self.info.product_info_received = true;
                    }
                    Err(e) => self.record_decode_failure(Command::QueryProductInfo, &e),
                }
            }
            Command::QueryWorkingMode => {
                self.echo(format_args!("Received query working mode"));
                self.info.working_mode_received = true;
            }
            Command::ReportNetworkStatus => {
                self.echo(format_args!("Received report network status"));
            }
            Command::ReportStatusAsync => {
                self.echo(format_args!("Received report status"));
                if let Err(e) = self.decoder.decode_report(frame.payload()) {
                    self.record_decode_failure(Command::ReportStatusAsync, &e);
                }
            }
            Command::ReportStatusSync => {
                self.echo(format_args!("Received report status sync"));
                let result = match self.decoder.decode_report(frame.payload()) {
                    Ok(()) => SYNC_REPORT_OK,
                    Err(e) => {
                        self.record_decode_failure(Command::ReportStatusSync, &e);
                        SYNC_REPORT_FAILED
                    }
                };
                self.send_or_log(Command::ResponseStatusSync, &[result]);
            }
            Command::GetCurrentNetworkStatus => {
                self.echo(format_args!("Received get current network status"));
                let status = u8::from(self.info.network_status);
                self.send_or_log(Command::GetCurrentNetworkStatus, &[status]);
            }
            Command::ResetWiFiPairMode => {
                self.echo(format_args!("Received reset WiFi pair mode"));
                match self.on_reset_pairing_mode.as_mut() {
                    Some(callback) => callback(),
                    None => debug!("Session: pairing reset requested, no callback registered"),
                }
            }
            other => {
                self.echo(format_args!("Received unknown command"));
                self.stats.unknown_commands += 1;
                metric_defs::UNKNOWN_COMMANDS.increment();
                debug!("Session: no handler for {}", other);
            }
        }
    }

    /// Encode and send one frame from the module.
    pub fn send_command(&mut self, command: Command, payload: &[u8]) -> Result<(), SessionError> {
        let transport = self.transport.as_mut().ok_or(SessionError::NoTransport)?;
        let frame = Frame::new(DeviceType::Module, command, payload)?;
        frame.write_to(transport)?;

        self.stats.frames_sent += 1;
        metric_defs::FRAMES_SENT.increment();
        trace!("Session: sent {}", frame);
        Ok(())
    }

    fn send_or_log(&mut self, command: Command, payload: &[u8]) {
        if let Err(e) = self.send_command(command, payload) {
            warn!("Session: failed to send {}: {}", command, e);
        }
    }

    fn echo(&mut self, args: fmt::Arguments<'_>) {
        if let Some(sink) = self.debug.as_mut() {
            sink.line(args);
        }
    }

    /// Store the network status and report it to the MCU.
    ///
    /// The status is kept even when sending fails.
    pub fn set_network_status(&mut self, status: NetworkStatus) -> Result<(), SessionError> {
        self.info.network_status = status;
        self.echo(format_args!("Reporting network status"));
        self.send_command(Command::ReportNetworkStatus, &[status.into()])
    }

    /// Last status set with [`set_network_status`](Self::set_network_status).
    pub fn network_status(&self) -> NetworkStatus {
        self.info.network_status
    }

    /// Heartbeat, product info and working mode have all been received.
    pub fn is_initialized(&self) -> bool {
        self.info.initialized()
    }

    /// Product info from the most recent successful decode.
    pub fn product_info(&self) -> &ProductInfo {
        &self.info.product_info
    }

    /// Readiness flags, product info and network status.
    pub fn module_info(&self) -> &ModuleInfo {
        &self.info
    }

    /// Handshake progress derived from the readiness flags.
    pub fn handshake_state(&self) -> HandshakeState {
        self.info.handshake_state()
    }

    /// Snapshot of the link counters.
    pub fn link_stats(&self) -> LinkStats {
        self.stats
    }

    /// Current timing configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sleep after each handshake query.
    pub fn set_command_delay(&mut self, ms: u64) {
        self.config.command_delay_ms = ms;
    }

    /// Sleep at the end of every poll.
    pub fn set_poll_delay(&mut self, ms: u64) {
        self.config.poll_delay_ms = ms;
    }

    /// Echo received frames and handler activity to `out`.
    pub fn enable_debug<W: Write + Send + 'static>(&mut self, out: W) {
        self.debug = Some(DebugSink::new(out));
    }

    /// Stop echoing.
    pub fn disable_debug(&mut self) {
        self.debug = None;
    }

    /// Debug echo is on.
    pub fn debug_enabled(&self) -> bool {
        self.debug.is_some()
    }

    /// Register the pairing reset callback, replacing any previous one.
    pub fn on_reset_pairing_mode<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_reset_pairing_mode = Some(Box::new(callback));
    }

    /// The report decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Mutable access to the report decoder.
    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }
}

impl<D: ReportDecoder + fmt::Debug> fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("attached", &self.is_attached())
            .field("config", &self.config)
            .field("info", &self.info)
            .field("decoder", &self.decoder)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
