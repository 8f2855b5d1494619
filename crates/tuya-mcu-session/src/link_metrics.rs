//! Link metrics.
//!
//! Counters are emitted through the `metrics` facade; with no recorder
//! installed they cost nothing. Call [`describe_metrics`] once at startup to
//! register descriptions with whatever recorder the host installs.

use metrics::{describe_counter, Unit};

/// A counter declaration with its metadata.
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    /// The metric name (e.g., "tuya.link.frames_received").
    pub name: &'static str,
    /// Human-readable description of the metric.
    pub description: &'static str,
}

impl Metric {
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            description: "",
        }
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    pub fn describe(&self) {
        describe_counter!(self.name, Unit::Count, self.description);
    }

    pub(crate) fn increment(&self) {
        metrics::counter!(self.name).increment(1);
    }
}

/// All metrics emitted by the session.
pub mod metric_defs {
    use super::Metric;

    pub const FRAMES_RECEIVED: Metric = Metric::counter("tuya.link.frames_received")
        .with_description("Valid frames read from the transport");
    pub const FRAMES_SENT: Metric = Metric::counter("tuya.link.frames_sent")
        .with_description("Frames written to the transport");
    pub const CHECKSUM_ERRORS: Metric = Metric::counter("tuya.link.checksum_errors")
        .with_description("Frames dropped for a checksum mismatch");
    pub const OVERFLOWS: Metric = Metric::counter("tuya.link.overflows")
        .with_description("Frames dropped for declaring an oversized payload");
    pub const TRUNCATED: Metric = Metric::counter("tuya.link.truncated")
        .with_description("Frames cut short by the transport");
    pub const UNKNOWN_COMMANDS: Metric = Metric::counter("tuya.link.unknown_commands")
        .with_description("Frames carrying a command without a handler");
    pub const DECODE_FAILURES: Metric = Metric::counter("tuya.link.decode_failures")
        .with_description("Frames whose payload could not be decoded");

    pub const ALL: &[Metric] = &[
        FRAMES_RECEIVED,
        FRAMES_SENT,
        CHECKSUM_ERRORS,
        OVERFLOWS,
        TRUNCATED,
        UNKNOWN_COMMANDS,
        DECODE_FAILURES,
    ];
}

/// Describes all metrics used by the session.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
