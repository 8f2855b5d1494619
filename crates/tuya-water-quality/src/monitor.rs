//! Water-quality sensor cluster on top of a [`Session`].

use tracing::debug;
use tuya_mcu_protocol::{Command, Datapoint, ProtocolError, Transport};
use tuya_mcu_session::{Clock, Session, SessionConfig, SessionError};

use crate::datapoints::{Quantity, WaterQualityDp};
use crate::decoder::WaterQualityDecoder;
use crate::sensor::SensorData;

/// Module side of a water-quality sensor.
///
/// Wraps a [`Session`] whose reports go through [`WaterQualityDecoder`], and
/// adds the threshold commands and typed getters of the sensor.
#[derive(Debug)]
pub struct WaterQualityMonitor {
    session: Session<WaterQualityDecoder>,
}

impl Default for WaterQualityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterQualityMonitor {
    /// Monitor with default session timing.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Monitor with the given session timing.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: Session::with_config(WaterQualityDecoder::new(), config),
        }
    }

    /// Replace the clock of the underlying session.
    pub fn with_clock<C: Clock + 'static>(self, clock: C) -> Self {
        Self {
            session: self.session.with_clock(clock),
        }
    }

    /// Bind the serial link.
    pub fn attach<T: Transport + 'static>(&mut self, transport: T) {
        self.session.attach(transport);
    }

    /// Run one scheduling step of the session.
    pub fn poll(&mut self) {
        self.session.poll();
    }

    /// The underlying session.
    pub fn session(&self) -> &Session<WaterQualityDecoder> {
        &self.session
    }

    /// Mutable access to the underlying session.
    pub fn session_mut(&mut self) -> &mut Session<WaterQualityDecoder> {
        &mut self.session
    }

    /// Register the sensor data callback, replacing any previous one.
    ///
    /// Runs inside [`poll`](Self::poll) after every accepted report.
    pub fn on_sensor_data<F>(&mut self, callback: F)
    where
        F: FnMut(&SensorData) + Send + 'static,
    {
        self.session.decoder_mut().on_sensor_data(callback);
    }

    /// Register the pairing reset callback, replacing any previous one.
    pub fn on_reset_pairing_mode<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.session.on_reset_pairing_mode(callback);
    }

    /// Ask the MCU to report every datapoint.
    pub fn query_status(&mut self) -> Result<(), SessionError> {
        self.session.send_command(Command::QueryDpStatus, &[])
    }

    /// Latest readings and thresholds.
    pub fn sensor_data(&self) -> &SensorData {
        self.session.decoder().sensor_data()
    }

    /// Water temperature in °C.
    pub fn temperature(&self) -> f64 {
        self.sensor_data().temperature.value
    }

    /// pH reading.
    pub fn ph(&self) -> f64 {
        self.sensor_data().ph.value
    }

    /// Total dissolved solids in ppm.
    pub fn tds(&self) -> i32 {
        self.sensor_data().tds.value as i32
    }

    /// High temperature alarm in °C.
    pub fn max_temperature(&self) -> f64 {
        self.sensor_data().temperature.max_threshold
    }

    /// Low temperature alarm in °C.
    pub fn min_temperature(&self) -> f64 {
        self.sensor_data().temperature.min_threshold
    }

    /// High pH alarm.
    pub fn max_ph(&self) -> f64 {
        self.sensor_data().ph.max_threshold
    }

    /// Low pH alarm.
    pub fn min_ph(&self) -> f64 {
        self.sensor_data().ph.min_threshold
    }

    /// High TDS alarm in ppm.
    pub fn max_tds(&self) -> i32 {
        self.sensor_data().tds.max_threshold as i32
    }

    /// Low TDS alarm in ppm.
    pub fn min_tds(&self) -> i32 {
        self.sensor_data().tds.min_threshold as i32
    }

    /// Program the high temperature alarm in °C.
    pub fn set_max_temperature(&mut self, celsius: f64) -> Result<(), SessionError> {
        self.set_scaled_threshold(WaterQualityDp::HighTemperatureThreshold, celsius)
    }

    /// Program the low temperature alarm in °C.
    pub fn set_min_temperature(&mut self, celsius: f64) -> Result<(), SessionError> {
        self.set_scaled_threshold(WaterQualityDp::LowTemperatureThreshold, celsius)
    }

    /// Program the high pH alarm.
    pub fn set_max_ph(&mut self, ph: f64) -> Result<(), SessionError> {
        self.set_scaled_threshold(WaterQualityDp::HighPhThreshold, ph)
    }

    /// Program the low pH alarm.
    pub fn set_min_ph(&mut self, ph: f64) -> Result<(), SessionError> {
        self.set_scaled_threshold(WaterQualityDp::LowPhThreshold, ph)
    }

    /// Program the high TDS alarm in ppm.
    pub fn set_max_tds(&mut self, ppm: i32) -> Result<(), SessionError> {
        self.set_threshold(WaterQualityDp::HighTdsThreshold, ppm)
    }

    /// Program the low TDS alarm in ppm.
    pub fn set_min_tds(&mut self, ppm: i32) -> Result<(), SessionError> {
        self.set_threshold(WaterQualityDp::LowTdsThreshold, ppm)
    }

    /// Program a temperature or pH threshold given in physical units.
    pub fn set_scaled_threshold(&mut self, dp: WaterQualityDp, value: f64) -> Result<(), SessionError> {
        if !dp.is_threshold() || dp.quantity() == Quantity::Tds {
            return Err(ProtocolError::InvalidData(format!(
                "{:?} is not a scaled threshold",
                dp
            ))
            .into());
        }
        self.set_threshold(dp, dp.to_raw(value))
    }

    /// Program any threshold with its wire integer.
    ///
    /// The MCU is expected to echo the new value in a status report; nothing
    /// is stored locally until it does.
    pub fn set_threshold(&mut self, dp: WaterQualityDp, raw: i32) -> Result<(), SessionError> {
        if !dp.is_threshold() {
            return Err(ProtocolError::InvalidData(format!("{:?} is read-only", dp)).into());
        }
        let payload = Datapoint::value(dp.id(), raw).encode();
        debug!("WaterQuality: set {:?} to {}", dp, raw);
        self.session.send_command(Command::SendCommand, &payload)
    }
}
