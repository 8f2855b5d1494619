//! Status report decoding for the sensor cluster.

use tracing::{debug, trace};
use tuya_mcu_protocol::{DataType, Datapoint, DatapointHeader, ProtocolError};
use tuya_mcu_session::ReportDecoder;

use crate::datapoints::WaterQualityDp;
use crate::sensor::SensorData;

/// Invoked with the full snapshot after every accepted report.
pub type SensorDataCallback = Box<dyn FnMut(&SensorData) + Send>;

/// Applies datapoint reports to a [`SensorData`] snapshot.
///
/// Each report frame carries one `Value` datapoint. Reports with another type
/// tag or an id outside [`WaterQualityDp`] are rejected and leave the snapshot
/// untouched.
#[derive(Default)]
pub struct WaterQualityDecoder {
    data: SensorData,
    on_sensor_data: Option<SensorDataCallback>,
}

impl WaterQualityDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything decoded so far.
    pub fn sensor_data(&self) -> &SensorData {
        &self.data
    }

    /// Register the sensor data callback, replacing any previous one.
    pub fn on_sensor_data<F>(&mut self, callback: F)
    where
        F: FnMut(&SensorData) + Send + 'static,
    {
        self.on_sensor_data = Some(Box::new(callback));
    }
}

impl ReportDecoder for WaterQualityDecoder {
    fn decode_report(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        let header = DatapointHeader::decode(payload)?;
        if header.data_type != DataType::Value {
            return Err(ProtocolError::UnexpectedDataType {
                expected: DataType::Value,
                actual: header.data_type,
            });
        }
        let dp = WaterQualityDp::try_from(header.id)?;
        let (record, _) = Datapoint::decode(payload)?;
        let raw = record.as_value()?;

        self.data.apply(dp, raw);
        debug!("WaterQuality: {:?} = {}", dp, dp.to_physical(raw));

        match self.on_sensor_data.as_mut() {
            Some(callback) => callback(&self.data),
            None => trace!("WaterQuality: no sensor data callback registered"),
        }
        Ok(())
    }
}

impl std::fmt::Debug for WaterQualityDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterQualityDecoder")
            .field("data", &self.data)
            .field("callback", &self.on_sensor_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_value_type() {
        let mut decoder = WaterQualityDecoder::new();
        let report = Datapoint::boolean(0x08, true).encode();
        assert_eq!(
            decoder.decode_report(&report),
            Err(ProtocolError::UnexpectedDataType {
                expected: DataType::Value,
                actual: DataType::Boolean,
            })
        );
        assert_eq!(decoder.sensor_data(), &SensorData::default());
    }

    #[test]
    fn test_rejects_short_payload() {
        let mut decoder = WaterQualityDecoder::new();
        assert!(matches!(
            decoder.decode_report(&[0x08, 0x02, 0x00, 0x04, 0x00]),
            Err(ProtocolError::PayloadTooShort { .. })
        ));
        assert!(matches!(
            decoder.decode_report(&[]),
            Err(ProtocolError::PayloadTooShort { .. })
        ));
    }

    #[test]
    fn test_threshold_report() {
        let mut decoder = WaterQualityDecoder::new();
        let report = Datapoint::value(0x6C, 650).encode();
        decoder.decode_report(&report).unwrap();
        assert_eq!(decoder.sensor_data().ph.min_threshold, 6.5);
    }
}
