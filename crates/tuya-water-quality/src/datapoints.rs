//! Datapoint ids of the water-quality sensor cluster.

use tuya_mcu_protocol::ProtocolError;

/// Measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Water temperature in °C, transmitted ×10.
    Temperature,
    /// pH, transmitted ×100.
    Ph,
    /// Total dissolved solids in ppm, transmitted unscaled.
    Tds,
}

impl Quantity {
    /// Factor between the physical value and its wire integer.
    pub fn divisor(self) -> f64 {
        match self {
            Quantity::Temperature => 10.0,
            Quantity::Ph => 100.0,
            Quantity::Tds => 1.0,
        }
    }
}

/// Which part of a [`SensorValue`](crate::SensorValue) a datapoint carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Value,
    MaxThreshold,
    MinThreshold,
}

/// Datapoint ids reported and accepted by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterQualityDp {
    Temperature,
    HighTemperatureThreshold,
    LowTemperatureThreshold,
    Ph,
    HighPhThreshold,
    LowPhThreshold,
    Tds,
    HighTdsThreshold,
    LowTdsThreshold,
}

impl WaterQualityDp {
    /// Every datapoint, in id order.
    pub const ALL: [WaterQualityDp; 9] = [
        WaterQualityDp::Temperature,
        WaterQualityDp::HighTemperatureThreshold,
        WaterQualityDp::LowTemperatureThreshold,
        WaterQualityDp::Ph,
        WaterQualityDp::HighPhThreshold,
        WaterQualityDp::LowPhThreshold,
        WaterQualityDp::Tds,
        WaterQualityDp::HighTdsThreshold,
        WaterQualityDp::LowTdsThreshold,
    ];

    /// Wire identifier.
    pub fn id(self) -> u8 {
        match self {
            WaterQualityDp::Temperature => 0x08,
            WaterQualityDp::HighTemperatureThreshold => 0x66,
            WaterQualityDp::LowTemperatureThreshold => 0x67,
            WaterQualityDp::Ph => 0x6A,
            WaterQualityDp::HighPhThreshold => 0x6B,
            WaterQualityDp::LowPhThreshold => 0x6C,
            WaterQualityDp::Tds => 0x6F,
            WaterQualityDp::HighTdsThreshold => 0x70,
            WaterQualityDp::LowTdsThreshold => 0x71,
        }
    }

    /// Quantity the datapoint measures.
    pub fn quantity(self) -> Quantity {
        match self {
            WaterQualityDp::Temperature
            | WaterQualityDp::HighTemperatureThreshold
            | WaterQualityDp::LowTemperatureThreshold => Quantity::Temperature,
            WaterQualityDp::Ph | WaterQualityDp::HighPhThreshold | WaterQualityDp::LowPhThreshold => {
                Quantity::Ph
            }
            WaterQualityDp::Tds
            | WaterQualityDp::HighTdsThreshold
            | WaterQualityDp::LowTdsThreshold => Quantity::Tds,
        }
    }

    /// Reading or threshold slot it fills.
    pub fn field(self) -> Field {
        match self {
            WaterQualityDp::Temperature | WaterQualityDp::Ph | WaterQualityDp::Tds => Field::Value,
            WaterQualityDp::HighTemperatureThreshold
            | WaterQualityDp::HighPhThreshold
            | WaterQualityDp::HighTdsThreshold => Field::MaxThreshold,
            WaterQualityDp::LowTemperatureThreshold
            | WaterQualityDp::LowPhThreshold
            | WaterQualityDp::LowTdsThreshold => Field::MinThreshold,
        }
    }

    /// Whether the module may write this datapoint.
    pub fn is_threshold(self) -> bool {
        self.field() != Field::Value
    }

    /// Convert a wire integer to its physical value.
    pub fn to_physical(self, raw: i32) -> f64 {
        f64::from(raw) / self.quantity().divisor()
    }

    /// Convert a physical value to the nearest wire integer.
    ///
    /// Saturates at the `i32` range.
    pub fn to_raw(self, value: f64) -> i32 {
        (value * self.quantity().divisor()).round() as i32
    }
}

impl TryFrom<u8> for WaterQualityDp {
    type Error = ProtocolError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        WaterQualityDp::ALL
            .into_iter()
            .find(|dp| dp.id() == id)
            .ok_or(ProtocolError::UnknownDatapoint(id))
    }
}

impl From<WaterQualityDp> for u8 {
    fn from(dp: WaterQualityDp) -> Self {
        dp.id()
    }
}
