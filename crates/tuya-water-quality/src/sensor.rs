//! Sensor readings and thresholds.

use serde::{Deserialize, Serialize};

use crate::datapoints::{Field, Quantity, WaterQualityDp};

/// A reading and its alarm thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorValue {
    /// Latest reading.
    pub value: f64,
    /// Low alarm threshold.
    pub min_threshold: f64,
    /// High alarm threshold.
    pub max_threshold: f64,
}

impl SensorValue {
    /// Reading lies outside the configured thresholds.
    ///
    /// An unset (zero) threshold pair never alarms.
    pub fn out_of_range(&self) -> bool {
        if self.min_threshold == 0.0 && self.max_threshold == 0.0 {
            return false;
        }
        self.value < self.min_threshold || self.value > self.max_threshold
    }

    fn field_mut(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::Value => &mut self.value,
            Field::MaxThreshold => &mut self.max_threshold,
            Field::MinThreshold => &mut self.min_threshold,
        }
    }
}

/// Latest state of the whole sensor cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// °C.
    pub temperature: SensorValue,
    /// pH units.
    pub ph: SensorValue,
    /// ppm.
    pub tds: SensorValue,
}

impl SensorData {
    /// Values for one quantity.
    pub fn get(&self, quantity: Quantity) -> &SensorValue {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Ph => &self.ph,
            Quantity::Tds => &self.tds,
        }
    }

    fn get_mut(&mut self, quantity: Quantity) -> &mut SensorValue {
        match quantity {
            Quantity::Temperature => &mut self.temperature,
            Quantity::Ph => &mut self.ph,
            Quantity::Tds => &mut self.tds,
        }
    }

    /// Store a reported wire integer in the field the datapoint names.
    pub fn apply(&mut self, dp: WaterQualityDp, raw: i32) {
        *self.get_mut(dp.quantity()).field_mut(dp.field()) = dp.to_physical(raw);
    }
}
