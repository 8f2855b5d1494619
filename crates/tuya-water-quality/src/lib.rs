//! Tuya Water-Quality Sensor
//!
//! Device extension for a water-quality sensor cluster (temperature, pH and
//! total dissolved solids) speaking the Tuya MCU protocol. Readings and
//! alarm thresholds travel as 32-bit `Value` datapoints with fixed scaling:
//!
//! | Quantity | Unit | Wire scale |
//! |---|---|---|
//! | Temperature | °C | ×10 |
//! | pH | - | ×100 |
//! | TDS | ppm | ×1 |
//!
//! # Example
//!
//! ```rust
//! use tuya_mcu_protocol::LoopbackTransport;
//! use tuya_mcu_session::{ManualClock, SessionConfig};
//! use tuya_water_quality::WaterQualityMonitor;
//!
//! let (module, _mcu) = LoopbackTransport::pair();
//! let mut monitor = WaterQualityMonitor::with_config(SessionConfig::immediate())
//!     .with_clock(ManualClock::new());
//! monitor.attach(module);
//! monitor.on_sensor_data(|data| println!("{:.1} °C", data.temperature.value));
//! monitor.set_max_temperature(28.5).unwrap();
//! monitor.poll();
//! ```

mod datapoints;
mod decoder;
mod monitor;
mod sensor;

pub use datapoints::*;
pub use decoder::*;
pub use monitor::*;
pub use sensor::*;
