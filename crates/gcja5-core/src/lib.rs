//! Hardware-independent driver for the Panasonic SN-GCJA5 particle sensor
//!
//! The SN-GCJA5 keeps its mass density, particle count and status readings in
//! a 40-byte register block. It does not cope with many short I2C
//! transactions in a row and can lock the bus by holding SCL low, so this
//! crate reads the whole block in one transfer and decodes every reading from
//! that cached snapshot. See [`snapshot`] for the refresh policy.
//!
//! It is `#![no_std]` so it compiles on both embedded targets and desktop
//! hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod r#async;
pub mod blocking;
pub mod config;
pub mod error;
pub mod measurement;
pub mod metrics;
pub mod registers;
pub mod sensor;
pub mod shared;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use blocking::SnGcja5;
pub use config::SensorConfig;
pub use error::Error;
pub use measurement::{ComponentStatus, Measurement, Status};
pub use metrics::QualityLevel;
pub use r#async::SnGcja5Async;
pub use registers::{DEFAULT_ADDRESS, Field, MassDensity, ParticleCount, StatusGroup};
pub use sensor::{IndexedSensor, Sensor, SensorError, SensorReadings};
pub use shared::{SharedSensor, SharedSensorAsync};
