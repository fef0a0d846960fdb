//! Driver configuration
//!
//! Plain serde data, so it can be stored next to other settings or filled from
//! the environment by a host binary.

use serde::{Deserialize, Serialize};

use crate::registers::DEFAULT_ADDRESS;

/// The sensor updates its registers once per second
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SensorConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Delay between snapshot reads
    pub sample_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        }
    }
}
