//! Typed readings decoded from a full snapshot

use serde::{Deserialize, Serialize};

use crate::metrics::QualityLevel;
use crate::registers::{
    MassDensity, ParticleCount, SHIFT_STATUS_FAN, SHIFT_STATUS_LD, SHIFT_STATUS_PD,
    SHIFT_STATUS_SENSORS, STATUS_MASK,
};
use crate::sensor::SensorReadings;
use crate::snapshot::Snapshot;

/// Number of values a [`Measurement`] contributes to a sample array
pub const MEASUREMENT_VALUES: usize = 10;

/// Level reported by one 2-bit group of the state register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ComponentStatus {
    Normal = 0,
    WithinTolerance = 1,
    Abnormal = 2,
    AbnormalCorrected = 3,
}

impl ComponentStatus {
    /// Convert from a 2-bit group; higher bits are ignored
    pub const fn from_bits(bits: u8) -> Self {
        match bits & STATUS_MASK {
            0 => Self::Normal,
            1 => Self::WithinTolerance,
            2 => Self::Abnormal,
            _ => Self::AbnormalCorrected,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::WithinTolerance => "within tolerance",
            Self::Abnormal => "abnormal",
            Self::AbnormalCorrected => "abnormal (corrected)",
        }
    }
}

/// Contents of the state register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    pub raw: u8,
}

impl Status {
    pub const fn from_byte(raw: u8) -> Self {
        Self { raw }
    }

    pub const fn sensors(self) -> u8 {
        (self.raw >> SHIFT_STATUS_SENSORS) & STATUS_MASK
    }

    /// Photodiode status
    pub const fn pd(self) -> u8 {
        (self.raw >> SHIFT_STATUS_PD) & STATUS_MASK
    }

    /// Laser diode status
    pub const fn ld(self) -> u8 {
        (self.raw >> SHIFT_STATUS_LD) & STATUS_MASK
    }

    pub const fn fan(self) -> u8 {
        (self.raw >> SHIFT_STATUS_FAN) & STATUS_MASK
    }

    pub const fn sensors_status(self) -> ComponentStatus {
        ComponentStatus::from_bits(self.sensors())
    }

    pub const fn pd_status(self) -> ComponentStatus {
        ComponentStatus::from_bits(self.pd())
    }

    pub const fn ld_status(self) -> ComponentStatus {
        ComponentStatus::from_bits(self.ld())
    }

    pub const fn fan_status(self) -> ComponentStatus {
        ComponentStatus::from_bits(self.fan())
    }

    pub const fn is_normal(self) -> bool {
        self.raw == 0
    }
}

/// Every reading of one snapshot.
/// Mass densities are in µg/m³, particle counts are the sensor's raw counts.
/// The `*_raw` fields keep the register values (1/1000 µg/m³) exactly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    pub pm1_0: f32,
    pub pm2_5: f32,
    pub pm10: f32,
    pub pm1_0_raw: u32,
    pub pm2_5_raw: u32,
    pub pm10_raw: u32,
    pub pc0_5: u16,
    pub pc1_0: u16,
    pub pc2_5: u16,
    pub pc5_0: u16,
    pub pc7_5: u16,
    pub pc10: u16,
    pub status: Status,
}

impl Measurement {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            pm1_0: snapshot.mass_density(MassDensity::Pm1_0),
            pm2_5: snapshot.mass_density(MassDensity::Pm2_5),
            pm10: snapshot.mass_density(MassDensity::Pm10),
            pm1_0_raw: snapshot.mass_density_raw(MassDensity::Pm1_0),
            pm2_5_raw: snapshot.mass_density_raw(MassDensity::Pm2_5),
            pm10_raw: snapshot.mass_density_raw(MassDensity::Pm10),
            pc0_5: snapshot.particle_count(ParticleCount::Pc0_5),
            pc1_0: snapshot.particle_count(ParticleCount::Pc1_0),
            pc2_5: snapshot.particle_count(ParticleCount::Pc2_5),
            pc5_0: snapshot.particle_count(ParticleCount::Pc5_0),
            pc7_5: snapshot.particle_count(ParticleCount::Pc7_5),
            pc10: snapshot.particle_count(ParticleCount::Pc10),
            status: Status::from_byte(snapshot.state()),
        }
    }

    pub fn pm2_5_quality(&self) -> QualityLevel {
        QualityLevel::assess_pm2_5(self.pm2_5)
    }

    pub fn pm10_quality(&self) -> QualityLevel {
        QualityLevel::assess_pm10(self.pm10)
    }
}

/// Register values above `i32::MAX` saturate
fn milli(raw: u32) -> i32 {
    i32::try_from(raw).unwrap_or(i32::MAX)
}

impl SensorReadings<MEASUREMENT_VALUES> for Measurement {
    fn to_array(self) -> [i32; MEASUREMENT_VALUES] {
        [
            milli(self.pm1_0_raw),
            milli(self.pm2_5_raw),
            milli(self.pm10_raw),
            self.pc0_5 as i32,
            self.pc1_0 as i32,
            self.pc2_5 as i32,
            self.pc5_0 as i32,
            self.pc7_5 as i32,
            self.pc10 as i32,
            self.status.raw as i32,
        ]
    }
}
