//! Air quality assessment for particle matter readings
//!
//! Thresholds follow the US EPA AQI breakpoints for 24-hour PM2.5 and PM10
//! concentrations, collapsed into four levels.

use serde::{Deserialize, Serialize};

/// Quality level assessment for particle matter readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    /// Clean air
    Excellent,
    /// Acceptable air
    Good,
    /// Unhealthy for sensitive groups
    Poor,
    /// Unhealthy
    Bad,
}

impl QualityLevel {
    /// Assess a PM2.5 mass density in µg/m³
    ///
    /// Excellent: ≤ 12.0, Good: ≤ 35.4, Poor: ≤ 55.4, Bad: above
    pub fn assess_pm2_5(value: f32) -> Self {
        Self::grade(value, [12.0, 35.4, 55.4])
    }

    /// Assess a PM10 mass density in µg/m³
    ///
    /// Excellent: ≤ 54, Good: ≤ 154, Poor: ≤ 254, Bad: above
    pub fn assess_pm10(value: f32) -> Self {
        Self::grade(value, [54.0, 154.0, 254.0])
    }

    fn grade(value: f32, [excellent, good, poor]: [f32; 3]) -> Self {
        if value <= excellent {
            Self::Excellent
        } else if value <= good {
            Self::Good
        } else if value <= poor {
            Self::Poor
        } else {
            Self::Bad
        }
    }

    /// Get the display label for this quality level
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Poor => "Poor",
            Self::Bad => "Bad",
        }
    }
}
