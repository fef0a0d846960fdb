//! SN-GCJA5 register map
//!
//! The sensor exposes its measurement results as a flat block of read-only
//! registers starting at `0x00`. The driver never reads these one at a time;
//! the whole block is fetched in one transaction and the offsets below are
//! used to decode fields out of the cached copy.

// =============================================================================
// I2C Address
// =============================================================================

/// Default 7-bit I2C address of the SN-GCJA5
pub const DEFAULT_ADDRESS: u8 = 0x33;

// =============================================================================
// Register Addresses
// =============================================================================

// Mass density registers (4 bytes, little-endian, 1/1000 µg/m³)
pub const ADDR_PM1_0: u8 = 0x00;
pub const ADDR_PM2_5: u8 = 0x04;
pub const ADDR_PM10: u8 = 0x08;

// Particle count registers (2 bytes, little-endian)
pub const ADDR_PCOUNT_0_5: u8 = 0x0C;
pub const ADDR_PCOUNT_1_0: u8 = 0x0E;
pub const ADDR_PCOUNT_2_5: u8 = 0x10;
pub const ADDR_PCOUNT_5_0: u8 = 0x14;
pub const ADDR_PCOUNT_7_5: u8 = 0x16;
pub const ADDR_PCOUNT_10: u8 = 0x18;

// Status register
pub const ADDR_STATE: u8 = 0x26;

// =============================================================================
// Snapshot Parameters
// =============================================================================

/// First register of the bulk read
pub const SNAPSHOT_BASE: u8 = ADDR_PM1_0;
/// Number of bytes pulled in one bulk read
pub const SNAPSHOT_LEN: usize = 40;

/// Raw mass density registers count in 1/1000 µg/m³
pub const MASS_DENSITY_SCALE: f32 = 1000.0;

// State register bit groups
pub const STATUS_MASK: u8 = 0b11;
pub const SHIFT_STATUS_SENSORS: u8 = 6;
pub const SHIFT_STATUS_PD: u8 = 4;
pub const SHIFT_STATUS_LD: u8 = 2;
pub const SHIFT_STATUS_FAN: u8 = 0;

// =============================================================================
// Field Descriptors
// =============================================================================

/// Width of a register field in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte = 1,
    Word = 2,
    DoubleWord = 4,
}

impl Width {
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

/// Location of a field inside the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub offset: u8,
    pub width: Width,
}

impl FieldDescriptor {
    const fn new(offset: u8, width: Width) -> Self {
        Self { offset, width }
    }
}

/// Every logical reading served from a snapshot.
///
/// The four status groups live in the same byte as [`Field::State`] but are
/// tracked as separate readings, each with its own consumed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Field {
    Pm1_0 = 0,
    Pm2_5,
    Pm10,
    Pc0_5,
    Pc1_0,
    Pc2_5,
    Pc5_0,
    Pc7_5,
    Pc10,
    State,
    StatusSensors,
    StatusPd,
    StatusLd,
    StatusFan,
}

/// All fields, in register order
pub const FIELDS: [Field; 14] = [
    Field::Pm1_0,
    Field::Pm2_5,
    Field::Pm10,
    Field::Pc0_5,
    Field::Pc1_0,
    Field::Pc2_5,
    Field::Pc5_0,
    Field::Pc7_5,
    Field::Pc10,
    Field::State,
    Field::StatusSensors,
    Field::StatusPd,
    Field::StatusLd,
    Field::StatusFan,
];

impl Field {
    pub const fn descriptor(self) -> FieldDescriptor {
        match self {
            Self::Pm1_0 => FieldDescriptor::new(ADDR_PM1_0, Width::DoubleWord),
            Self::Pm2_5 => FieldDescriptor::new(ADDR_PM2_5, Width::DoubleWord),
            Self::Pm10 => FieldDescriptor::new(ADDR_PM10, Width::DoubleWord),
            Self::Pc0_5 => FieldDescriptor::new(ADDR_PCOUNT_0_5, Width::Word),
            Self::Pc1_0 => FieldDescriptor::new(ADDR_PCOUNT_1_0, Width::Word),
            Self::Pc2_5 => FieldDescriptor::new(ADDR_PCOUNT_2_5, Width::Word),
            Self::Pc5_0 => FieldDescriptor::new(ADDR_PCOUNT_5_0, Width::Word),
            Self::Pc7_5 => FieldDescriptor::new(ADDR_PCOUNT_7_5, Width::Word),
            Self::Pc10 => FieldDescriptor::new(ADDR_PCOUNT_10, Width::Word),
            Self::State
            | Self::StatusSensors
            | Self::StatusPd
            | Self::StatusLd
            | Self::StatusFan => FieldDescriptor::new(ADDR_STATE, Width::Byte),
        }
    }

    /// Bit used for this field in the consumed flag set
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pm1_0 => "PM1.0",
            Self::Pm2_5 => "PM2.5",
            Self::Pm10 => "PM10",
            Self::Pc0_5 => "PC0.5",
            Self::Pc1_0 => "PC1.0",
            Self::Pc2_5 => "PC2.5",
            Self::Pc5_0 => "PC5.0",
            Self::Pc7_5 => "PC7.5",
            Self::Pc10 => "PC10",
            Self::State => "STATE",
            Self::StatusSensors => "STATUS_SENSORS",
            Self::StatusPd => "STATUS_PD",
            Self::StatusLd => "STATUS_LD",
            Self::StatusFan => "STATUS_FAN",
        }
    }
}

/// The three mass density readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassDensity {
    Pm1_0,
    Pm2_5,
    Pm10,
}

impl MassDensity {
    pub const fn field(self) -> Field {
        match self {
            Self::Pm1_0 => Field::Pm1_0,
            Self::Pm2_5 => Field::Pm2_5,
            Self::Pm10 => Field::Pm10,
        }
    }
}

/// The six particle count bins, by lower particle diameter in µm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleCount {
    Pc0_5,
    Pc1_0,
    Pc2_5,
    Pc5_0,
    Pc7_5,
    Pc10,
}

impl ParticleCount {
    pub const fn field(self) -> Field {
        match self {
            Self::Pc0_5 => Field::Pc0_5,
            Self::Pc1_0 => Field::Pc1_0,
            Self::Pc2_5 => Field::Pc2_5,
            Self::Pc5_0 => Field::Pc5_0,
            Self::Pc7_5 => Field::Pc7_5,
            Self::Pc10 => Field::Pc10,
        }
    }
}

/// 2-bit groups of the state register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
    /// Overall sensor status, bits [7:6]
    Sensors,
    /// Photodiode, bits [5:4]
    Pd,
    /// Laser diode, bits [3:2]
    Ld,
    /// Fan, bits [1:0]
    Fan,
}

impl StatusGroup {
    pub const fn field(self) -> Field {
        match self {
            Self::Sensors => Field::StatusSensors,
            Self::Pd => Field::StatusPd,
            Self::Ld => Field::StatusLd,
            Self::Fan => Field::StatusFan,
        }
    }

    /// Right shift applied to the state byte
    pub const fn shift(self) -> u8 {
        match self {
            Self::Sensors => SHIFT_STATUS_SENSORS,
            Self::Pd => SHIFT_STATUS_PD,
            Self::Ld => SHIFT_STATUS_LD,
            Self::Fan => SHIFT_STATUS_FAN,
        }
    }
}
