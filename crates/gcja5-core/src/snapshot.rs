//! Snapshot cache shared by the blocking and async drivers
//!
//! Holds the last bulk read of the register block together with one
//! "consumed" flag per [`Field`]. A field is served from the cached snapshot
//! until it has been read once; reading it again asks for a fresh snapshot.
//! Refreshing clears every flag at once, so a caller that reads each field
//! once per cycle only costs one bus transaction per cycle.

use crate::registers::{
    ADDR_STATE, Field, MASS_DENSITY_SCALE, MassDensity, ParticleCount, SNAPSHOT_LEN, STATUS_MASK,
    StatusGroup, Width,
};

/// Copy of the sensor's register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    bytes: [u8; SNAPSHOT_LEN],
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Snapshot {
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0; SNAPSHOT_LEN],
        }
    }

    pub const fn from_bytes(bytes: [u8; SNAPSHOT_LEN]) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> &[u8; SNAPSHOT_LEN] {
        &self.bytes
    }

    fn clear(&mut self) {
        self.bytes = [0; SNAPSHOT_LEN];
    }

    /// Raw little-endian value of `field`, widened to `u32`
    pub fn raw(&self, field: Field) -> u32 {
        let d = field.descriptor();
        let at = d.offset as usize;
        let b = &self.bytes;
        match d.width {
            Width::Byte => b[at] as u32,
            Width::Word => u16::from_le_bytes([b[at], b[at + 1]]) as u32,
            Width::DoubleWord => u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]),
        }
    }

    /// Mass density register value, in 1/1000 µg/m³
    pub fn mass_density_raw(&self, reading: MassDensity) -> u32 {
        self.raw(reading.field())
    }

    /// Mass density in µg/m³
    pub fn mass_density(&self, reading: MassDensity) -> f32 {
        self.mass_density_raw(reading) as f32 / MASS_DENSITY_SCALE
    }

    pub fn particle_count(&self, reading: ParticleCount) -> u16 {
        let at = reading.field().descriptor().offset as usize;
        u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]])
    }

    /// Raw state byte
    pub fn state(&self) -> u8 {
        self.bytes[ADDR_STATE as usize]
    }

    /// One 2-bit group of the state byte
    pub fn status(&self, group: StatusGroup) -> u8 {
        (self.state() >> group.shift()) & STATUS_MASK
    }
}

/// One flag per [`Field`], packed into a bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumedFlags(u16);

impl ConsumedFlags {
    const ALL: u16 = (1 << crate::registers::FIELDS.len()) - 1;

    /// Every field marked consumed, so the first read of anything refreshes
    pub const fn all() -> Self {
        Self(Self::ALL)
    }

    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn is_consumed(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub const fn is_fresh(self) -> bool {
        self.0 == 0
    }

    fn consume(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    fn consume_all(&mut self) {
        self.0 = Self::ALL;
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Snapshot buffer plus consumed-flag bookkeeping.
///
/// Bus access stays with the drivers; they call [`begin_refresh`],
/// perform the transfer into the returned buffer, then [`commit_refresh`] or
/// [`fail_refresh`].
///
/// [`begin_refresh`]: SnapshotCache::begin_refresh
/// [`commit_refresh`]: SnapshotCache::commit_refresh
/// [`fail_refresh`]: SnapshotCache::fail_refresh
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    snapshot: Snapshot,
    consumed: ConsumedFlags,
    last_refresh_failed: bool,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    pub const fn new() -> Self {
        Self {
            snapshot: Snapshot::zeroed(),
            consumed: ConsumedFlags::all(),
            last_refresh_failed: false,
        }
    }

    pub fn needs_refresh(&self, field: Field) -> bool {
        self.consumed.is_consumed(field)
    }

    /// Zero the buffer and hand it out to be filled by the bulk read
    pub fn begin_refresh(&mut self) -> &mut [u8; SNAPSHOT_LEN] {
        self.snapshot.clear();
        &mut self.snapshot.bytes
    }

    /// The bulk read succeeded: every field is servable again
    pub fn commit_refresh(&mut self) {
        self.consumed.reset();
        self.last_refresh_failed = false;
    }

    /// The bulk read failed. Whatever the transport wrote is discarded and the
    /// flags are left as they were.
    pub fn fail_refresh(&mut self) {
        self.snapshot.clear();
        self.last_refresh_failed = true;
    }

    /// Mark `field` served and return the snapshot to decode it from
    pub fn consume(&mut self, field: Field) -> &Snapshot {
        self.consumed.consume(field);
        &self.snapshot
    }

    pub fn consume_all(&mut self) -> &Snapshot {
        self.consumed.consume_all();
        &self.snapshot
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn flags(&self) -> ConsumedFlags {
        self.consumed
    }

    pub fn last_refresh_failed(&self) -> bool {
        self.last_refresh_failed
    }
}
