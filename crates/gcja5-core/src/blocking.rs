//! Blocking SN-GCJA5 driver

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::error::Error;
use crate::measurement::Measurement;
use crate::registers::{
    DEFAULT_ADDRESS, Field, MassDensity, ParticleCount, SNAPSHOT_BASE, StatusGroup,
};
use crate::snapshot::{Snapshot, SnapshotCache};

/// SN-GCJA5 particle sensor driver with a blocking I2C interface.
///
/// The sensor locks up (holding SCL low) when hit with many short
/// transactions, so every register is fetched in one 40-byte read and the
/// getters decode from that cached snapshot. Each getter refreshes the
/// snapshot only when its own field was already served from it; reading every
/// field once per cycle costs a single bus transaction.
///
/// Getters never fail. If the refresh they trigger fails, they decode the
/// zeroed buffer; use [`measure`](Self::measure) or check
/// [`last_refresh_failed`](Self::last_refresh_failed) to tell the two apart.
pub struct SnGcja5<I2C> {
    i2c: I2C,
    address: u8,
    cache: SnapshotCache,
}

impl<I2C> SnGcja5<I2C>
where
    I2C: I2c,
{
    /// Create a driver at the default address (`0x33`)
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a driver for a sensor behind an address translator or a
    /// non-default strap. No bus traffic happens until the first read.
    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            cache: SnapshotCache::new(),
        }
    }

    /// Give back the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// 7-bit address this driver talks to
    pub fn address(&self) -> u8 {
        self.address
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    /// Check that the sensor answers on the bus
    pub fn begin(&mut self) -> Result<(), Error<I2C::Error>> {
        self.probe()
    }

    /// True when the sensor acknowledges its address
    pub fn is_connected(&mut self) -> bool {
        self.probe().is_ok()
    }

    /// Zero-length write: succeeds when the sensor acknowledges its address
    fn probe(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.address, &[])?;
        Ok(())
    }

    /// Read a single register directly, bypassing the snapshot.
    ///
    /// Meant for diagnostics only; regular reads should go through the
    /// snapshot so the sensor is not flooded with short transactions.
    pub fn test_register(&mut self, addr: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[addr], &mut buf)?;
        debug!("SN-GCJA5 register {:#04x} = {:#04x}", addr, buf[0]);
        Ok(buf[0])
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Replace the snapshot with a fresh bulk read.
    ///
    /// On success every field becomes servable again. On failure the snapshot
    /// is left zeroed and the consumed flags are untouched.
    pub fn refresh(&mut self) -> Result<(), Error<I2C::Error>> {
        let buf = self.cache.begin_refresh();
        match self.i2c.write_read(self.address, &[SNAPSHOT_BASE], buf) {
            Ok(()) => {
                self.cache.commit_refresh();
                debug!("SN-GCJA5 snapshot refreshed");
                Ok(())
            }
            Err(e) => {
                self.cache.fail_refresh();
                Err(e.into())
            }
        }
    }

    /// Refresh once and decode every field, propagating bus errors.
    ///
    /// All fields are marked consumed afterwards, so the next getter call
    /// starts a new snapshot.
    pub fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        self.refresh()?;
        Ok(Measurement::from_snapshot(self.cache.consume_all()))
    }

    /// Whether the most recent refresh failed
    pub fn last_refresh_failed(&self) -> bool {
        self.cache.last_refresh_failed()
    }

    /// Current snapshot, without touching any consumed flag
    pub fn snapshot(&self) -> &Snapshot {
        self.cache.snapshot()
    }

    /// Snapshot bookkeeping, for inspecting the consumed flags
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    fn serve(&mut self, field: Field) -> &Snapshot {
        if self.cache.needs_refresh(field) {
            if let Err(e) = self.refresh() {
                warn!("SN-GCJA5 refresh for {} failed: {:?}", field.name(), e);
            }
        }
        self.cache.consume(field)
    }

    fn mass(&mut self, reading: MassDensity) -> f32 {
        self.serve(reading.field()).mass_density(reading)
    }

    fn count(&mut self, reading: ParticleCount) -> u16 {
        self.serve(reading.field()).particle_count(reading)
    }

    fn group(&mut self, group: StatusGroup) -> u8 {
        self.serve(group.field()).status(group)
    }

    // =========================================================================
    // Mass Density (µg/m³)
    // =========================================================================

    /// PM1.0 mass density
    pub fn pm1_0(&mut self) -> f32 {
        self.mass(MassDensity::Pm1_0)
    }

    /// PM2.5 mass density
    pub fn pm2_5(&mut self) -> f32 {
        self.mass(MassDensity::Pm2_5)
    }

    /// PM10 mass density
    pub fn pm10(&mut self) -> f32 {
        self.mass(MassDensity::Pm10)
    }

    // =========================================================================
    // Particle Count
    // =========================================================================

    /// Count of particles 0.3 to 0.5 µm
    pub fn pc0_5(&mut self) -> u16 {
        self.count(ParticleCount::Pc0_5)
    }

    /// Count of particles 0.5 to 1.0 µm
    pub fn pc1_0(&mut self) -> u16 {
        self.count(ParticleCount::Pc1_0)
    }

    /// Count of particles 1.0 to 2.5 µm
    pub fn pc2_5(&mut self) -> u16 {
        self.count(ParticleCount::Pc2_5)
    }

    /// Count of particles 2.5 to 5.0 µm
    pub fn pc5_0(&mut self) -> u16 {
        self.count(ParticleCount::Pc5_0)
    }

    /// Count of particles 5.0 to 7.5 µm
    pub fn pc7_5(&mut self) -> u16 {
        self.count(ParticleCount::Pc7_5)
    }

    /// Count of particles 7.5 to 10 µm
    pub fn pc10(&mut self) -> u16 {
        self.count(ParticleCount::Pc10)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Raw state register
    pub fn state(&mut self) -> u8 {
        self.serve(Field::State).state()
    }

    /// Overall sensor status, state bits [7:6]
    pub fn status_sensors(&mut self) -> u8 {
        self.group(StatusGroup::Sensors)
    }

    /// Photodiode status, state bits [5:4]
    pub fn status_pd(&mut self) -> u8 {
        self.group(StatusGroup::Pd)
    }

    /// Laser diode status, state bits [3:2]
    pub fn status_ld(&mut self) -> u8 {
        self.group(StatusGroup::Ld)
    }

    /// Fan status, state bits [1:0]
    pub fn status_fan(&mut self) -> u8 {
        self.group(StatusGroup::Fan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::FIELDS;
    use crate::sensor::SensorReadings;
    use crate::testing::{FakeBus, sample_registers};

    fn driver() -> SnGcja5<FakeBus> {
        SnGcja5::new(FakeBus::with_registers(sample_registers()))
    }

    fn read_field(sensor: &mut SnGcja5<FakeBus>, field: Field) {
        match field {
            Field::Pm1_0 => {
                let _ = sensor.pm1_0();
            }
            Field::Pm2_5 => {
                let _ = sensor.pm2_5();
            }
            Field::Pm10 => {
                let _ = sensor.pm10();
            }
            Field::Pc0_5 => {
                let _ = sensor.pc0_5();
            }
            Field::Pc1_0 => {
                let _ = sensor.pc1_0();
            }
            Field::Pc2_5 => {
                let _ = sensor.pc2_5();
            }
            Field::Pc5_0 => {
                let _ = sensor.pc5_0();
            }
            Field::Pc7_5 => {
                let _ = sensor.pc7_5();
            }
            Field::Pc10 => {
                let _ = sensor.pc10();
            }
            Field::State => {
                let _ = sensor.state();
            }
            Field::StatusSensors => {
                let _ = sensor.status_sensors();
            }
            Field::StatusPd => {
                let _ = sensor.status_pd();
            }
            Field::StatusLd => {
                let _ = sensor.status_ld();
            }
            Field::StatusFan => {
                let _ = sensor.status_fan();
            }
        }
    }

    fn bulk_reads(sensor: &SnGcja5<FakeBus>) -> usize {
        sensor.i2c.bulk_reads
    }

    #[test]
    fn test_getters_decode_register_map() {
        let mut sensor = driver();
        assert_eq!(sensor.pm1_0(), 1.0);
        assert_eq!(sensor.pm2_5(), 12.345);
        assert_eq!(sensor.pm10(), 250.0);
        assert_eq!(sensor.pc0_5(), 805);
        assert_eq!(sensor.pc1_0(), 310);
        assert_eq!(sensor.pc2_5(), 42);
        assert_eq!(sensor.pc5_0(), 7);
        assert_eq!(sensor.pc7_5(), 3);
        assert_eq!(sensor.pc10(), 1);
        assert_eq!(sensor.state(), 0b1011_0001);
        assert_eq!(sensor.status_sensors(), 2);
        assert_eq!(sensor.status_pd(), 3);
        assert_eq!(sensor.status_ld(), 0);
        assert_eq!(sensor.status_fan(), 1);
        assert_eq!(bulk_reads(&sensor), 1);
    }

    #[test]
    fn test_first_read_of_any_field_refreshes() {
        for field in FIELDS {
            let mut sensor = driver();
            read_field(&mut sensor, field);
            assert_eq!(bulk_reads(&sensor), 1, "first read of {}", field.name());
        }
    }

    #[test]
    fn test_full_cycle_costs_one_refresh() {
        let mut sensor = driver();
        // reverse order, to show order does not matter
        for field in FIELDS.iter().rev() {
            read_field(&mut sensor, *field);
        }
        assert_eq!(bulk_reads(&sensor), 1);
        assert_eq!(sensor.cache().flags(), crate::snapshot::ConsumedFlags::all());

        for field in FIELDS {
            read_field(&mut sensor, field);
        }
        assert_eq!(bulk_reads(&sensor), 2);
    }

    #[test]
    fn test_rereading_a_field_forces_refresh() {
        for field in FIELDS {
            let mut sensor = driver();
            read_field(&mut sensor, field);
            assert!(sensor.cache().needs_refresh(field));
            read_field(&mut sensor, field);
            assert_eq!(bulk_reads(&sensor), 2, "re-read of {}", field.name());
        }
    }

    #[test]
    fn test_refresh_clears_every_flag() {
        let mut sensor = driver();
        sensor.pm2_5();
        sensor.status_fan();
        sensor.refresh().unwrap();
        assert!(sensor.cache().flags().is_fresh());
    }

    #[test]
    fn test_status_group_flags_are_independent_of_state() {
        let mut sensor = driver();
        sensor.state();
        sensor.status_sensors();
        sensor.status_pd();
        sensor.status_ld();
        sensor.status_fan();
        assert_eq!(bulk_reads(&sensor), 1);

        sensor.status_pd();
        assert_eq!(bulk_reads(&sensor), 2);
    }

    #[test]
    fn test_refresh_picks_up_new_values() {
        let mut sensor = driver();
        assert_eq!(sensor.pc2_5(), 42);
        sensor.i2c.registers[0x10] = 43;
        // pc1_0 is still servable from the old snapshot
        assert_eq!(sensor.pc1_0(), 310);
        assert_eq!(sensor.pc2_5(), 43);
    }

    #[test]
    fn test_failed_refresh_serves_zeroes() {
        let mut sensor = driver();
        sensor.i2c.nack = true;

        assert_eq!(sensor.pm2_5(), 0.0);
        assert_eq!(sensor.pc0_5(), 0);
        assert!(sensor.last_refresh_failed());
        assert_eq!(sensor.snapshot(), &Snapshot::zeroed());

        sensor.i2c.nack = false;
        assert_eq!(sensor.pm2_5(), 12.345);
        assert!(!sensor.last_refresh_failed());
    }

    #[test]
    fn test_failed_refresh_discards_partial_data() {
        let mut sensor = driver();
        assert_eq!(sensor.pm1_0(), 1.0);

        sensor.i2c.garble_reads = true;
        let err = sensor.refresh().unwrap_err();
        assert!(matches!(err, Error::I2c(_)));
        assert_eq!(sensor.snapshot(), &Snapshot::zeroed());
        // PM1.0 was consumed before the failure and stays consumed
        assert!(sensor.cache().needs_refresh(Field::Pm1_0));
    }

    #[test]
    fn test_measure_propagates_errors() {
        let mut sensor = driver();
        sensor.i2c.nack = true;
        assert!(matches!(sensor.measure(), Err(Error::NoAcknowledge)));
    }

    #[test]
    fn test_measure_decodes_and_consumes_everything() {
        let mut sensor = driver();
        let m = sensor.measure().unwrap();
        assert_eq!(m.pm10, 250.0);
        assert_eq!(m.pc0_5, 805);
        assert_eq!(m.status.pd(), 3);
        assert_eq!(bulk_reads(&sensor), 1);

        sensor.pm1_0();
        assert_eq!(bulk_reads(&sensor), 2);
    }

    #[test]
    fn test_is_connected() {
        let mut sensor = driver();
        assert!(sensor.is_connected());
        assert!(sensor.begin().is_ok());
        assert_eq!(sensor.i2c.probes, 2);
        assert_eq!(sensor.i2c.bulk_reads, 0);

        sensor.i2c.nack = true;
        assert!(!sensor.is_connected());
        assert!(matches!(sensor.begin(), Err(Error::NoAcknowledge)));
    }

    #[test]
    fn test_wrong_address_is_not_connected() {
        let mut sensor = SnGcja5::with_address(FakeBus::new(), 0x34);
        assert!(!sensor.is_connected());
        assert_eq!(sensor.address(), 0x34);
    }

    #[test]
    fn test_register_probe_bypasses_snapshot() {
        let mut sensor = driver();
        assert_eq!(sensor.test_register(0x26).unwrap(), 0b1011_0001);
        assert_eq!(sensor.test_register(0x0C).unwrap(), 0x25);
        assert_eq!(sensor.i2c.register_reads, 2);
        assert_eq!(sensor.i2c.bulk_reads, 0);
        assert!(sensor.cache().needs_refresh(Field::State));

        sensor.i2c.nack = true;
        assert!(matches!(sensor.test_register(0x26), Err(Error::NoAcknowledge)));
    }

    #[test]
    fn test_release_returns_bus() {
        let mut sensor = driver();
        sensor.pm1_0();
        let bus = sensor.release();
        assert_eq!(bus.transactions(), 1);
    }

    #[test]
    fn test_measure_exports_exact_milli_units() {
        let mut registers = sample_registers();
        registers[0x08..0x0C].copy_from_slice(&16_777_217u32.to_le_bytes());
        let mut sensor = SnGcja5::new(FakeBus::with_registers(registers));

        let m = sensor.measure().unwrap();
        assert_eq!(m.pm10_raw, 16_777_217);
        assert_eq!(m.to_array()[2], 16_777_217);
    }
}
