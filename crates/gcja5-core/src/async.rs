//! Async SN-GCJA5 driver
//!
//! Same snapshot policy as [`crate::blocking::SnGcja5`], over
//! `embedded_hal_async`. This is the variant that plugs into the
//! [`Sensor`] trait.

use embedded_hal_async::i2c::I2c;
use log::{debug, error, warn};

use crate::error::Error;
use crate::measurement::{MEASUREMENT_VALUES, Measurement};
use crate::registers::{
    DEFAULT_ADDRESS, Field, MassDensity, ParticleCount, SNAPSHOT_BASE, StatusGroup,
};
use crate::sensor::{Sensor, SensorError};
use crate::snapshot::{Snapshot, SnapshotCache};

/// SN-GCJA5 particle sensor driver with an async I2C interface.
///
/// Getters never fail; a failed refresh leaves the snapshot zeroed and is
/// reported by [`last_refresh_failed`](Self::last_refresh_failed).
pub struct SnGcja5Async<I2C> {
    i2c: I2C,
    address: u8,
    cache: SnapshotCache,
}

impl<I2C> SnGcja5Async<I2C>
where
    I2C: I2c,
{
    /// Create a driver at the default address (`0x33`)
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a driver at a custom 7-bit address
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

    /// Check that the sensor answers on the bus
    pub async fn begin(&mut self) -> Result<(), Error<I2C::Error>> {
        self.probe().await
    }

    /// True when the sensor acknowledges its address
    pub async fn is_connected(&mut self) -> bool {
        self.probe().await.is_ok()
    }

    async fn probe(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.address, &[]).await?;
        Ok(())
    }

    /// Diagnostic single register read, bypassing the snapshot
    pub async fn test_register(&mut self, addr: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[addr], &mut buf).await?;
        debug!("SN-GCJA5 register {:#04x} = {:#04x}", addr, buf[0]);
        Ok(buf[0])
    }

    /// Replace the snapshot with a fresh bulk read. On failure the snapshot is
    /// zeroed and the consumed flags are left alone.
    pub async fn refresh(&mut self) -> Result<(), Error<I2C::Error>> {
        let buf = self.cache.begin_refresh();
        match self.i2c.write_read(self.address, &[SNAPSHOT_BASE], buf).await {
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

    /// Refresh once and decode every field; all flags end up consumed
    pub async fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        self.refresh().await?;
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

    async fn serve(&mut self, field: Field) -> &Snapshot {
        if self.cache.needs_refresh(field) {
            if let Err(e) = self.refresh().await {
                warn!("SN-GCJA5 refresh for {} failed: {:?}", field.name(), e);
            }
        }
        self.cache.consume(field)
    }

    async fn mass(&mut self, reading: MassDensity) -> f32 {
        self.serve(reading.field()).await.mass_density(reading)
    }

    async fn count(&mut self, reading: ParticleCount) -> u16 {
        self.serve(reading.field()).await.particle_count(reading)
    }

    async fn group(&mut self, group: StatusGroup) -> u8 {
        self.serve(group.field()).await.status(group)
    }

    // Mass density, µg/m³

    /// PM1.0 mass density
    pub async fn pm1_0(&mut self) -> f32 {
        self.mass(MassDensity::Pm1_0).await
    }

    /// PM2.5 mass density
    pub async fn pm2_5(&mut self) -> f32 {
        self.mass(MassDensity::Pm2_5).await
    }

    /// PM10 mass density
    pub async fn pm10(&mut self) -> f32 {
        self.mass(MassDensity::Pm10).await
    }

    // Particle count

    /// Count of particles 0.3 to 0.5 µm
    pub async fn pc0_5(&mut self) -> u16 {
        self.count(ParticleCount::Pc0_5).await
    }

    /// Count of particles 0.5 to 1.0 µm
    pub async fn pc1_0(&mut self) -> u16 {
        self.count(ParticleCount::Pc1_0).await
    }

    /// Count of particles 1.0 to 2.5 µm
    pub async fn pc2_5(&mut self) -> u16 {
        self.count(ParticleCount::Pc2_5).await
    }

    /// Count of particles 2.5 to 5.0 µm
    pub async fn pc5_0(&mut self) -> u16 {
        self.count(ParticleCount::Pc5_0).await
    }

    /// Count of particles 5.0 to 7.5 µm
    pub async fn pc7_5(&mut self) -> u16 {
        self.count(ParticleCount::Pc7_5).await
    }

    /// Count of particles 7.5 to 10 µm
    pub async fn pc10(&mut self) -> u16 {
        self.count(ParticleCount::Pc10).await
    }

    // State

    /// Raw state register
    pub async fn state(&mut self) -> u8 {
        self.serve(Field::State).await.state()
    }

    /// Overall sensor status, state bits [7:6]
    pub async fn status_sensors(&mut self) -> u8 {
        self.group(StatusGroup::Sensors).await
    }

    /// Photodiode status, state bits [5:4]
    pub async fn status_pd(&mut self) -> u8 {
        self.group(StatusGroup::Pd).await
    }

    /// Laser diode status, state bits [3:2]
    pub async fn status_ld(&mut self) -> u8 {
        self.group(StatusGroup::Ld).await
    }

    /// Fan status, state bits [1:0]
    pub async fn status_fan(&mut self) -> u8 {
        self.group(StatusGroup::Fan).await
    }
}

impl<I2C: I2c> Sensor<MEASUREMENT_VALUES> for SnGcja5Async<I2C> {
    type Readings = Measurement;

    async fn read(&mut self) -> Result<Measurement, SensorError> {
        self.measure().await.map_err(|e| {
            error!("SN-GCJA5 measurement failed: {:?}", e);
            match e {
                Error::NoAcknowledge => SensorError::NotConnected { sensor: "SN-GCJA5" },
                Error::I2c(_) => SensorError::ReadFailed {
                    sensor: "SN-GCJA5",
                    operation: "read register snapshot",
                    details: "I2C communication error",
                },
            }
        })
    }
}
