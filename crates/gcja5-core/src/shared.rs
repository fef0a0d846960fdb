//! Sharing one SN-GCJA5 between several users
//!
//! The snapshot cache and its consumed flags belong to a single driver, so
//! sharing happens at the driver level rather than the bus level. Both
//! wrappers hold their lock across the whole refresh and decode, which keeps
//! one caller's getter pass from consuming fields out of another caller's
//! snapshot.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};

use crate::blocking::SnGcja5;
use crate::error::Error;
use crate::measurement::Measurement;
use crate::r#async::SnGcja5Async;

/// An async driver behind an Embassy mutex, for sharing between tasks.
///
/// ```ignore
/// use static_cell::StaticCell;
///
/// static PARTICLES: StaticCell<SharedSensorAsync<I2cDevice>> = StaticCell::new();
///
/// let particles = PARTICLES.init(SharedSensorAsync::new(SnGcja5Async::new(i2c)));
/// spawner.must_spawn(log_task(particles));
/// spawner.must_spawn(display_task(particles));
/// ```
pub struct SharedSensorAsync<I2C> {
    inner: Mutex<CriticalSectionRawMutex, SnGcja5Async<I2C>>,
}

impl<I2C> SharedSensorAsync<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    pub const fn new(sensor: SnGcja5Async<I2C>) -> Self {
        Self {
            inner: Mutex::new(sensor),
        }
    }

    /// Exclusive access for a getter pass. Fields read through one guard share
    /// a single snapshot.
    pub async fn lock(&self) -> MutexGuard<'_, CriticalSectionRawMutex, SnGcja5Async<I2C>> {
        self.inner.lock().await
    }

    /// Refresh and decode every field under one lock
    pub async fn measure(&self) -> Result<Measurement, Error<I2C::Error>> {
        self.inner.lock().await.measure().await
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_connected().await
    }

    pub fn into_inner(self) -> SnGcja5Async<I2C> {
        self.inner.into_inner()
    }
}

/// A blocking driver behind a critical-section mutex.
///
/// Snapshot refresh and consumed-flag updates all happen inside one lock, so
/// the driver can be reached from interrupt handlers or several executors.
/// Closures passed to [`with`](Self::with) must not call back into the same
/// `SharedSensor`.
pub struct SharedSensor<I2C> {
    inner: BlockingMutex<CriticalSectionRawMutex, RefCell<SnGcja5<I2C>>>,
}

impl<I2C> SharedSensor<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub const fn new(sensor: SnGcja5<I2C>) -> Self {
        Self {
            inner: BlockingMutex::new(RefCell::new(sensor)),
        }
    }

    /// Run `f` with exclusive access to the driver
    pub fn with<R>(&self, f: impl FnOnce(&mut SnGcja5<I2C>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Refresh and decode every field under one lock
    pub fn measure(&self) -> Result<Measurement, Error<I2C::Error>> {
        self.with(|sensor| sensor.measure())
    }

    pub fn is_connected(&self) -> bool {
        self.with(|sensor| sensor.is_connected())
    }

    pub fn into_inner(self) -> SnGcja5<I2C> {
        self.inner.into_inner().into_inner()
    }
}
