//! Typed sensor readings and their place in a shared sample array
//!
//! Drivers implement [`Sensor`] and hand back readings that flatten into a
//! fixed number of `i32` values. [`IndexedSensor`] pins such a driver to a
//! slot range chosen at compile time.

use core::marker::PhantomData;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} is not responding")]
    NotConnected { sensor: &'static str },
    #[error("{sensor} failed to {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("sample array too small for readings at {start}..{end}")]
    LayoutOverflow { start: usize, end: usize },
}

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values and their conversion to arrays.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into a fixed-size array.
    fn to_array(self) -> [i32; COUNT];
}

/// Trait for sensors that produce typed readings.
pub trait Sensor<const COUNT: usize> {
    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> impl Future<Output = Result<Self::Readings, SensorError>>;
}

// Type-level index markers
pub struct Idx<const N: usize>;

/// A sensor pinned to a slot range of a shared sample array
pub struct IndexedSensor<S, const START: usize, const COUNT: usize>
where
    S: Sensor<COUNT>,
{
    sensor: S,
    _marker: PhantomData<Idx<START>>,
}

impl<S, const START: usize, const COUNT: usize> From<S> for IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

impl<S, const START: usize, const COUNT: usize> IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    pub const fn new(sensor: S) -> Self {
        Self {
            sensor,
            _marker: PhantomData,
        }
    }

    /// Read and write to the values array at the correct indices.
    pub async fn read_into<const SLOTS: usize>(
        &mut self,
        values: &mut [i32; SLOTS],
    ) -> Result<(), SensorError> {
        let slots = values
            .get_mut(START..START + COUNT)
            .ok_or(SensorError::LayoutOverflow {
                start: START,
                end: START + COUNT,
            })?;
        let readings = self.sensor.read().await?;
        slots.copy_from_slice(&readings.to_array());
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.sensor
    }

    /// Get the starting index where this sensor's data is stored.
    pub const fn start_index() -> usize {
        START
    }

    /// Get the absolute index for a specific reading within this sensor.
    pub const fn reading_index(offset: usize) -> usize {
        START + offset
    }
}

/// Offsets of each value inside the SN-GCJA5 slot range
pub mod indices {
    pub const PM1_0: usize = 0;
    pub const PM2_5: usize = 1;
    pub const PM10: usize = 2;
    pub const PC0_5: usize = 3;
    pub const PC1_0: usize = 4;
    pub const PC2_5: usize = 5;
    pub const PC5_0: usize = 6;
    pub const PC7_5: usize = 7;
    pub const PC10: usize = 8;
    pub const STATE: usize = 9;
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    struct Counter(i32);

    struct CounterReadings([i32; 2]);

    impl SensorReadings<2> for CounterReadings {
        fn to_array(self) -> [i32; 2] {
            self.0
        }
    }

    impl Sensor<2> for Counter {
        type Readings = CounterReadings;

        async fn read(&mut self) -> Result<CounterReadings, SensorError> {
            self.0 += 1;
            Ok(CounterReadings([self.0, -self.0]))
        }
    }

    #[test]
    fn test_read_into_writes_slot_range() {
        let mut indexed: IndexedSensor<Counter, 3, 2> = Counter(0).into();
        let mut values = [0i32; 6];
        block_on(indexed.read_into(&mut values)).unwrap();
        assert_eq!(values, [0, 0, 0, 1, -1, 0]);
        assert_eq!(IndexedSensor::<Counter, 3, 2>::reading_index(1), 4);
    }

    #[test]
    fn test_read_into_rejects_short_array() {
        let mut indexed: IndexedSensor<Counter, 3, 2> = Counter(0).into();
        let mut values = [0i32; 4];
        let err = block_on(indexed.read_into(&mut values)).unwrap_err();
        assert_eq!(err, SensorError::LayoutOverflow { start: 3, end: 5 });
        // the sensor is not touched when the layout is wrong
        assert_eq!(indexed.into_inner().0, 0);
    }
}
