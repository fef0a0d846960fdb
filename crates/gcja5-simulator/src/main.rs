//! Desktop simulator for the gcja5-core driver.
//!
//! Polls a simulated SN-GCJA5 through [`SharedSensor`] and logs every cycle.
//! The simulated sensor regenerates its registers on each bulk read, so the
//! readings drift like a real room, and it counts transactions so the cost of
//! the snapshot policy is visible in the log.
//!
//! # Environment
//!
//! | Variable            | Default | Meaning                          |
//! |---------------------|---------|----------------------------------|
//! | `GCJA5_ADDRESS`     | `0x33`  | I2C address (hex or decimal)     |
//! | `GCJA5_INTERVAL_MS` | `1000`  | Delay between cycles             |
//! | `GCJA5_SAMPLES`     | `10`    | Number of cycles, 0 runs forever |
//! | `RUST_LOG`          | `info`  | `env_logger` filter              |

use std::thread;
use std::time::Duration;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use log::{debug, error, info, warn};

use gcja5_core::registers::{
    ADDR_PCOUNT_0_5, ADDR_PCOUNT_1_0, ADDR_PCOUNT_2_5, ADDR_PCOUNT_5_0, ADDR_PCOUNT_7_5,
    ADDR_PCOUNT_10, ADDR_PM1_0, ADDR_PM2_5, ADDR_PM10, ADDR_STATE, SNAPSHOT_LEN,
};
use gcja5_core::{QualityLevel, SensorConfig, SharedSensor, SnGcja5, Status};

const DEFAULT_SAMPLES: u32 = 10;

// ---------------------------------------------------------------------------
// Simulated sensor
// ---------------------------------------------------------------------------

/// Register file of a fake SN-GCJA5 plus transaction bookkeeping.
struct SimulatedGcja5 {
    address: u8,
    registers: [u8; SNAPSHOT_LEN],
    /// Seconds of simulated time, advanced on every bulk read
    elapsed_secs: f64,
    transactions: u32,
}

impl SimulatedGcja5 {
    fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; SNAPSHOT_LEN],
            elapsed_secs: 0.0,
            transactions: 0,
        }
    }

    /// Produce the next register file.
    fn regenerate(&mut self) {
        self.elapsed_secs += 1.0;
        let t = self.elapsed_secs;

        // PM2.5: 5–35 µg/m³ with a slow cycle, PM1.0 and PM10 track it
        let pm2_5 = 20.0 + 15.0 * (t / 90.0).sin() + 2.0 * (t / 7.0).cos();
        let pm1_0 = pm2_5 * 0.7;
        let pm10 = pm2_5 * 1.4 + 3.0 * (t / 40.0).sin().abs();

        self.put_u32(ADDR_PM1_0, milli(pm1_0));
        self.put_u32(ADDR_PM2_5, milli(pm2_5));
        self.put_u32(ADDR_PM10, milli(pm10));

        // Counts fall off with particle size
        let base = pm2_5 * 30.0;
        self.put_u16(ADDR_PCOUNT_0_5, base as u16);
        self.put_u16(ADDR_PCOUNT_1_0, (base * 0.35) as u16);
        self.put_u16(ADDR_PCOUNT_2_5, (base * 0.05) as u16);
        self.put_u16(ADDR_PCOUNT_5_0, (base * 0.01) as u16);
        self.put_u16(ADDR_PCOUNT_7_5, (base * 0.004) as u16);
        self.put_u16(ADDR_PCOUNT_10, (base * 0.002) as u16);

        // Fan reports "within tolerance" for a few seconds every minute
        let fan = if (t as u32) % 60 < 5 { 0b01 } else { 0b00 };
        self.registers[ADDR_STATE as usize] = fan;
    }

    fn put_u32(&mut self, offset: u8, value: u32) {
        let at = offset as usize;
        self.registers[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn put_u16(&mut self, offset: u8, value: u16) {
        let at = offset as usize;
        self.registers[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }
}

fn milli(value: f64) -> u32 {
    (value.max(0.0) * 1000.0) as u32
}

impl ErrorType for SimulatedGcja5 {
    type Error = ErrorKind;
}

impl I2c for SimulatedGcja5 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        self.transactions += 1;

        match operations {
            [Operation::Write(bytes)] if bytes.is_empty() => Ok(()),
            [Operation::Write(bytes), Operation::Read(buf)] if bytes.len() == 1 => {
                let start = bytes[0] as usize;
                if start == ADDR_PM1_0 as usize && buf.len() == SNAPSHOT_LEN {
                    self.regenerate();
                }
                for (i, slot) in buf.iter_mut().enumerate() {
                    *slot = self.registers.get(start + i).copied().unwrap_or(0);
                }
                debug!("bus: read {} bytes from {:#04x}", buf.len(), start);
                Ok(())
            }
            _ => Err(ErrorKind::Other),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn parse_u32(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

fn env_u32(name: &str) -> Option<u32> {
    let raw = std::env::var(name).ok()?;
    let value = parse_u32(&raw);
    if value.is_none() {
        warn!("Ignoring {}={:?}: not a number", name, raw);
    }
    value
}

fn load_config() -> SensorConfig {
    let mut config = SensorConfig::default();
    if let Some(address) = env_u32("GCJA5_ADDRESS") {
        match u8::try_from(address) {
            Ok(a) if a < 0x80 => config.address = a,
            _ => warn!("Ignoring GCJA5_ADDRESS={:#x}: not a 7-bit address", address),
        }
    }
    if let Some(interval) = env_u32("GCJA5_INTERVAL_MS") {
        config.sample_interval_ms = interval;
    }
    config
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

fn log_status(status: Status) {
    if status.is_normal() {
        return;
    }
    warn!(
        "Status: sensors {}, PD {}, LD {}, fan {}",
        status.sensors_status().label(),
        status.pd_status().label(),
        status.ld_status().label(),
        status.fan_status().label()
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();
    let samples = env_u32("GCJA5_SAMPLES").unwrap_or(DEFAULT_SAMPLES);
    info!(
        "Simulating SN-GCJA5 at {:#04x}, every {} ms",
        config.address, config.sample_interval_ms
    );

    let sensor = SharedSensor::new(SnGcja5::with_address(
        SimulatedGcja5::new(config.address),
        config.address,
    ));

    if !sensor.is_connected() {
        error!("SN-GCJA5 not found at {:#04x}", config.address);
        std::process::exit(1);
    }

    let mut cycle = 0u32;
    while samples == 0 || cycle < samples {
        cycle += 1;

        // One pass over every getter: only the first one touches the bus.
        let (pm1_0, pm2_5, pm10, counts, state, failed) = sensor.with(|s| {
            let pm = (s.pm1_0(), s.pm2_5(), s.pm10());
            let counts = [s.pc0_5(), s.pc1_0(), s.pc2_5(), s.pc5_0(), s.pc7_5(), s.pc10()];
            (pm.0, pm.1, pm.2, counts, s.state(), s.last_refresh_failed())
        });

        if failed {
            warn!("Cycle {}: refresh failed, readings are zero", cycle);
        }

        info!(
            "Cycle {}: PM1.0 {:.3} | PM2.5 {:.3} ({}) | PM10 {:.3} ({}) µg/m³",
            cycle,
            pm1_0,
            pm2_5,
            QualityLevel::assess_pm2_5(pm2_5).label(),
            pm10,
            QualityLevel::assess_pm10(pm10).label()
        );
        info!(
            "Cycle {}: counts 0.5/1.0/2.5/5.0/7.5/10 µm = {:?}",
            cycle, counts
        );
        log_status(Status::from_byte(state));

        thread::sleep(Duration::from_millis(config.sample_interval_ms as u64));
    }

    let bus = sensor.into_inner().release();
    info!(
        "{} cycles, {} bus transactions ({} simulated seconds)",
        cycle, bus.transactions, bus.elapsed_secs
    );
}
