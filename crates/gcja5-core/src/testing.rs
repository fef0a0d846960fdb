//! Fake SN-GCJA5 on a fake I2C bus, for unit tests

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

use crate::registers::{DEFAULT_ADDRESS, SNAPSHOT_BASE, SNAPSHOT_LEN};

/// Register file behind a bus that counts every transaction shape the
/// driver is allowed to use.
pub(crate) struct FakeBus {
    pub registers: [u8; SNAPSHOT_LEN],
    pub address: u8,
    /// NACK every transaction
    pub nack: bool,
    /// Scribble over read buffers and then report a bus error
    pub garble_reads: bool,
    pub probes: usize,
    pub bulk_reads: usize,
    pub register_reads: usize,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            registers: [0; SNAPSHOT_LEN],
            address: DEFAULT_ADDRESS,
            nack: false,
            garble_reads: false,
            probes: 0,
            bulk_reads: 0,
            register_reads: 0,
        }
    }

    pub fn with_registers(registers: [u8; SNAPSHOT_LEN]) -> Self {
        Self {
            registers,
            ..Self::new()
        }
    }

    pub fn transactions(&self) -> usize {
        self.probes + self.bulk_reads + self.register_reads
    }

    fn handle(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        if self.nack || address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        match operations {
            [Operation::Write(bytes)] if bytes.is_empty() => {
                self.probes += 1;
                Ok(())
            }
            [Operation::Write(bytes), Operation::Read(buf)] if bytes.len() == 1 => {
                let start = bytes[0] as usize;
                if start == SNAPSHOT_BASE as usize && buf.len() == SNAPSHOT_LEN {
                    self.bulk_reads += 1;
                } else {
                    self.register_reads += 1;
                }

                if self.garble_reads {
                    buf.fill(0xAA);
                    return Err(ErrorKind::Bus);
                }

                for (i, slot) in buf.iter_mut().enumerate() {
                    *slot = self.registers.get(start + i).copied().unwrap_or(0);
                }
                Ok(())
            }
            _ => Err(ErrorKind::Other),
        }
    }
}

impl ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl embedded_hal::i2c::I2c for FakeBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.handle(address, operations)
    }
}

impl embedded_hal_async::i2c::I2c for FakeBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.handle(address, operations)
    }
}

/// Register file with a distinct value in every field
pub(crate) fn sample_registers() -> [u8; SNAPSHOT_LEN] {
    let mut r = [0u8; SNAPSHOT_LEN];
    r[0x00..0x04].copy_from_slice(&1_000u32.to_le_bytes());
    r[0x04..0x08].copy_from_slice(&12_345u32.to_le_bytes());
    r[0x08..0x0C].copy_from_slice(&250_000u32.to_le_bytes());
    r[0x0C..0x0E].copy_from_slice(&805u16.to_le_bytes());
    r[0x0E..0x10].copy_from_slice(&310u16.to_le_bytes());
    r[0x10..0x12].copy_from_slice(&42u16.to_le_bytes());
    r[0x14..0x16].copy_from_slice(&7u16.to_le_bytes());
    r[0x16..0x18].copy_from_slice(&3u16.to_le_bytes());
    r[0x18..0x1A].copy_from_slice(&1u16.to_le_bytes());
    r[0x26] = 0b1011_0001;
    r
}
