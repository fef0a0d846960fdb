//! Bus errors reported by the SN-GCJA5 drivers

use embedded_hal::i2c::{self, ErrorKind};
use thiserror_no_std::Error;

/// Errors that can occur during SN-GCJA5 bus operations
#[derive(Error, Debug)]
pub enum Error<E> {
    /// The sensor did not acknowledge its address or a written byte
    #[error("SN-GCJA5 did not acknowledge")]
    NoAcknowledge,
    /// Any other I2C transport failure
    #[error("I2C communication error: {0:?}")]
    I2c(E),
}

impl<E: i2c::Error> From<E> for Error<E> {
    fn from(e: E) -> Self {
        match e.kind() {
            ErrorKind::NoAcknowledge(_) => Self::NoAcknowledge,
            _ => Self::I2c(e),
        }
    }
}
