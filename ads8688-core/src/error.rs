//! Error taxonomy for bridge and chip operations
//!
//! Every operation is synchronous and reports failure at the call site.
//! Nothing is retried automatically.

use core::fmt;

/// Driver operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Out-of-range channel, rate, sample count, mode or instance index
    InvalidArgument,
    /// SPI engine already running a transaction
    Busy,
    /// Sampler already running a scan
    SampleBusy,
    /// Transaction finished without the done flag
    TransferFailed,
    /// No channel enabled on the chip
    NoChannelEnabled,
    /// Scan ended with the error flag or a residual sample count
    SampleError,
    /// A hardware handshake did not settle within the poll budget
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::Busy => write!(f, "spi engine busy"),
            Self::SampleBusy => write!(f, "sampler busy"),
            Self::TransferFailed => write!(f, "spi transfer failed"),
            Self::NoChannelEnabled => write!(f, "no channel enabled"),
            Self::SampleError => write!(f, "sample error"),
            Self::Timeout => write!(f, "operation timeout"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, Error>;
