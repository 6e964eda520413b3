//! Bridge configuration
//!
//! One `BridgeConfig` describes a board: the bridge clock, the SPI clock
//! the chip tolerates, the poll budget for hardware handshakes, and where
//! each bridge instance lives in the address space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bridge instances per board
pub const MAX_INSTANCES: usize = 4;

/// Default bridge clock (Hz)
pub const DEFAULT_FPGA_CLOCK_HZ: u32 = 120_000_000;

/// Highest SPI clock the ADS8688 accepts (Hz)
pub const DEFAULT_CHIP_SPI_HZ: u32 = 17_000_000;

/// Largest scan the bridge sample counter can hold
pub const DEFAULT_MAX_SAMPLE_NUM: u32 = 65_536;

/// Default poll budget for one handshake
pub const DEFAULT_MAX_POLLS: u32 = 100_000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Bridge or SPI clock is zero
    ZeroClock,
    /// Sample limit is zero
    ZeroSampleLimit,
    /// Poll budget is zero
    ZeroPollBudget,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored image does not carry the config magic
    BadMagic,
    /// Stored image has a different format version
    VersionMismatch,
    /// TOML document could not be parsed
    TomlParse,
}

/// Bound for one busy-wait loop
///
/// Status registers are read at most `max_polls` times; when
/// `interval_ns` is non-zero the driver sleeps that long between reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PollConfig {
    /// Maximum register reads before giving up
    pub max_polls: u32,
    /// Delay between reads (ns), 0 to spin
    pub interval_ns: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            interval_ns: 0,
        }
    }
}

impl PollConfig {
    /// Spin without delay for at most `max_polls` reads
    pub const fn spin(max_polls: u32) -> Self {
        Self {
            max_polls,
            interval_ns: 0,
        }
    }
}

/// Board-level bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    /// Bridge clock (Hz); scan periods are counted in these cycles
    pub fpga_clock_hz: u32,
    /// Target chip SPI clock (Hz)
    pub chip_spi_hz: u32,
    /// Largest accepted `sample_num`
    pub max_sample_num: u32,
    /// Handshake poll bound
    pub poll: PollConfig,
    /// Base address per instance index
    pub base_addresses: [u32; MAX_INSTANCES],
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            fpga_clock_hz: DEFAULT_FPGA_CLOCK_HZ,
            chip_spi_hz: DEFAULT_CHIP_SPI_HZ,
            max_sample_num: DEFAULT_MAX_SAMPLE_NUM,
            poll: PollConfig::default(),
            base_addresses: [0x43C0_0000, 0x43C1_0000, 0x43C2_0000, 0x43C3_0000],
        }
    }
}

impl BridgeConfig {
    /// Base address for an instance index
    pub fn base_address(&self, index: usize) -> Option<u32> {
        self.base_addresses.get(index).copied()
    }

    /// SPI clock divisor for the chip
    pub fn baud_divisor(&self) -> u32 {
        crate::bridge::baud_divisor(self.fpga_clock_hz, self.chip_spi_hz)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fpga_clock_hz == 0 || self.chip_spi_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if self.max_sample_num == 0 {
            return Err(ConfigError::ZeroSampleLimit);
        }
        if self.poll.max_polls == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys keep their defaults.
    ///
    /// ```toml
    /// fpga_clock_hz = 120000000
    /// chip_spi_hz = 17000000
    /// base_addresses = [0x43C00000, 0x43C10000, 0x43C20000, 0x43C30000]
    ///
    /// [poll]
    /// max_polls = 5000
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_| ConfigError::TomlParse)?;
        config.validate()?;
        Ok(config)
    }
}
