//! ADS8688 chip register map
//!
//! Program registers are 8-bit addressed and reached through the bridge's
//! SPI engine. On the wire the address byte carries a R/W flag in bit 0:
//!
//! - write: `(addr << 1) | 1`
//! - read:  `(addr << 1) & 0xFE`
//!
//! Command words (reset, standby, channel select) use address bytes with
//! bit 7 set and are sent verbatim.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Program register addresses
pub mod reg {
    /// Auto-scan sequence enable (1 = enabled)
    pub const CH_EN: u8 = 0x01;
    /// Channel power-down (1 = powered down)
    pub const CH_PD: u8 = 0x02;
    /// Feature select: device id, alarm, SDO format
    pub const FEATURE_SELECT: u8 = 0x03;
    /// First per-channel input range register
    pub const RANGE_BASE: u8 = 0x05;

    /// Input range register for `channel`
    pub const fn range_select(channel: u8) -> u8 {
        RANGE_BASE + channel
    }
}

/// Reserved bits always written alongside the mode code in FEATURE_SELECT
pub const FEATURE_SELECT_FIXED: u8 = 0b0010_1000;

/// Address bytes with this bit set are already encoded
pub const PRE_ENCODED: u8 = 0x80;

/// Reset command word
pub const CMD_RESET: u8 = 0x85;

/// Encode a program register address for a write
pub const fn write_address(addr: u8) -> u8 {
    (addr << 1) | 0x01
}

/// Encode a program register address for a read
pub const fn read_address(addr: u8) -> u8 {
    (addr << 1) & 0xFE
}

/// Command words
///
/// Sent as a raw address byte with a zero payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipCommand {
    /// Continue in the current mode
    NoOp,
    /// Enter standby
    Standby,
    /// Power the whole device down
    PowerDown,
    /// Reset program registers to defaults
    Reset,
    /// Restart the auto-scan sequence
    AutoReset,
    /// Manual channel select (0-7, 8 = AUX input)
    ManualChannel(u8),
}

/// Highest manual-select channel (the AUX input)
pub const AUX_CHANNEL: u8 = 8;

impl ChipCommand {
    /// Raw command address byte, or `None` for an out-of-range manual channel
    pub fn address(self) -> Option<u8> {
        match self {
            ChipCommand::NoOp => Some(0x00),
            ChipCommand::Standby => Some(0x82),
            ChipCommand::PowerDown => Some(0x83),
            ChipCommand::Reset => Some(CMD_RESET),
            ChipCommand::AutoReset => Some(0xA0),
            ChipCommand::ManualChannel(n) if n <= AUX_CHANNEL => Some(n * 0x04 + 0xC0),
            ChipCommand::ManualChannel(_) => None,
        }
    }
}

/// Per-channel input range
///
/// Values are the codes written to the range select registers. Spans are
/// multiples of VREF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Range {
    /// ±2.5 × VREF
    #[default]
    Bipolar2V5 = 0,
    /// ±1.25 × VREF
    Bipolar1V25 = 1,
    /// ±0.625 × VREF
    Bipolar0V625 = 2,
    /// 0 to 2.5 × VREF
    Unipolar2V5 = 5,
    /// 0 to 1.25 × VREF
    Unipolar1V25 = 6,
}

impl Range {
    /// Register code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a register code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Range::Bipolar2V5),
            1 => Some(Range::Bipolar1V25),
            2 => Some(Range::Bipolar0V625),
            5 => Some(Range::Unipolar2V5),
            6 => Some(Range::Unipolar1V25),
            _ => None,
        }
    }
}

/// SDO output frame layout
///
/// Bits after the 16 conversion bits:
///
/// | mode | [8:5]      | [4:3]       | [2:0] |
/// |------|------------|-------------|-------|
/// | 0    | low        | low         | low   |
/// | 1    | channel    | low         | low   |
/// | 2    | channel    | device addr | low   |
/// | 3    | channel    | device addr | range |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Mode {
    #[default]
    Mode0 = 0,
    Mode1 = 1,
    Mode2 = 2,
    Mode3 = 3,
}

impl Mode {
    /// FEATURE_SELECT value for this mode
    pub fn feature_select(self) -> u8 {
        ((self as u8) & 0x07) | FEATURE_SELECT_FIXED
    }

    /// Parse a mode code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Mode::Mode0),
            1 => Some(Mode::Mode1),
            2 => Some(Mode::Mode2),
            3 => Some(Mode::Mode3),
            _ => None,
        }
    }
}
