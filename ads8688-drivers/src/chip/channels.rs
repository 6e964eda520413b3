//! Channel configuration
//!
//! Enable and power-down live in two 8-bit chip registers. Single-channel
//! updates are read-modify-write against the chip, never against a cached
//! mask, so a register changed behind the driver's back is respected.

use ads8688_core::channel::{apply_field, extract_field, ChannelSelect, MAX_CHANNELS};
use ads8688_core::chip::{reg, Range};
use ads8688_core::{Error, Result};

use super::ChipRegisters;

/// Per-channel mask registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MaskField {
    /// Auto-scan sequence enable
    Enable,
    /// Power-down
    PowerDown,
}

impl MaskField {
    /// Chip register holding this mask
    pub fn register(self) -> u8 {
        match self {
            MaskField::Enable => reg::CH_EN,
            MaskField::PowerDown => reg::CH_PD,
        }
    }
}

/// Update one channel's bit, or the whole mask for `All`
///
/// Returns the mask written.
pub fn set_field<C>(chip: &mut C, field: MaskField, select: ChannelSelect, value: u8) -> Result<u8>
where
    C: ChipRegisters + ?Sized,
{
    let mask = match select.check()? {
        ChannelSelect::All => value,
        sel => apply_field(chip.read_chip_register(field.register())?, sel, value)?,
    };
    chip.write_chip_register(field.register(), mask)?;
    Ok(mask)
}

/// Read one channel's bit (0 or 1), or the whole mask for `All`
pub fn get_field<C>(chip: &mut C, field: MaskField, select: ChannelSelect) -> Result<u8>
where
    C: ChipRegisters + ?Sized,
{
    let select = select.check()?;
    let mask = chip.read_chip_register(field.register())?;
    extract_field(mask, select)
}

/// Program a channel's input range
pub fn set_range<C>(chip: &mut C, channel: u8, range: Range) -> Result<()>
where
    C: ChipRegisters + ?Sized,
{
    check_channel(channel)?;
    chip.write_chip_register(reg::range_select(channel), range.code())
}

/// Read a channel's raw range code
pub fn get_range<C>(chip: &mut C, channel: u8) -> Result<u8>
where
    C: ChipRegisters + ?Sized,
{
    check_channel(channel)?;
    chip.read_chip_register(reg::range_select(channel))
}

fn check_channel(channel: u8) -> Result<()> {
    if channel as usize >= MAX_CHANNELS {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}
