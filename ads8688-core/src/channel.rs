//! Channel model
//!
//! The chip keeps channel enable and power-down state as 8-bit masks, bit
//! `i` for channel `i`. Operations address either one channel or the whole
//! mask at once.

use heapless::Vec;

use crate::error::{Error, Result};

/// Number of analog input channels
pub const MAX_CHANNELS: usize = 8;

/// Number of channel flags accepted when opening a device
pub const OPEN_FLAG_CHANNELS: usize = 4;

/// Channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelSelect {
    /// A single channel, 0-7
    Channel(u8),
    /// Every channel: the raw mask
    All,
}

impl ChannelSelect {
    /// Validate the selector
    pub fn check(self) -> Result<Self> {
        match self {
            ChannelSelect::Channel(ch) if ch as usize >= MAX_CHANNELS => {
                Err(Error::InvalidArgument)
            }
            sel => Ok(sel),
        }
    }
}

impl From<u8> for ChannelSelect {
    fn from(channel: u8) -> Self {
        ChannelSelect::Channel(channel)
    }
}

/// Apply a field write to a mask
///
/// `All` replaces the mask with `value`. A single channel sets its bit when
/// `value` is non-zero and clears it otherwise, leaving other bits alone.
pub fn apply_field(mask: u8, select: ChannelSelect, value: u8) -> Result<u8> {
    match select.check()? {
        ChannelSelect::All => Ok(value),
        ChannelSelect::Channel(ch) => {
            let bit = 1u8 << ch;
            Ok(if value != 0 { mask | bit } else { mask & !bit })
        }
    }
}

/// Extract a field from a mask
///
/// `All` returns the raw mask; a single channel returns its bit in position 0.
pub fn extract_field(mask: u8, select: ChannelSelect) -> Result<u8> {
    match select.check()? {
        ChannelSelect::All => Ok(mask),
        ChannelSelect::Channel(ch) => Ok((mask >> ch) & 0x01),
    }
}

/// Build an enable mask from per-channel open flags
pub fn enable_mask(flags: &[bool; OPEN_FLAG_CHANNELS]) -> u8 {
    let mut mask = 0u8;
    for (i, on) in flags.iter().enumerate() {
        if *on {
            mask |= 1 << i;
        }
    }
    mask
}

/// Power-down mask for the flagged channels: each one powered down unless enabled
///
/// Only channels 0-3 take open flags, so the complement is taken over those
/// four bits. Channels 4-7 are left powered; a full `!enable` would also
/// power them down even though nothing selected them. Teardown still
/// powers down all eight.
pub fn power_down_mask(enable: u8) -> u8 {
    const FLAGGED: u8 = (1 << OPEN_FLAG_CHANNELS) - 1;
    !enable & FLAGGED
}

/// Cached per-device channel configuration
///
/// Mirrors chip registers as last read back; the chip stays authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Enable mask
    pub channel_en: u8,
    /// Power-down mask
    pub channel_pd: u8,
    /// Range code per channel
    pub range: [u8; MAX_CHANNELS],
}

impl ChannelConfig {
    /// Configuration left behind on teardown: all disabled, all powered down
    pub const SHUTDOWN: Self = Self {
        channel_en: 0x00,
        channel_pd: 0xFF,
        range: [0; MAX_CHANNELS],
    };

    /// Indices of enabled channels
    pub fn enabled_channels(&self) -> Vec<u8, MAX_CHANNELS> {
        let mut channels = Vec::new();
        for ch in 0..MAX_CHANNELS as u8 {
            if self.channel_en & (1 << ch) != 0 {
                // Capacity equals channel count
                let _ = channels.push(ch);
            }
        }
        channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apply_all_replaces_mask() {
        assert_eq!(apply_field(0xAA, ChannelSelect::All, 0x0F), Ok(0x0F));
    }

    #[test]
    fn test_apply_single_channel() {
        assert_eq!(apply_field(0b0000_0000, ChannelSelect::Channel(3), 1), Ok(0b0000_1000));
        assert_eq!(apply_field(0b1111_1111, ChannelSelect::Channel(0), 0), Ok(0b1111_1110));
        // Any non-zero value sets the bit
        assert_eq!(apply_field(0, ChannelSelect::Channel(7), 0x42), Ok(0x80));
    }

    #[test]
    fn test_channel_out_of_range() {
        assert_eq!(apply_field(0, ChannelSelect::Channel(8), 1), Err(Error::InvalidArgument));
        assert_eq!(extract_field(0, ChannelSelect::Channel(200)), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_extract_field() {
        assert_eq!(extract_field(0b0100_0101, ChannelSelect::All), Ok(0b0100_0101));
        assert_eq!(extract_field(0b0100_0101, ChannelSelect::Channel(2)), Ok(1));
        assert_eq!(extract_field(0b0100_0101, ChannelSelect::Channel(1)), Ok(0));
        assert_eq!(extract_field(0b0100_0101, ChannelSelect::Channel(6)), Ok(1));
    }

    #[test]
    fn test_open_masks() {
        let en = enable_mask(&[true, false, true, false]);
        assert_eq!(en, 0b0101);
        assert_eq!(power_down_mask(en), 0b1010);
        assert_eq!(power_down_mask(enable_mask(&[false; 4])), 0b1111);
        assert_eq!(power_down_mask(enable_mask(&[true; 4])), 0);
    }

    #[test]
    fn test_enabled_channels() {
        let config = ChannelConfig {
            channel_en: 0b1000_0101,
            ..Default::default()
        };
        assert_eq!(config.enabled_channels().as_slice(), &[0u8, 2, 7]);
        assert!(ChannelConfig::SHUTDOWN.enabled_channels().is_empty());
    }

    proptest! {
        #[test]
        fn single_channel_write_round_trips(mask: u8, ch in 0u8..8, on: bool) {
            let updated = apply_field(mask, ChannelSelect::Channel(ch), on as u8).unwrap();
            prop_assert_eq!(extract_field(updated, ChannelSelect::Channel(ch)).unwrap(), on as u8);
            // Sibling bits untouched
            prop_assert_eq!(updated & !(1 << ch), mask & !(1 << ch));
        }

        #[test]
        fn all_write_round_trips(mask: u8, value: u8) {
            let updated = apply_field(mask, ChannelSelect::All, value).unwrap();
            prop_assert_eq!(extract_field(updated, ChannelSelect::All).unwrap(), value);
        }
    }
}
