//! Chip register façade
//!
//! ADS8688 program registers are reached through bridge SPI exchanges.
//! [`ChipRegisters`] is the seam between the register protocol and
//! everything built on it, so channel logic can run against a plain
//! register file in tests.

pub mod channels;

pub use channels::MaskField;

use ads8688_core::chip::{
    read_address, reg, write_address, ChipCommand, Mode, CMD_RESET, PRE_ENCODED,
};
use ads8688_core::{Error, Result};
use ads8688_hal::RegisterBus;
use embedded_hal::delay::DelayNs;

use crate::bridge::RegisterBridge;

/// Access to 8-bit chip program registers
pub trait ChipRegisters {
    /// Write a program register
    ///
    /// `addr` is encoded for a write unless its top bit is set, in which
    /// case it is sent as-is (command words).
    fn write_chip_register(&mut self, addr: u8, data: u8) -> Result<()>;

    /// Read a program register
    fn read_chip_register(&mut self, addr: u8) -> Result<u8>;

    /// Restore chip defaults
    fn reset_chip(&mut self) -> Result<()> {
        self.write_chip_register(CMD_RESET, 0)
    }

    /// Select the output frame mode
    ///
    /// FEATURE_SELECT is read back after the write so a dead link shows up
    /// here rather than on the first conversion.
    fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.write_chip_register(reg::FEATURE_SELECT, mode.feature_select())?;
        self.read_chip_register(reg::FEATURE_SELECT)?;
        Ok(())
    }
}

impl<B: RegisterBus, D: DelayNs> ChipRegisters for RegisterBridge<B, D> {
    fn write_chip_register(&mut self, addr: u8, data: u8) -> Result<()> {
        let encoded = if addr & PRE_ENCODED != 0 {
            addr
        } else {
            write_address(addr)
        };
        self.exchange(&[encoded, data], None)
    }

    fn read_chip_register(&mut self, addr: u8) -> Result<u8> {
        let tx = [read_address(addr), 0, 0];
        let mut rx = [0u8; 3];
        self.exchange(&tx, Some(&mut rx))?;
        Ok(rx[1])
    }
}

impl<B: RegisterBus, D: DelayNs> RegisterBridge<B, D> {
    /// Send a command word and return the 16-bit response
    pub fn send_command(&mut self, command: ChipCommand) -> Result<u16> {
        let addr = command.address().ok_or(Error::InvalidArgument)?;
        self.transact(addr, 0)
    }
}
