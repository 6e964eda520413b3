//! SPI transaction engine
//!
//! One transaction stages an address byte and a 16-bit word, pulses
//! `spi_start`, then polls STATUS until `spi_busy` drops:
//!
//! ```text
//! STATUS.spi_busy? -> Busy
//! ADDR    <- addr     (read back)
//! WR_DATA <- data     (read back)
//! CTRL    <- CTRL | spi_start
//! poll STATUS until !spi_busy
//! STATUS.spi_done? else TransferFailed
//! RD_DATA -> result   (reads only)
//! ```

use ads8688_core::bridge::reg;
use ads8688_core::{Error, Result};
use ads8688_hal::RegisterBus;
use embedded_hal::delay::DelayNs;

use super::RegisterBridge;

impl<B: RegisterBus, D: DelayNs> RegisterBridge<B, D> {
    /// Run one transaction and return the RD_DATA word
    pub fn transact(&mut self, addr: u8, data: u16) -> Result<u16> {
        self.run_transfer(addr, data)?;
        let rd_data = self.regs.read(reg::RD_DATA);
        self.cache.rd_data = rd_data;
        Ok(rd_data as u16)
    }

    /// Run one transaction without reading RD_DATA
    pub fn transact_write(&mut self, addr: u8, data: u16) -> Result<()> {
        self.run_transfer(addr, data)
    }

    /// Byte-level exchange
    ///
    /// A 3-byte `tx` with a 3-byte `rx` is a read: `rx` receives the
    /// address byte followed by the 16-bit result, big-endian. A 2-byte
    /// `tx` without `rx` is a write. Any other shape is rejected.
    pub fn exchange(&mut self, tx: &[u8], rx: Option<&mut [u8]>) -> Result<()> {
        match (tx, rx) {
            (&[addr, data, _], Some(rx)) if rx.len() == 3 => {
                let word = self.transact(addr, data as u16)?;
                rx[0] = addr;
                rx[1..].copy_from_slice(&word.to_be_bytes());
                Ok(())
            }
            (&[addr, data], None) => self.transact_write(addr, data as u16),
            _ => Err(Error::InvalidArgument),
        }
    }

    fn run_transfer(&mut self, addr: u8, data: u16) -> Result<()> {
        if self.refresh_status().spi_busy() {
            warn!("spi engine busy");
            return Err(Error::Busy);
        }

        self.cache.addr = self.write_verified(reg::ADDR, addr as u32);
        self.cache.wr_data = self.write_verified(reg::WR_DATA, data as u32);
        self.modify_ctrl(|ctrl| ctrl.with_spi_start(true));

        self.poll_until(|bridge| !bridge.refresh_status().spi_busy())
            .inspect_err(|_| warn!("spi transfer {=u8:#x} timed out", addr))?;

        if !self.cache.status.spi_done() {
            warn!("spi transfer {=u8:#x} finished without done", addr);
            return Err(Error::TransferFailed);
        }

        trace!("spi {=u8:#x} <- {=u16:#x}", addr, data);
        Ok(())
    }
}
