//! FPGA register bridge map
//!
//! Offsets are relative to an instance's base address. Every register is a
//! 32-bit word.
//!
//! ```text
//! 0x00 CTRL         RW   command + mode bits
//! 0x04 STATUS       RW   handshake flags, write 1 to clear error/done
//! 0x08 ADDR         RW   staged SPI address byte
//! 0x0C WR_DATA      RW   staged SPI write word
//! 0x10 RD_DATA      RO   SPI read word
//! 0x14 SCAN_PERIOD  RW   clock cycles between auto-scan samples
//! 0x18 CHANNEL_EN   RO   chip channel enable mask
//! 0x1C SAMPLE_NUM   RW   samples per scan
//! 0x20 SAMPLE_CNT   RO   samples remaining
//! 0x24 BAUD_DIV     RW   SPI clock divisor
//! ```

/// Register offsets
pub mod reg {
    pub const CTRL: u32 = 0x00;
    pub const STATUS: u32 = 0x04;
    pub const ADDR: u32 = 0x08;
    pub const WR_DATA: u32 = 0x0C;
    pub const RD_DATA: u32 = 0x10;
    pub const SCAN_PERIOD: u32 = 0x14;
    pub const CHANNEL_EN: u32 = 0x18;
    pub const SAMPLE_NUM: u32 = 0x1C;
    pub const SAMPLE_CNT: u32 = 0x20;
    pub const BAUD_DIV: u32 = 0x24;
}

/// Value written to STATUS to clear every error/done flag
pub const STATUS_CLEAR_ALL: u32 = 0xFF;

/// Smallest SPI clock divisor the bridge accepts
pub const MIN_BAUD_DIV: u32 = 4;

/// CTRL register
///
/// `spi_start`, `sample_req`, `baud_load` and `soft_rst` are cleared by the
/// bridge once the command is taken. `ref_sel` and `auto_mode` persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlReg(pub u32);

impl CtrlReg {
    pub const SPI_START: u32 = 1 << 0;
    pub const SAMPLE_REQ: u32 = 1 << 4;
    pub const REF_SEL: u32 = 1 << 9;
    pub const AUTO_MODE: u32 = 1 << 10;
    pub const BAUD_LOAD: u32 = 1 << 11;
    pub const SOFT_RST: u32 = 1 << 31;

    /// Bits the bridge clears on its own
    pub const SELF_CLEARING: u32 =
        Self::SPI_START | Self::SAMPLE_REQ | Self::BAUD_LOAD | Self::SOFT_RST;

    #[inline]
    fn bit(&self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    #[inline]
    #[must_use]
    fn with(self, mask: u32, on: bool) -> Self {
        if on {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    pub fn spi_start(&self) -> bool {
        self.bit(Self::SPI_START)
    }

    pub fn sample_req(&self) -> bool {
        self.bit(Self::SAMPLE_REQ)
    }

    pub fn ref_sel(&self) -> bool {
        self.bit(Self::REF_SEL)
    }

    pub fn auto_mode(&self) -> bool {
        self.bit(Self::AUTO_MODE)
    }

    pub fn baud_load(&self) -> bool {
        self.bit(Self::BAUD_LOAD)
    }

    pub fn soft_rst(&self) -> bool {
        self.bit(Self::SOFT_RST)
    }

    #[must_use]
    pub fn with_spi_start(self, on: bool) -> Self {
        self.with(Self::SPI_START, on)
    }

    #[must_use]
    pub fn with_sample_req(self, on: bool) -> Self {
        self.with(Self::SAMPLE_REQ, on)
    }

    #[must_use]
    pub fn with_ref_sel(self, on: bool) -> Self {
        self.with(Self::REF_SEL, on)
    }

    #[must_use]
    pub fn with_auto_mode(self, on: bool) -> Self {
        self.with(Self::AUTO_MODE, on)
    }

    #[must_use]
    pub fn with_baud_load(self, on: bool) -> Self {
        self.with(Self::BAUD_LOAD, on)
    }

    #[must_use]
    pub fn with_soft_rst(self, on: bool) -> Self {
        self.with(Self::SOFT_RST, on)
    }
}

/// STATUS register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReg(pub u32);

impl StatusReg {
    pub const SPI_BUSY: u32 = 1 << 0;
    pub const SPI_DONE: u32 = 1 << 1;
    pub const SAMPLE_BUSY: u32 = 1 << 4;
    pub const SAMPLE_ERR: u32 = 1 << 5;
    pub const SAMPLE_DONE: u32 = 1 << 6;

    pub fn spi_busy(&self) -> bool {
        self.0 & Self::SPI_BUSY != 0
    }

    pub fn spi_done(&self) -> bool {
        self.0 & Self::SPI_DONE != 0
    }

    pub fn sample_busy(&self) -> bool {
        self.0 & Self::SAMPLE_BUSY != 0
    }

    pub fn sample_err(&self) -> bool {
        self.0 & Self::SAMPLE_ERR != 0
    }

    pub fn sample_done(&self) -> bool {
        self.0 & Self::SAMPLE_DONE != 0
    }
}

/// Software mirror of one bridge register block
///
/// Refreshed after each register read; never authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRegisterBlock {
    pub ctrl: CtrlReg,
    pub status: StatusReg,
    pub addr: u32,
    pub wr_data: u32,
    pub rd_data: u32,
    pub scan_period: u32,
    pub channel_en: u32,
    pub sample_num: u32,
    pub sample_cnt: u32,
    pub baud_div: u32,
}

/// Scan period in bridge clock cycles for a target sample rate
///
/// A rate of 0 yields 0, which disables periodic scanning.
pub fn scan_period(clock_hz: u32, sample_rate: u32) -> u32 {
    if sample_rate == 0 {
        0
    } else {
        clock_hz / sample_rate
    }
}

/// SPI clock divisor for a target chip SPI frequency, floored at [`MIN_BAUD_DIV`]
pub fn baud_divisor(clock_hz: u32, spi_hz: u32) -> u32 {
    if spi_hz == 0 {
        return MIN_BAUD_DIV;
    }
    (clock_hz / spi_hz).max(MIN_BAUD_DIV)
}
