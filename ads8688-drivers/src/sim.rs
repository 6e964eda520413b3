//! Simulated register bridge
//!
//! A register-level model of one bridge instance with an ADS8688 behind it,
//! for host tests. Handles are cheap clones sharing one state, so a test
//! keeps a handle to inspect and steer the hardware while the driver owns
//! another.
//!
//! Modelled behaviour:
//!
//! - self-clearing CTRL bits, with configurable `soft_rst` latency
//! - SPI transactions against a chip register file, with configurable
//!   `spi_busy` latency, stuck busy and a missing done flag
//! - write-1-to-clear STATUS flags
//! - auto-scan armed by `sample_req`, finished or failed on demand

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use ads8688_core::bridge::{reg, CtrlReg, StatusReg};
use ads8688_core::chip::{reg as chip_reg, AUX_CHANNEL, CMD_RESET, PRE_ENCODED};
use ads8688_hal::RegisterBus;
use embedded_hal::delay::DelayNs;

/// Chip program register file size
const CHIP_REGS: usize = 0x40;

/// STATUS bits a write of 1 clears
const W1C: u32 = StatusReg::SPI_DONE | StatusReg::SAMPLE_ERR | StatusReg::SAMPLE_DONE;

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Debug)]
struct SimState {
    base: u32,

    ctrl: u32,
    status: u32,
    addr: u32,
    wr_data: u32,
    rd_data: u32,
    scan_period: u32,
    sample_num: u32,
    sample_cnt: u32,
    baud_div: u32,
    loaded_baud_div: Option<u32>,

    chip: [u8; CHIP_REGS],
    conversions: [u16; AUX_CHANNEL as usize + 1],
    commands: Vec<u8>,

    spi_latency: u32,
    spi_pending: Option<u32>,
    stuck_spi: bool,
    spi_hung: bool,
    fail_next: bool,

    reset_latency: u32,
    reset_pending: u32,
    stuck_reset: bool,

    writes: u32,
    bridge_resets: u32,
    chip_resets: u32,
}

impl SimState {
    fn new(base: u32) -> Self {
        Self {
            base,
            ctrl: 0,
            status: 0,
            addr: 0,
            wr_data: 0,
            rd_data: 0,
            scan_period: 0,
            sample_num: 0,
            sample_cnt: 0,
            baud_div: 0,
            loaded_baud_div: None,
            chip: chip_defaults(),
            conversions: [0; AUX_CHANNEL as usize + 1],
            commands: Vec::new(),
            spi_latency: 0,
            spi_pending: None,
            stuck_spi: false,
            spi_hung: false,
            fail_next: false,
            reset_latency: 0,
            reset_pending: 0,
            stuck_reset: false,
            writes: 0,
            bridge_resets: 0,
            chip_resets: 0,
        }
    }

    fn read(&mut self, offset: u32) -> u32 {
        match offset {
            reg::CTRL => {
                if self.stuck_reset {
                    return self.ctrl | CtrlReg::SOFT_RST;
                }
                if self.reset_pending > 0 {
                    self.reset_pending -= 1;
                    return self.ctrl | CtrlReg::SOFT_RST;
                }
                self.ctrl
            }
            reg::STATUS => self.read_status(),
            reg::ADDR => self.addr,
            reg::WR_DATA => self.wr_data,
            reg::RD_DATA => self.rd_data,
            reg::SCAN_PERIOD => self.scan_period,
            reg::CHANNEL_EN => self.chip[chip_reg::CH_EN as usize] as u32,
            reg::SAMPLE_NUM => self.sample_num,
            reg::SAMPLE_CNT => self.sample_cnt,
            reg::BAUD_DIV => self.baud_div,
            _ => 0,
        }
    }

    fn read_status(&mut self) -> u32 {
        if self.spi_hung {
            return self.status | StatusReg::SPI_BUSY;
        }
        match self.spi_pending {
            Some(0) => {
                self.spi_pending = None;
                self.complete_transfer();
                self.status
            }
            Some(left) => {
                self.spi_pending = Some(left - 1);
                self.status | StatusReg::SPI_BUSY
            }
            None => self.status,
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        self.writes += 1;
        match offset {
            reg::CTRL => self.write_ctrl(value),
            reg::STATUS => self.status &= !(value & W1C),
            reg::ADDR => self.addr = value & 0xFF,
            reg::WR_DATA => self.wr_data = value & 0xFFFF,
            reg::SCAN_PERIOD => self.scan_period = value,
            reg::SAMPLE_NUM => self.sample_num = value,
            reg::BAUD_DIV => self.baud_div = value,
            // RD_DATA, CHANNEL_EN and SAMPLE_CNT are read-only
            _ => {}
        }
    }

    fn write_ctrl(&mut self, value: u32) {
        self.ctrl = value & !CtrlReg::SELF_CLEARING;

        if value & CtrlReg::SOFT_RST != 0 {
            self.soft_reset();
            return;
        }
        if value & CtrlReg::BAUD_LOAD != 0 {
            self.loaded_baud_div = Some(self.baud_div);
        }
        if value & CtrlReg::SAMPLE_REQ != 0 {
            self.status &= !(StatusReg::SAMPLE_DONE | StatusReg::SAMPLE_ERR);
            self.status |= StatusReg::SAMPLE_BUSY;
            self.sample_cnt = self.sample_num;
        }
        if value & CtrlReg::SPI_START != 0 {
            self.status &= !StatusReg::SPI_DONE;
            if self.stuck_spi {
                self.spi_hung = true;
            } else if self.spi_latency == 0 {
                self.complete_transfer();
            } else {
                self.spi_pending = Some(self.spi_latency);
            }
        }
    }

    fn soft_reset(&mut self) {
        self.bridge_resets += 1;
        self.ctrl = 0;
        self.status = 0;
        self.scan_period = 0;
        self.sample_num = 0;
        self.sample_cnt = 0;
        self.spi_pending = None;
        self.spi_hung = false;
        self.reset_pending = self.reset_latency;
    }

    /// Run the staged exchange against the chip
    fn complete_transfer(&mut self) {
        if self.fail_next {
            self.fail_next = false;
            return;
        }

        let addr = self.addr as u8;
        let data = self.wr_data as u8;
        self.rd_data = 0;

        if addr & PRE_ENCODED != 0 {
            self.commands.push(addr);
            if addr == CMD_RESET {
                self.chip = chip_defaults();
                self.chip_resets += 1;
            } else if addr >= 0xC0 {
                let channel = ((addr - 0xC0) / 4) as usize;
                if let Some(code) = self.conversions.get(channel) {
                    self.rd_data = *code as u32;
                }
            }
        } else if addr & 0x01 != 0 {
            self.chip[(addr >> 1) as usize] = data;
        } else {
            self.rd_data = (self.chip[(addr >> 1) as usize] as u32) << 8;
        }

        self.status |= StatusReg::SPI_DONE;
    }
}

fn chip_defaults() -> [u8; CHIP_REGS] {
    let mut chip = [0u8; CHIP_REGS];
    chip[chip_reg::CH_EN as usize] = 0xFF;
    chip
}

/// Handle to a simulated bridge instance
#[derive(Debug, Clone)]
pub struct SimulatedBridge {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedBridge {
    /// Create an instance mapped at `base`, chip at reset defaults
    pub fn new(base: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState::new(base))),
        }
    }

    /// Read a bridge register without side effects
    pub fn peek(&self, offset: u32) -> u32 {
        let state = self.state.borrow();
        match offset {
            reg::CTRL => state.ctrl,
            reg::STATUS => state.status,
            reg::ADDR => state.addr,
            reg::WR_DATA => state.wr_data,
            reg::RD_DATA => state.rd_data,
            reg::SCAN_PERIOD => state.scan_period,
            reg::CHANNEL_EN => state.chip[chip_reg::CH_EN as usize] as u32,
            reg::SAMPLE_NUM => state.sample_num,
            reg::SAMPLE_CNT => state.sample_cnt,
            reg::BAUD_DIV => state.baud_div,
            _ => 0,
        }
    }

    /// Force a bridge register value, bypassing write semantics
    pub fn poke(&self, offset: u32, value: u32) {
        let mut state = self.state.borrow_mut();
        match offset {
            reg::CTRL => state.ctrl = value,
            reg::STATUS => state.status = value,
            reg::SCAN_PERIOD => state.scan_period = value,
            reg::SAMPLE_NUM => state.sample_num = value,
            reg::SAMPLE_CNT => state.sample_cnt = value,
            reg::BAUD_DIV => state.baud_div = value,
            _ => {}
        }
    }

    /// Chip program register value
    pub fn chip_register(&self, addr: u8) -> u8 {
        self.state.borrow().chip[addr as usize % CHIP_REGS]
    }

    /// Set a chip program register behind the driver's back
    pub fn set_chip_register(&self, addr: u8, value: u8) {
        self.state.borrow_mut().chip[addr as usize % CHIP_REGS] = value;
    }

    /// Conversion code returned for a manual channel select
    pub fn set_conversion(&self, channel: u8, code: u16) {
        if let Some(slot) = self.state.borrow_mut().conversions.get_mut(channel as usize) {
            *slot = code;
        }
    }

    /// STATUS reads reporting `spi_busy` after each `spi_start`
    pub fn set_spi_latency(&self, reads: u32) {
        self.state.borrow_mut().spi_latency = reads;
    }

    /// CTRL reads reporting `soft_rst` after each reset
    pub fn set_reset_latency(&self, reads: u32) {
        self.state.borrow_mut().reset_latency = reads;
    }

    /// Leave `spi_busy` asserted after the next `spi_start`
    pub fn stick_spi_busy(&self, stuck: bool) {
        self.state.borrow_mut().stuck_spi = stuck;
    }

    /// Keep `soft_rst` asserted
    pub fn stick_reset(&self, stuck: bool) {
        self.state.borrow_mut().stuck_reset = stuck;
    }

    /// Finish the next transaction without `spi_done` and without effect
    pub fn fail_next_transfer(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    /// Take `samples` samples of the running scan
    pub fn advance_scan(&self, samples: u32) {
        let mut state = self.state.borrow_mut();
        state.sample_cnt = state.sample_cnt.saturating_sub(samples);
    }

    /// End the running scan cleanly
    pub fn finish_scan(&self) {
        let mut state = self.state.borrow_mut();
        state.sample_cnt = 0;
        state.status &= !StatusReg::SAMPLE_BUSY;
        state.status |= StatusReg::SAMPLE_DONE;
    }

    /// End the running scan with the error flag and/or samples left over
    pub fn fail_scan(&self, error_flag: bool, residual: u32) {
        let mut state = self.state.borrow_mut();
        state.sample_cnt = residual;
        state.status &= !StatusReg::SAMPLE_BUSY;
        state.status |= StatusReg::SAMPLE_DONE;
        if error_flag {
            state.status |= StatusReg::SAMPLE_ERR;
        }
    }

    /// Divisor latched by the last `baud_load`
    pub fn loaded_baud_div(&self) -> Option<u32> {
        self.state.borrow().loaded_baud_div
    }

    /// Command words sent, oldest first
    pub fn commands(&self) -> Vec<u8> {
        self.state.borrow().commands.clone()
    }

    /// Register writes seen so far
    pub fn write_count(&self) -> u32 {
        self.state.borrow().writes
    }

    /// Bridge soft resets seen so far
    pub fn bridge_resets(&self) -> u32 {
        self.state.borrow().bridge_resets
    }

    /// Chip reset commands seen so far
    pub fn chip_resets(&self) -> u32 {
        self.state.borrow().chip_resets
    }
}

impl RegisterBus for SimulatedBridge {
    fn read32(&mut self, address: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        let offset = address.wrapping_sub(state.base);
        state.read(offset)
    }

    fn write32(&mut self, address: u32, value: u32) {
        let mut state = self.state.borrow_mut();
        let offset = address.wrapping_sub(state.base);
        state.write(offset, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 0x4000_0000;

    #[test]
    fn test_addressing_is_relative_to_base() {
        let mut sim = SimulatedBridge::new(BASE);
        sim.write32(BASE + reg::SAMPLE_NUM, 42);
        assert_eq!(sim.read32(BASE + reg::SAMPLE_NUM), 42);
        assert_eq!(sim.peek(reg::SAMPLE_NUM), 42);
    }

    #[test]
    fn test_self_clearing_bits_never_stick() {
        let mut sim = SimulatedBridge::new(BASE);
        sim.write32(BASE + reg::CTRL, CtrlReg::AUTO_MODE | CtrlReg::BAUD_LOAD);
        assert_eq!(sim.read32(BASE + reg::CTRL), CtrlReg::AUTO_MODE);
    }

    #[test]
    fn test_status_write_one_to_clear() {
        let mut sim = SimulatedBridge::new(BASE);
        sim.poke(reg::STATUS, StatusReg::SAMPLE_BUSY | StatusReg::SAMPLE_ERR);
        sim.write32(BASE + reg::STATUS, 0xFF);
        assert_eq!(sim.peek(reg::STATUS), StatusReg::SAMPLE_BUSY);
    }

    #[test]
    fn test_spi_latency() {
        let mut sim = SimulatedBridge::new(BASE);
        sim.set_spi_latency(2);
        sim.write32(BASE + reg::ADDR, 0x03);
        sim.write32(BASE + reg::WR_DATA, 0x11);
        sim.write32(BASE + reg::CTRL, CtrlReg::SPI_START);

        assert_ne!(sim.read32(BASE + reg::STATUS) & StatusReg::SPI_BUSY, 0);
        assert_ne!(sim.read32(BASE + reg::STATUS) & StatusReg::SPI_BUSY, 0);
        assert_eq!(sim.read32(BASE + reg::STATUS), StatusReg::SPI_DONE);
        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0x11);
    }
}
