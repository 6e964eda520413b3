//! FPGA register bridge driver
//!
//! One [`RegisterBridge`] owns the register block of a single bridge
//! instance. It keeps a software mirror of the control registers, the
//! sampler state, and the poll budget shared by every handshake.
//!
//! - [`transaction`] - SPI engine handshake
//! - [`scan`] - auto-scan sample controller

pub mod scan;
pub mod transaction;

use ads8688_core::bridge::{reg, ControlRegisterBlock, CtrlReg, StatusReg, MIN_BAUD_DIV};
use ads8688_core::config::{BridgeConfig, PollConfig};
use ads8688_core::state::SampleState;
use ads8688_core::{Error, Result};
use ads8688_hal::{RegisterBlock, RegisterBus};
use embedded_hal::delay::DelayNs;

/// Driver for one bridge instance
pub struct RegisterBridge<B, D> {
    regs: RegisterBlock<B>,
    delay: D,
    poll: PollConfig,
    clock_hz: u32,
    max_sample_num: u32,
    cache: ControlRegisterBlock,
    state: SampleState,
}

impl<B: RegisterBus, D: DelayNs> RegisterBridge<B, D> {
    /// Bind a bus to the instance at `base` without touching hardware
    pub fn new(bus: B, delay: D, base: u32, config: &BridgeConfig) -> Self {
        Self {
            regs: RegisterBlock::new(bus, base),
            delay,
            poll: config.poll,
            clock_hz: config.fpga_clock_hz,
            max_sample_num: config.max_sample_num,
            cache: ControlRegisterBlock::default(),
            state: SampleState::Idle,
        }
    }

    /// Bind and soft-reset the bridge
    pub fn init(bus: B, delay: D, base: u32, config: &BridgeConfig) -> Result<Self> {
        let mut bridge = Self::new(bus, delay, base, config);
        bridge.soft_reset()?;
        debug!("bridge at {=u32:#x} reset", base);
        Ok(bridge)
    }

    /// Base address of this instance
    pub fn base(&self) -> u32 {
        self.regs.base()
    }

    /// Bridge clock (Hz)
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Largest accepted sample count
    pub fn max_sample_num(&self) -> u32 {
        self.max_sample_num
    }

    /// Register mirror as of the last access
    pub fn cache(&self) -> &ControlRegisterBlock {
        &self.cache
    }

    /// Current sampler state
    pub fn sample_state(&self) -> SampleState {
        self.state
    }

    /// Give back the bus and delay
    pub fn release(self) -> (B, D) {
        (self.regs.release(), self.delay)
    }

    /// Reset the bridge and wait for `soft_rst` to self-clear
    ///
    /// Other CTRL bits are written as zero, so auto-mode ends up disabled.
    pub fn soft_reset(&mut self) -> Result<()> {
        let ctrl = CtrlReg::default().with_soft_rst(true);
        self.regs.write(reg::CTRL, ctrl.0);

        self.poll_until(|bridge| {
            let ctrl = CtrlReg(bridge.regs.read(reg::CTRL));
            bridge.cache.ctrl = ctrl;
            !ctrl.soft_rst()
        })
        .inspect_err(|_| warn!("bridge soft reset did not complete"))?;

        self.state = SampleState::Idle;
        Ok(())
    }

    /// Set or clear the `auto_mode` bit, preserving the rest of CTRL
    pub fn set_auto_mode(&mut self, enable: bool) {
        let ctrl = self.modify_ctrl(|ctrl| ctrl.with_auto_mode(enable));
        trace!("auto_mode={=bool} ctrl={=u32:#x}", enable, ctrl.0);
    }

    /// Set or clear the `ref_sel` bit, preserving the rest of CTRL
    pub fn set_reference_select(&mut self, external: bool) {
        self.modify_ctrl(|ctrl| ctrl.with_ref_sel(external));
    }

    /// Program the SPI clock divisor and latch it with `baud_load`
    ///
    /// `div` must be in `1..=clock_hz`; values below [`MIN_BAUD_DIV`] are
    /// raised to it.
    pub fn set_spi_divider(&mut self, div: u32) -> Result<()> {
        if div == 0 || div > self.clock_hz {
            return Err(Error::InvalidArgument);
        }
        let div = div.max(MIN_BAUD_DIV);

        self.regs.write(reg::BAUD_DIV, div);
        self.cache.baud_div = div;
        self.modify_ctrl(|ctrl| ctrl.with_baud_load(true));

        debug!("spi divider {=u32}", div);
        Ok(())
    }

    /// Read STATUS into the mirror
    pub fn refresh_status(&mut self) -> StatusReg {
        let status = StatusReg(self.regs.read(reg::STATUS));
        self.cache.status = status;
        status
    }

    /// Read-modify-write CTRL, returning the value written
    ///
    /// Self-clearing bits read back as zero, so only the persistent bits
    /// carry over from the read.
    fn modify_ctrl<F>(&mut self, f: F) -> CtrlReg
    where
        F: FnOnce(CtrlReg) -> CtrlReg,
    {
        let ctrl = CtrlReg(self.regs.modify(reg::CTRL, |raw| f(CtrlReg(raw)).0));
        self.cache.ctrl = ctrl;
        ctrl
    }

    /// Write a register and read it back into the returned value
    fn write_verified(&mut self, offset: u32, value: u32) -> u32 {
        self.regs.write(offset, value);
        self.regs.read(offset)
    }

    /// Re-run `settled` until it returns true or the poll budget runs out
    fn poll_until<F>(&mut self, mut settled: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> bool,
    {
        for _ in 0..self.poll.max_polls {
            if settled(self) {
                return Ok(());
            }
            if self.poll.interval_ns > 0 {
                self.delay.delay_ns(self.poll.interval_ns);
            }
        }
        Err(Error::Timeout)
    }
}
