//! Auto-scan sample controller
//!
//! The bridge samples every enabled chip channel once per scan period and
//! counts `sample_num` down in SAMPLE_CNT. A scan is armed with
//! `sample_req` and runs while `auto_mode` is set. Auto-mode is always
//! dropped before the period or count are reprogrammed.

use ads8688_core::bridge::{reg, scan_period, STATUS_CLEAR_ALL};
use ads8688_core::state::{SampleEvent, SampleStatus};
use ads8688_core::{Error, Result};
use ads8688_hal::RegisterBus;
use embedded_hal::delay::DelayNs;

use super::RegisterBridge;

impl<B: RegisterBus, D: DelayNs> RegisterBridge<B, D> {
    /// Arm a scan of `sample_num` samples at `sample_rate` Hz
    ///
    /// Arguments are validated before any register is touched. A rate of 0
    /// programs the registers but leaves the scan unarmed.
    pub fn start_sample(&mut self, sample_num: u32, sample_rate: u32) -> Result<()> {
        if sample_num == 0 || sample_num > self.max_sample_num {
            return Err(Error::InvalidArgument);
        }
        if sample_rate > self.clock_hz {
            return Err(Error::InvalidArgument);
        }

        self.cache.channel_en = self.regs.read(reg::CHANNEL_EN);
        if self.cache.channel_en == 0 {
            warn!("start_sample with no channel enabled");
            return Err(Error::NoChannelEnabled);
        }
        if self.refresh_status().sample_busy() {
            return Err(Error::SampleBusy);
        }

        self.state = self.state.transition(SampleEvent::Configure);
        let period = scan_period(self.clock_hz, sample_rate);

        self.set_auto_mode(false);
        self.cache.scan_period = self.write_verified(reg::SCAN_PERIOD, period);
        self.cache.sample_num = self.write_verified(reg::SAMPLE_NUM, sample_num);

        if self.cache.scan_period > 0 {
            self.modify_ctrl(|ctrl| ctrl.with_sample_req(true));
            self.set_auto_mode(true);
            self.state = self.state.transition(SampleEvent::Armed);
            info!(
                "scan armed: {=u32} samples, period {=u32}",
                sample_num, self.cache.scan_period
            );
        } else {
            self.state = self.state.transition(SampleEvent::Disarmed);
            debug!("scan programmed with zero period, not armed");
        }
        Ok(())
    }

    /// Reprogram the scan period for `sample_rate` Hz
    ///
    /// With no channel enabled the period is forced to 0 and auto-mode
    /// stays off.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        if sample_rate > self.clock_hz {
            return Err(Error::InvalidArgument);
        }

        self.cache.channel_en = self.regs.read(reg::CHANNEL_EN);
        let period = if self.cache.channel_en != 0 {
            scan_period(self.clock_hz, sample_rate)
        } else {
            0
        };

        self.set_auto_mode(false);
        self.cache.scan_period = self.write_verified(reg::SCAN_PERIOD, period);

        if self.cache.scan_period > 0 {
            self.set_auto_mode(true);
            self.state = self.state.transition(SampleEvent::Armed);
        } else {
            self.state = self.state.transition(SampleEvent::Disarmed);
        }
        debug!("sample rate {=u32} Hz, period {=u32}", sample_rate, period);
        Ok(())
    }

    /// Poll the sampler
    ///
    /// While the bridge reports `sample_busy` the telemetry mirror is
    /// refreshed and `InProgress` returned. Otherwise auto-mode is dropped
    /// and the scan judged: an error flag or a residual count clears every
    /// status flag and fails with `SampleError`.
    pub fn check_sample(&mut self) -> Result<SampleStatus> {
        let status = self.refresh_status();

        if status.sample_busy() {
            self.cache.scan_period = self.regs.read(reg::SCAN_PERIOD);
            self.cache.channel_en = self.regs.read(reg::CHANNEL_EN);
            self.cache.sample_cnt = self.regs.read(reg::SAMPLE_CNT);
            self.cache.sample_num = self.regs.read(reg::SAMPLE_NUM);
            return Ok(SampleStatus::InProgress);
        }

        self.set_auto_mode(false);
        self.cache.sample_cnt = self.regs.read(reg::SAMPLE_CNT);

        if status.sample_err() || self.cache.sample_cnt != 0 {
            self.regs.write(reg::STATUS, STATUS_CLEAR_ALL);
            self.refresh_status();
            self.state = self.state.transition(SampleEvent::Failed);
            warn!(
                "scan failed: err={=bool} residual={=u32}",
                status.sample_err(),
                self.cache.sample_cnt
            );
            return Err(Error::SampleError);
        }

        self.cache.sample_num = self.regs.read(reg::SAMPLE_NUM);
        self.state = self.state.transition(SampleEvent::Finished);
        Ok(SampleStatus::Complete)
    }

    /// Samples still to be taken, from the last refresh
    pub fn samples_remaining(&self) -> u32 {
        self.cache.sample_cnt
    }

    /// Scan period in bridge clock cycles, from the last refresh
    pub fn scan_period(&self) -> u32 {
        self.cache.scan_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NoDelay, SimulatedBridge};
    use ads8688_core::bridge::{CtrlReg, StatusReg};
    use ads8688_core::chip::reg as chip_reg;
    use ads8688_core::config::BridgeConfig;
    use ads8688_core::state::SampleState;
    use proptest::prelude::*;

    const BASE: u32 = 0x43C2_0000;

    fn bridge(sim: &SimulatedBridge) -> RegisterBridge<SimulatedBridge, NoDelay> {
        RegisterBridge::new(sim.clone(), NoDelay, BASE, &BridgeConfig::default())
    }

    fn with_channels(mask: u8) -> SimulatedBridge {
        let sim = SimulatedBridge::new(BASE);
        sim.set_chip_register(chip_reg::CH_EN, mask);
        sim
    }

    #[test]
    fn test_start_programs_and_arms() {
        let sim = with_channels(0x0F);
        let mut bridge = bridge(&sim);

        assert_eq!(bridge.start_sample(1000, 10_000), Ok(()));
        assert_eq!(sim.peek(reg::SCAN_PERIOD), 12_000);
        assert_eq!(sim.peek(reg::SAMPLE_NUM), 1000);
        assert_eq!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, CtrlReg::AUTO_MODE);
        assert!(sim.peek(reg::STATUS) & StatusReg::SAMPLE_BUSY != 0);
        assert_eq!(bridge.sample_state(), SampleState::AutoScanning);
    }

    #[test]
    fn test_sample_limits_checked_before_any_write() {
        let sim = with_channels(0x0F);
        let mut bridge = bridge(&sim);

        assert_eq!(bridge.start_sample(0, 1000), Err(Error::InvalidArgument));
        assert_eq!(bridge.start_sample(65_537, 1000), Err(Error::InvalidArgument));
        assert_eq!(
            bridge.start_sample(10, 120_000_001),
            Err(Error::InvalidArgument)
        );
        assert_eq!(sim.write_count(), 0);
        assert_eq!(bridge.sample_state(), SampleState::Idle);
    }

    #[test]
    fn test_largest_scan_accepted() {
        let sim = with_channels(0x01);
        let mut bridge = bridge(&sim);
        assert_eq!(bridge.start_sample(65_536, 1000), Ok(()));
    }

    #[test]
    fn test_no_channel_enabled() {
        let sim = with_channels(0x00);
        let mut bridge = bridge(&sim);

        assert_eq!(bridge.start_sample(10, 1000), Err(Error::NoChannelEnabled));
        assert_eq!(sim.write_count(), 0);
    }

    #[test]
    fn test_running_scan_rejected() {
        let sim = with_channels(0x01);
        let mut bridge = bridge(&sim);

        bridge.start_sample(100, 1000).unwrap();
        assert_eq!(bridge.start_sample(100, 1000), Err(Error::SampleBusy));
    }

    #[test]
    fn test_zero_rate_leaves_scan_unarmed() {
        let sim = with_channels(0x01);
        let mut bridge = bridge(&sim);

        assert_eq!(bridge.start_sample(100, 0), Ok(()));
        assert_eq!(sim.peek(reg::SCAN_PERIOD), 0);
        assert_eq!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, 0);
        assert_eq!(sim.peek(reg::STATUS) & StatusReg::SAMPLE_BUSY, 0);
        assert_eq!(bridge.sample_state(), SampleState::Idle);
    }

    #[test]
    fn test_rate_zero_disables_auto_mode() {
        let sim = with_channels(0x03);
        let mut bridge = bridge(&sim);

        bridge.set_sample_rate(1000).unwrap();
        assert_ne!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, 0);

        bridge.set_sample_rate(0).unwrap();
        assert_eq!(sim.peek(reg::SCAN_PERIOD), 0);
        assert_eq!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, 0);
    }

    #[test]
    fn test_rate_without_channels_forces_zero_period() {
        let sim = with_channels(0x00);
        let mut bridge = bridge(&sim);

        assert_eq!(bridge.set_sample_rate(1000), Ok(()));
        assert_eq!(sim.peek(reg::SCAN_PERIOD), 0);
        assert_eq!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, 0);
    }

    #[test]
    fn test_rate_above_clock_rejected() {
        let sim = with_channels(0x01);
        let mut bridge = bridge(&sim);

        assert_eq!(
            bridge.set_sample_rate(120_000_001),
            Err(Error::InvalidArgument)
        );
        assert_eq!(sim.write_count(), 0);
    }

    #[test]
    fn test_progress_then_complete() {
        let sim = with_channels(0x0F);
        let mut bridge = bridge(&sim);

        bridge.start_sample(1000, 10_000).unwrap();
        sim.advance_scan(400);
        assert_eq!(bridge.check_sample(), Ok(SampleStatus::InProgress));
        assert_eq!(bridge.samples_remaining(), 600);
        assert_eq!(bridge.scan_period(), 12_000);

        sim.finish_scan();
        assert_eq!(bridge.check_sample(), Ok(SampleStatus::Complete));
        assert_eq!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, 0);
        assert_eq!(bridge.cache().sample_num, 1000);
        assert_eq!(bridge.sample_state(), SampleState::Idle);
    }

    #[test]
    fn test_error_flag_clears_status() {
        let sim = with_channels(0x0F);
        let mut bridge = bridge(&sim);

        bridge.start_sample(1000, 10_000).unwrap();
        sim.fail_scan(true, 0);

        assert_eq!(bridge.check_sample(), Err(Error::SampleError));
        assert_eq!(sim.peek(reg::STATUS) & StatusReg::SAMPLE_ERR, 0);
        assert_eq!(sim.peek(reg::STATUS) & StatusReg::SAMPLE_DONE, 0);
        assert_eq!(bridge.sample_state(), SampleState::Errored);
    }

    #[test]
    fn test_residual_count_is_error() {
        let sim = with_channels(0x0F);
        let mut bridge = bridge(&sim);

        bridge.start_sample(1000, 10_000).unwrap();
        sim.fail_scan(false, 17);

        assert_eq!(bridge.check_sample(), Err(Error::SampleError));
        assert_eq!(bridge.samples_remaining(), 17);

        // A new scan may start after the failure
        assert_eq!(bridge.start_sample(10, 10_000), Ok(()));
        assert_eq!(bridge.sample_state(), SampleState::AutoScanning);
    }

    #[test]
    fn test_zero_rate_after_failed_scan_is_idle() {
        let sim = with_channels(0x0F);
        let mut bridge = bridge(&sim);

        bridge.start_sample(1000, 10_000).unwrap();
        sim.fail_scan(true, 0);
        assert_eq!(bridge.check_sample(), Err(Error::SampleError));
        assert_eq!(bridge.sample_state(), SampleState::Errored);

        assert_eq!(bridge.set_sample_rate(0), Ok(()));
        assert_eq!(bridge.sample_state(), SampleState::Idle);
    }

    proptest! {
        #[test]
        fn period_is_floor_of_clock_over_rate(rate in 1u32..=120_000_000) {
            let sim = with_channels(0x01);
            let mut bridge = bridge(&sim);

            prop_assert_eq!(bridge.set_sample_rate(rate), Ok(()));
            prop_assert_eq!(sim.peek(reg::SCAN_PERIOD), 120_000_000 / rate);
        }
    }
}
