//! ADS8688 device lifecycle
//!
//! [`Ads8688::open`] brings one bridge instance and its chip into a known
//! state. Dropping or [closing](Ads8688::close) an opened device disables
//! every channel and powers all of them down before the bus is let go.

use ads8688_core::bridge::ControlRegisterBlock;
use ads8688_core::channel::{
    enable_mask, power_down_mask, ChannelConfig, ChannelSelect, MAX_CHANNELS, OPEN_FLAG_CHANNELS,
};
use ads8688_core::chip::{ChipCommand, Mode, Range};
use ads8688_core::config::BridgeConfig;
use ads8688_core::state::{SampleState, SampleStatus};
use ads8688_core::{Error, Result};
use ads8688_hal::RegisterBus;
use embedded_hal::delay::DelayNs;

use crate::bridge::RegisterBridge;
use crate::chip::channels::{get_field, get_range, set_field, set_range};
use crate::chip::{ChipRegisters, MaskField};

/// One logical ADC: a bridge instance and the chip behind it
pub struct Ads8688<B: RegisterBus, D: DelayNs> {
    bridge: RegisterBridge<B, D>,
    channels: ChannelConfig,
    opened: bool,
}

impl<B: RegisterBus, D: DelayNs> Ads8688<B, D> {
    /// Open instance `index` of the board described by `config`
    ///
    /// Resets the bridge and the chip, selects mode 0, sets every channel
    /// to `range`, and enables the first four channels per
    /// `channel_enable`. Channels 0-3 not enabled are powered down.
    ///
    /// A failed bridge or chip reset aborts the open; the bus is dropped.
    pub fn open(
        bus: B,
        delay: D,
        config: &BridgeConfig,
        index: usize,
        channel_enable: [bool; OPEN_FLAG_CHANNELS],
        range: Range,
    ) -> Result<Self> {
        config.validate().map_err(|_| Error::InvalidArgument)?;
        let base = config.base_address(index).ok_or(Error::InvalidArgument)?;

        let mut bridge = RegisterBridge::init(bus, delay, base, config)?;
        bridge.set_spi_divider(config.baud_divisor())?;
        bridge.reset_chip().inspect_err(|_| warn!("chip reset failed"))?;

        let mut device = Self {
            bridge,
            channels: ChannelConfig::default(),
            opened: false,
        };
        device.bridge.set_mode(Mode::Mode0)?;

        for ch in 0..MAX_CHANNELS as u8 {
            set_range(&mut device.bridge, ch, range)?;
            device.channels.range[ch as usize] = get_range(&mut device.bridge, ch)?;
        }

        let en = enable_mask(&channel_enable);
        set_field(&mut device.bridge, MaskField::Enable, ChannelSelect::All, en)?;
        device.channels.channel_en =
            get_field(&mut device.bridge, MaskField::Enable, ChannelSelect::All)?;

        let pd = power_down_mask(en);
        set_field(&mut device.bridge, MaskField::PowerDown, ChannelSelect::All, pd)?;
        device.channels.channel_pd =
            get_field(&mut device.bridge, MaskField::PowerDown, ChannelSelect::All)?;

        device.opened = true;
        info!(
            "ads8688[{=usize}] open: en={=u8:#x} pd={=u8:#x}",
            index, device.channels.channel_en, device.channels.channel_pd
        );
        Ok(device)
    }

    /// Disable and power down every channel, then release the instance
    ///
    /// The instance is gone even when the shutdown writes fail; the first
    /// failure is returned.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.opened {
            return Ok(());
        }
        self.opened = false;
        self.channels.channel_en = ChannelConfig::SHUTDOWN.channel_en;
        self.channels.channel_pd = ChannelConfig::SHUTDOWN.channel_pd;

        let en = set_field(
            &mut self.bridge,
            MaskField::Enable,
            ChannelSelect::All,
            ChannelConfig::SHUTDOWN.channel_en,
        );
        let pd = set_field(
            &mut self.bridge,
            MaskField::PowerDown,
            ChannelSelect::All,
            ChannelConfig::SHUTDOWN.channel_pd,
        );
        info!("ads8688 at {=u32:#x} closed", self.bridge.base());
        en.and(pd).map(|_| ())
    }

    /// Write a chip program register
    pub fn write_register(&mut self, addr: u8, data: u8) -> Result<()> {
        self.bridge.write_chip_register(addr, data)
    }

    /// Read a chip program register
    pub fn read_register(&mut self, addr: u8) -> Result<u8> {
        self.bridge.read_chip_register(addr)
    }

    /// Reset chip program registers to defaults
    ///
    /// The channel cache is not refreshed; call the getters to resync.
    pub fn reset_chip(&mut self) -> Result<()> {
        self.bridge.reset_chip()
    }

    /// Select the output frame mode
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.bridge.set_mode(mode)
    }

    /// Send a command word
    pub fn send_command(&mut self, command: ChipCommand) -> Result<u16> {
        self.bridge.send_command(command)
    }

    /// Enable a channel (`value` non-zero) or write the whole enable mask
    pub fn set_channel_enable(&mut self, select: ChannelSelect, value: u8) -> Result<()> {
        self.channels.channel_en = set_field(&mut self.bridge, MaskField::Enable, select, value)?;
        Ok(())
    }

    /// Read a channel's enable bit, or the whole mask
    pub fn get_channel_enable(&mut self, select: ChannelSelect) -> Result<u8> {
        let value = get_field(&mut self.bridge, MaskField::Enable, select)?;
        if select == ChannelSelect::All {
            self.channels.channel_en = value;
        }
        Ok(value)
    }

    /// Power a channel down (`value` non-zero) or write the whole mask
    pub fn set_channel_power_down(&mut self, select: ChannelSelect, value: u8) -> Result<()> {
        self.channels.channel_pd =
            set_field(&mut self.bridge, MaskField::PowerDown, select, value)?;
        Ok(())
    }

    /// Read a channel's power-down bit, or the whole mask
    pub fn get_channel_power_down(&mut self, select: ChannelSelect) -> Result<u8> {
        let value = get_field(&mut self.bridge, MaskField::PowerDown, select)?;
        if select == ChannelSelect::All {
            self.channels.channel_pd = value;
        }
        Ok(value)
    }

    /// Program a channel's input range
    pub fn set_channel_range(&mut self, channel: u8, range: Range) -> Result<()> {
        set_range(&mut self.bridge, channel, range)?;
        self.channels.range[channel as usize] = range.code();
        Ok(())
    }

    /// Read a channel's raw range code
    pub fn get_channel_range(&mut self, channel: u8) -> Result<u8> {
        let code = get_range(&mut self.bridge, channel)?;
        self.channels.range[channel as usize] = code;
        Ok(code)
    }

    /// Arm a scan; see [`RegisterBridge::start_sample`]
    pub fn start_sample(&mut self, sample_num: u32, sample_rate: u32) -> Result<()> {
        self.bridge.start_sample(sample_num, sample_rate)
    }

    /// Reprogram the scan rate; see [`RegisterBridge::set_sample_rate`]
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        self.bridge.set_sample_rate(sample_rate)
    }

    /// Poll the sampler; see [`RegisterBridge::check_sample`]
    pub fn check_sample(&mut self) -> Result<SampleStatus> {
        self.bridge.check_sample()
    }

    /// Select the external reference
    pub fn set_reference_select(&mut self, external: bool) {
        self.bridge.set_reference_select(external)
    }

    /// Channel configuration as last written or read
    pub fn channel_config(&self) -> &ChannelConfig {
        &self.channels
    }

    /// Bridge register mirror
    pub fn registers(&self) -> &ControlRegisterBlock {
        self.bridge.cache()
    }

    /// Sampler state
    pub fn sample_state(&self) -> SampleState {
        self.bridge.sample_state()
    }

    /// Direct access to the bridge
    pub fn bridge_mut(&mut self) -> &mut RegisterBridge<B, D> {
        &mut self.bridge
    }
}

impl<B: RegisterBus, D: DelayNs> Drop for Ads8688<B, D> {
    fn drop(&mut self) {
        if let Err(_e) = self.shutdown() {
            warn!("ads8688 force-off failed: {}", _e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NoDelay, SimulatedBridge};
    use ads8688_core::bridge::{reg, CtrlReg};
    use ads8688_core::chip::reg as chip_reg;
    use ads8688_core::config::PollConfig;

    fn board() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.poll = PollConfig::spin(100);
        config
    }

    fn sim_for(index: usize) -> SimulatedBridge {
        SimulatedBridge::new(board().base_address(index).unwrap())
    }

    fn open(
        sim: &SimulatedBridge,
        flags: [bool; 4],
        range: Range,
    ) -> Result<Ads8688<SimulatedBridge, NoDelay>> {
        Ads8688::open(sim.clone(), NoDelay, &board(), 0, flags, range)
    }

    #[test]
    fn test_open_programs_masks() {
        let sim = sim_for(0);
        let dev = open(&sim, [true, false, true, false], Range::Bipolar2V5).unwrap();

        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0b0101);
        assert_eq!(sim.chip_register(chip_reg::CH_PD), 0b1010);
        assert_eq!(dev.channel_config().channel_en, 0b0101);
        assert_eq!(dev.channel_config().channel_pd, 0b1010);
        assert_eq!(dev.channel_config().enabled_channels().as_slice(), &[0u8, 2]);
        assert_eq!(dev.channel_config().range[0], Range::Bipolar2V5.code());
        assert_eq!(dev.channel_config().range[2], Range::Bipolar2V5.code());
    }

    #[test]
    fn test_open_resets_and_configures() {
        let sim = sim_for(0);
        sim.set_chip_register(chip_reg::FEATURE_SELECT, 0x03);
        let dev = open(&sim, [true; 4], Range::Unipolar1V25).unwrap();

        assert_eq!(sim.bridge_resets(), 1);
        assert_eq!(sim.chip_resets(), 1);
        assert_eq!(sim.loaded_baud_div(), Some(7));
        assert_eq!(sim.chip_register(chip_reg::FEATURE_SELECT), 0x28);
        for ch in 0..8u8 {
            assert_eq!(sim.chip_register(chip_reg::range_select(ch)), 6);
        }
        assert_eq!(dev.channel_config().range, [6; MAX_CHANNELS]);
        assert_eq!(dev.sample_state(), SampleState::Idle);
    }

    #[test]
    fn test_open_uses_instance_base() {
        let sim = sim_for(2);
        let dev = Ads8688::open(sim.clone(), NoDelay, &board(), 2, [true; 4], Range::default());
        assert!(dev.is_ok());
        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0x0F);
    }

    #[test]
    fn test_open_rejects_bad_index_and_config() {
        let sim = sim_for(0);
        assert!(matches!(
            Ads8688::open(sim.clone(), NoDelay, &board(), 4, [true; 4], Range::default()),
            Err(Error::InvalidArgument)
        ));

        let mut config = board();
        config.fpga_clock_hz = 0;
        assert!(matches!(
            Ads8688::open(sim.clone(), NoDelay, &config, 0, [true; 4], Range::default()),
            Err(Error::InvalidArgument)
        ));
        assert_eq!(sim.write_count(), 0);
    }

    #[test]
    fn test_open_aborts_on_bridge_reset_timeout() {
        let sim = sim_for(0);
        sim.stick_reset(true);

        assert!(matches!(
            open(&sim, [true; 4], Range::default()),
            Err(Error::Timeout)
        ));
        assert_eq!(sim.chip_resets(), 0);
    }

    #[test]
    fn test_open_aborts_on_chip_reset_failure() {
        let sim = sim_for(0);
        sim.fail_next_transfer();

        assert!(matches!(
            open(&sim, [true; 4], Range::default()),
            Err(Error::TransferFailed)
        ));
        // Never opened, so nothing forced off
        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0xFF);
        assert_eq!(sim.chip_register(chip_reg::CH_PD), 0x00);
    }

    #[test]
    fn test_close_forces_channels_off() {
        let sim = sim_for(0);
        let dev = open(&sim, [true; 4], Range::default()).unwrap();

        assert_eq!(dev.close(), Ok(()));
        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0x00);
        assert_eq!(sim.chip_register(chip_reg::CH_PD), 0xFF);
    }

    #[test]
    fn test_drop_forces_channels_off() {
        let sim = sim_for(0);
        {
            let _dev = open(&sim, [false, true, false, false], Range::default()).unwrap();
            assert_eq!(sim.chip_register(chip_reg::CH_EN), 0b0010);
        }
        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0x00);
        assert_eq!(sim.chip_register(chip_reg::CH_PD), 0xFF);
    }

    #[test]
    fn test_close_reports_failure() {
        let sim = sim_for(0);
        let dev = open(&sim, [true; 4], Range::default()).unwrap();
        sim.fail_next_transfer();

        assert_eq!(dev.close(), Err(Error::TransferFailed));
        // Power-down still written after the failed enable write
        assert_eq!(sim.chip_register(chip_reg::CH_PD), 0xFF);
    }

    #[test]
    fn test_channel_accessors() {
        let sim = sim_for(0);
        let mut dev = open(&sim, [true, false, false, false], Range::default()).unwrap();

        dev.set_channel_enable(ChannelSelect::Channel(5), 1).unwrap();
        assert_eq!(sim.chip_register(chip_reg::CH_EN), 0b0010_0001);
        assert_eq!(dev.get_channel_enable(ChannelSelect::Channel(5)), Ok(1));
        assert_eq!(dev.get_channel_enable(ChannelSelect::Channel(1)), Ok(0));

        dev.set_channel_power_down(ChannelSelect::All, 0xF0).unwrap();
        assert_eq!(dev.get_channel_power_down(ChannelSelect::All), Ok(0xF0));
        assert_eq!(dev.channel_config().channel_pd, 0xF0);

        dev.set_channel_range(3, Range::Bipolar0V625).unwrap();
        assert_eq!(dev.get_channel_range(3), Ok(2));
        assert_eq!(dev.channel_config().range[3], 2);

        assert_eq!(
            dev.set_channel_enable(ChannelSelect::Channel(8), 1),
            Err(Error::InvalidArgument)
        );
        assert_eq!(dev.get_channel_range(8), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_raw_register_access() {
        let sim = sim_for(0);
        let mut dev = open(&sim, [true; 4], Range::default()).unwrap();

        dev.write_register(chip_reg::range_select(1), 0x05).unwrap();
        assert_eq!(dev.read_register(chip_reg::range_select(1)), Ok(0x05));
        assert_eq!(dev.set_mode(Mode::Mode1), Ok(()));
        assert_eq!(sim.chip_register(chip_reg::FEATURE_SELECT), 0x29);
    }

    #[test]
    fn test_scan_end_to_end() {
        let sim = sim_for(0);
        let mut dev = open(&sim, [true; 4], Range::default()).unwrap();

        assert_eq!(dev.start_sample(1000, 10_000), Ok(()));
        assert_eq!(sim.peek(reg::SCAN_PERIOD), 12_000);
        assert_eq!(dev.sample_state(), SampleState::AutoScanning);

        sim.advance_scan(10);
        assert_eq!(dev.check_sample(), Ok(SampleStatus::InProgress));
        assert_eq!(dev.registers().sample_cnt, 990);

        sim.finish_scan();
        assert_eq!(dev.check_sample(), Ok(SampleStatus::Complete));
        assert_eq!(sim.peek(reg::CTRL) & CtrlReg::AUTO_MODE, 0);
    }

    #[test]
    fn test_scan_needs_enabled_channel() {
        let sim = sim_for(0);
        let mut dev = open(&sim, [false; 4], Range::default()).unwrap();

        assert_eq!(dev.start_sample(10, 1000), Err(Error::NoChannelEnabled));
    }

    #[test]
    fn test_scan_error_clears_status() {
        let sim = sim_for(0);
        let mut dev = open(&sim, [true; 4], Range::default()).unwrap();

        dev.start_sample(100, 1000).unwrap();
        sim.fail_scan(true, 3);
        assert_eq!(dev.check_sample(), Err(Error::SampleError));
        assert_eq!(sim.peek(reg::STATUS), 0);
        assert_eq!(dev.sample_state(), SampleState::Errored);
    }

    #[test]
    fn test_shared_bus_survives_device() {
        let mut sim = sim_for(0);
        {
            let dev = Ads8688::open(&mut sim, NoDelay, &board(), 0, [true; 4], Range::default());
            assert!(dev.is_ok());
        }
        assert_eq!(sim.chip_register(chip_reg::CH_PD), 0xFF);
    }
}
