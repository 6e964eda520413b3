//! Shared device access
//!
//! A device is driven by short register sequences that must not interleave.
//! [`SharedAds8688`] runs every operation under a caller-chosen mutex, so
//! one instance can be reached from several tasks or threads.

use core::cell::RefCell;
use core::marker::PhantomData;

use ads8688_core::chip::Range;
use ads8688_core::channel::ChannelSelect;
use ads8688_core::state::SampleStatus;
use ads8688_core::Result;
use ads8688_hal::RegisterBus;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;

use crate::device::Ads8688;

/// A mutex that can lend out `&mut T` for the length of a closure
pub trait DeviceMutex<T> {
    /// Run `f` with exclusive access to the value
    fn lock_device<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<M: RawMutex, T> DeviceMutex<T> for Mutex<M, RefCell<T>> {
    fn lock_device<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

#[cfg(feature = "std")]
impl<T> DeviceMutex<T> for std::sync::Mutex<T> {
    fn lock_device<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        // A panic mid-sequence leaves registers as they are; keep going
        let mut guard = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

/// An [`Ads8688`] behind a mutex
pub struct SharedAds8688<B, D, M> {
    mutex: M,
    _device: PhantomData<fn() -> (B, D)>,
}

impl<B, D, M> SharedAds8688<B, D, M>
where
    B: RegisterBus,
    D: DelayNs,
    M: DeviceMutex<Ads8688<B, D>>,
{
    /// Wrap a mutex holding an opened device
    pub const fn new(mutex: M) -> Self {
        Self {
            mutex,
            _device: PhantomData,
        }
    }

    /// Run a sequence of operations without interruption
    pub fn with<R>(&self, f: impl FnOnce(&mut Ads8688<B, D>) -> R) -> R {
        self.mutex.lock_device(f)
    }

    /// Unwrap the mutex
    pub fn into_inner(self) -> M {
        self.mutex
    }

    pub fn write_register(&self, addr: u8, data: u8) -> Result<()> {
        self.with(|dev| dev.write_register(addr, data))
    }

    pub fn read_register(&self, addr: u8) -> Result<u8> {
        self.with(|dev| dev.read_register(addr))
    }

    pub fn set_channel_enable(&self, select: ChannelSelect, value: u8) -> Result<()> {
        self.with(|dev| dev.set_channel_enable(select, value))
    }

    pub fn get_channel_enable(&self, select: ChannelSelect) -> Result<u8> {
        self.with(|dev| dev.get_channel_enable(select))
    }

    pub fn set_channel_power_down(&self, select: ChannelSelect, value: u8) -> Result<()> {
        self.with(|dev| dev.set_channel_power_down(select, value))
    }

    pub fn get_channel_power_down(&self, select: ChannelSelect) -> Result<u8> {
        self.with(|dev| dev.get_channel_power_down(select))
    }

    pub fn set_channel_range(&self, channel: u8, range: Range) -> Result<()> {
        self.with(|dev| dev.set_channel_range(channel, range))
    }

    pub fn get_channel_range(&self, channel: u8) -> Result<u8> {
        self.with(|dev| dev.get_channel_range(channel))
    }

    pub fn start_sample(&self, sample_num: u32, sample_rate: u32) -> Result<()> {
        self.with(|dev| dev.start_sample(sample_num, sample_rate))
    }

    pub fn set_sample_rate(&self, sample_rate: u32) -> Result<()> {
        self.with(|dev| dev.set_sample_rate(sample_rate))
    }

    pub fn check_sample(&self) -> Result<SampleStatus> {
        self.with(|dev| dev.check_sample())
    }
}
