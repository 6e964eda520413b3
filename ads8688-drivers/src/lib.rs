//! ADS8688 register-bridge driver
//!
//! Drives an ADS8688-class ADC that sits behind an FPGA register bridge.
//! The bridge turns SPI exchanges and autonomous multi-channel sampling into
//! 32-bit register accesses; this crate sequences those accesses:
//!
//! - [`bridge`] - SPI transaction engine and auto-scan sample controller
//! - [`chip`] - chip register façade and channel configuration
//! - [`device`] - open/close lifecycle of one logical ADC
//! - [`shared`] - mutex wrapper for access from several contexts
//!
//! Every handshake is a bounded busy-wait; nothing blocks forever.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod bridge;
pub mod chip;
pub mod device;
pub mod shared;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use bridge::RegisterBridge;
pub use chip::{ChipRegisters, MaskField};
pub use device::Ads8688;
pub use shared::{DeviceMutex, SharedAds8688};
