//! Board-agnostic core for the ADS8688 register-bridge driver
//!
//! This crate contains everything that does not touch a register bus:
//!
//! - Register map and bitfield accessors for the FPGA bridge block
//! - Chip register map, address encoding and command words
//! - Channel model (selection, cached configuration, input ranges)
//! - Error taxonomy shared by all driver operations
//! - Sampler state machine for auto-scan acquisitions
//! - Configuration type definitions

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod channel;
pub mod chip;
pub mod config;
pub mod error;
pub mod state;

pub use channel::{ChannelConfig, ChannelSelect, MAX_CHANNELS};
pub use chip::{ChipCommand, Mode, Range};
pub use config::{BridgeConfig, PollConfig};
pub use error::{Error, Result};
