//! ADS8688 bridge hardware abstraction layer
//!
//! The FPGA register bridge is reached through plain 32-bit loads and stores.
//! This crate defines that access primitive as a trait so the same driver
//! code runs against memory-mapped hardware, a `/dev/mem` mapping on a Linux
//! host, or a simulated register file in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ads8688-drivers (bridge, chip, device) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ads8688-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  MMIO / devmem│       │ simulated     │
//! │  transport    │       │ bridge        │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`register::RegisterBus`] - absolute-address 32-bit register access
//! - [`register::RegisterBlock`] - a bus bound to one instance base address

#![no_std]
#![deny(unsafe_code)]

pub mod register;

pub use register::{RegisterBlock, RegisterBus};
