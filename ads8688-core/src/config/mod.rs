//! Configuration types
//!
//! Board-level settings for the bridge: clocks, poll budget and the table
//! of instance base addresses. Stored as postcard binary data or parsed
//! from TOML on a host.

pub mod bridge;
#[cfg(feature = "serde")]
pub mod image;

pub use bridge::*;
#[cfg(feature = "serde")]
pub use image::*;
