//! Stored configuration image
//!
//! Wraps a [`BridgeConfig`] with a header so a stale or foreign blob is
//! rejected instead of silently loaded.

use serde::{Deserialize, Serialize};

use super::bridge::{BridgeConfig, ConfigError};

/// Magic number to identify a stored bridge config
pub const CONFIG_MAGIC: u32 = 0x4144_5338; // "ADS8"

/// Current image format version
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound on the encoded image size
pub const MAX_IMAGE_SIZE: usize = 64;

/// Serialized configuration with header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigImage {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Payload
    pub config: BridgeConfig,
}

impl ConfigImage {
    /// Wrap a config with the current header
    pub const fn new(config: BridgeConfig) -> Self {
        Self {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            config,
        }
    }

    /// Encode into `buf`, returning the used prefix
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Decode and validate an image, returning the config
    pub fn decode(bytes: &[u8]) -> Result<BridgeConfig, ConfigError> {
        let image: ConfigImage =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if image.magic != CONFIG_MAGIC {
            return Err(ConfigError::BadMagic);
        }
        if image.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        image.config.validate()?;
        Ok(image.config)
    }
}
