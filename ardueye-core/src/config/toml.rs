//! TOML loading for [`DriverConfig`]
//!
//! ```toml
//! chunk_size = 256
//! relay_enabled = true
//!
//! [handshake]
//! cooldown_ms = 500
//! ```
//!
//! Missing keys keep their defaults.

use super::types::{ConfigError, DriverConfig};

impl DriverConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig = ::toml::from_str(text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}
