//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use ardueye_protocol::{HEADER_SIZE, MAX_CMD_SIZE};

/// Largest payload chunk moved over the device link in one burst
pub const MAX_SPI_PACKET_SIZE: usize = 512;

/// Inbound ring buffer size for UI bytes
pub const MAX_IN_SERIAL: usize = 40;

/// Number of datasets the sensor can produce
pub const MAX_DATASETS: usize = 6;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Chunk size is zero or larger than [`MAX_SPI_PACKET_SIZE`]
    InvalidChunkSize,
    /// Handshake would never poll or never give up
    InvalidHandshake,
    /// Configuration text could not be parsed
    Parse,
}

/// Relay flow-control retry budget
///
/// One handshake call polls at most `polls_per_cycle * max_cycles` times,
/// sleeping `cooldown_ms` after every cycle, before shutting the relay down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandshakeConfig {
    /// GO requests per cycle
    pub polls_per_cycle: u16,
    /// Cycles before the relay is disabled
    pub max_cycles: u16,
    /// Sleep after each unanswered cycle (ms)
    pub cooldown_ms: u32,
    /// Availability checks spent waiting for a reply to one GO
    pub ack_wait_spins: u32,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            polls_per_cycle: 50,
            max_cycles: 10,
            cooldown_ms: 2000,
            ack_wait_spins: 100_000,
        }
    }
}

impl HandshakeConfig {
    /// Upper bound on GO requests in a single handshake
    pub fn max_polls(&self) -> u32 {
        u32::from(self.polls_per_cycle) * u32::from(self.max_cycles)
    }
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// Payload bytes read per device burst (1..=512)
    pub chunk_size: u16,
    /// Wait after switching the device link to read mode (µs)
    pub read_settle_us: u32,
    /// Relay datasets to the UI from the start
    pub relay_enabled: bool,
    /// Relay as human-readable text instead of binary packets
    pub monitor_mode: bool,
    /// Flow-control retry budget
    pub handshake: HandshakeConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_SPI_PACKET_SIZE as u16,
            read_settle_us: 1,
            relay_enabled: false,
            monitor_mode: false,
            handshake: HandshakeConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Check the configuration against buffer capacities
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunk = usize::from(self.chunk_size);
        if chunk == 0 || chunk > MAX_SPI_PACKET_SIZE {
            return Err(ConfigError::InvalidChunkSize);
        }
        if self.handshake.polls_per_cycle == 0 || self.handshake.max_cycles == 0 {
            return Err(ConfigError::InvalidHandshake);
        }
        Ok(())
    }

    /// Chunk size as a buffer length
    pub fn chunk_len(&self) -> usize {
        usize::from(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DriverConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.chunk_len(), 512);
        assert_eq!(config.handshake.max_polls(), 500);
        assert!(!config.relay_enabled);
    }

    #[test]
    fn test_chunk_size_bounds() {
        let mut config = DriverConfig::default();
        config.chunk_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize));
        config.chunk_size = 513;
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize));
        config.chunk_size = 1;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_handshake_must_poll() {
        let mut config = DriverConfig::default();
        config.handshake.max_cycles = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidHandshake));
    }
}
