//! Command types for both links
//!
//! - UI → driver: [`UiCommand`], decoded from packets extracted by the ring
//! - driver → sensor: [`DeviceCommand`], framed onto the device link

use heapless::Vec;

use crate::codes::{
    CMD_CALIBRATE, CMD_OF_RESOLUTION, CMD_OF_SMOOTHING, CMD_RESOLUTION, DISPLAY_CMD,
    SERIAL_START, STOP_CMD, WRITE_CMD,
};
use crate::ring::MAX_CMD_SIZE;

/// Commands received from the UI
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiCommand {
    /// Start streaming a dataset
    Display(u8),
    /// Stop streaming a dataset
    Stop(u8),
    /// Forward the parameter bytes to the sensor
    Write(Vec<u8, MAX_CMD_SIZE>),
    /// Flip relay transmission on or off
    ToggleRelay,
}

impl UiCommand {
    /// Decode an extracted command packet
    ///
    /// The first byte selects the command. Unknown command bytes and
    /// Display/Stop without a dataset id yield `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&cmd, params) = bytes.split_first()?;
        match cmd {
            DISPLAY_CMD => params.first().map(|&id| UiCommand::Display(id)),
            STOP_CMD => params.first().map(|&id| UiCommand::Stop(id)),
            WRITE_CMD => Vec::from_slice(params).ok().map(UiCommand::Write),
            SERIAL_START => Some(UiCommand::ToggleRelay),
            _ => None,
        }
    }
}

/// Commands sent to the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceCommand<'a> {
    /// Start producing a dataset
    Display(u8),
    /// Stop producing a dataset
    Stop(u8),
    /// Capture a new fixed-pattern-noise mask
    Calibrate,
    /// Raw image resolution
    Resolution { rows: u8, cols: u8 },
    /// Number of optic flow regions
    FlowResolution { rows: u8, cols: u8 },
    /// Optic flow low-pass filter strength
    FlowSmoothing(u8),
    /// Any other command byte with its parameters
    Custom { code: u8, params: &'a [u8] },
}

impl DeviceCommand<'_> {
    /// Command byte
    pub fn code(&self) -> u8 {
        self.with_bytes(|code, _| code)
    }

    /// Run `f` with the command byte and its parameter bytes
    pub fn with_bytes<R>(&self, f: impl FnOnce(u8, &[u8]) -> R) -> R {
        match *self {
            DeviceCommand::Display(id) => f(DISPLAY_CMD, &[id]),
            DeviceCommand::Stop(id) => f(STOP_CMD, &[id]),
            DeviceCommand::Calibrate => f(CMD_CALIBRATE, &[]),
            DeviceCommand::Resolution { rows, cols } => f(CMD_RESOLUTION, &[rows, cols]),
            DeviceCommand::FlowResolution { rows, cols } => f(CMD_OF_RESOLUTION, &[rows, cols]),
            DeviceCommand::FlowSmoothing(factor) => f(CMD_OF_SMOOTHING, &[factor]),
            DeviceCommand::Custom { code, params } => f(code, params),
        }
    }
}
