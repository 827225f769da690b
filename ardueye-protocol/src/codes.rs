//! Reserved byte values
//!
//! Every special byte only has meaning when it directly follows [`ESC`].

// Packet delimiters (both links)
pub const ESC: u8 = 38;
pub const START: u8 = 90;
pub const END: u8 = 91;
/// Payload of the packet closing one full acquisition pass
pub const END_FRAME: u8 = 92;

// Device link direction switch and request tags
pub const WRITE: u8 = 93;
pub const READ: u8 = 94;
/// Start-of-data: request a dataset payload
pub const SOD: u8 = 95;
/// Start-of-header: request a dataset header
pub const SOH: u8 = 96;
/// End-of-data: all datasets of this pass have been read
pub const EOD: u8 = 97;

// Flow control signals (relay link)
/// UI has buffer space for another chunk
pub const ACK: u8 = 34;
/// Driver asks the UI for permission to send
pub const GO: u8 = 36;
/// Driver confirms a UI command was received
pub const CMD_ACK: u8 = 37;

// UI command bytes
pub const WRITE_CMD: u8 = 32;
pub const DISPLAY_CMD: u8 = 33;
pub const STOP_CMD: u8 = 35;
pub const SERIAL_START: u8 = 39;
/// Reserved by the UI, never acted upon
pub const READ_CMD: u8 = 40;

// Sensor commands
pub const CMD_CALIBRATE: u8 = 70;
pub const CMD_RESOLUTION: u8 = 71;
pub const CMD_OF_RESOLUTION: u8 = 72;
pub const CMD_OF_SMOOTHING: u8 = 73;

/// Transfer direction of the half-duplex device link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMode {
    /// Driver clocks meaningful bytes to the sensor
    Write,
    /// Sensor clocks data back while the driver sends zeros
    Read,
}

impl LinkMode {
    /// Signal byte that switches the link into this mode
    pub fn to_byte(self) -> u8 {
        match self {
            LinkMode::Write => WRITE,
            LinkMode::Read => READ,
        }
    }

    /// Parse a mode switch signal
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            WRITE => Some(LinkMode::Write),
            READ => Some(LinkMode::Read),
            _ => None,
        }
    }
}
