//! Driver error type

/// A link collaborator failed
///
/// Protocol-level problems (bad headers, unanswered handshakes, unknown
/// commands) are not errors; they are absorbed by the driver. Only failures
/// reported by the SPI bus or the serial port surface here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<D, R> {
    /// Device link (SPI) error
    Device(D),
    /// Relay link (serial) error
    Relay(R),
}
