//! Serial byte-stream abstraction
//!
//! The relay link to the UI is polled: the driver asks how many bytes are
//! waiting and then drains exactly that many. Nothing in the driver blocks on
//! inbound data.

/// Polled serial port
pub trait SerialPort {
    /// Error type for serial operations
    type Error;

    /// Number of received bytes waiting to be read
    fn available(&mut self) -> usize;

    /// Read one received byte
    ///
    /// Only called after [`available`](Self::available) reported data.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Write data to the port
    ///
    /// Blocks until all data has been accepted by the transmitter.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write(&[byte])
    }
}
