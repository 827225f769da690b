//! SPI bus abstractions
//!
//! The sensor link is clocked one byte at a time: every byte written returns
//! the byte the sensor shifted out during the same clock burst.

/// SPI bus master
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Transfer one byte, returning the byte clocked in
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Write data, discarding whatever is clocked in
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.transfer_byte(byte)?;
        }
        Ok(())
    }

    /// Read data by clocking out zeros
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for slot in buf.iter_mut() {
            *slot = self.transfer_byte(0x00)?;
        }
        Ok(())
    }
}
