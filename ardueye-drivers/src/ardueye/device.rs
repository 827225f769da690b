//! Device link transactions
//!
//! Every transaction runs with chip select held low:
//!
//! ```text
//! command: ESC WRITE  ESC START <cmd> <params> ESC END
//! request: ESC WRITE  ESC START <SOH|SOD> <id> ESC END  ESC READ  (settle)  <read n>
//! ```
//!
//! The link is half-duplex: after `ESC READ` the sensor needs a short settle
//! time before it clocks out data.

use embedded_hal::delay::DelayNs;

use ardueye_hal::{OutputPin, SpiBus};
use ardueye_protocol::codes::{EOD, SOH};
use ardueye_protocol::frame::{self, ByteSink};
use ardueye_protocol::{DataHeader, LinkMode, HEADER_SIZE};

/// Frames bytes straight onto the bus, discarding what comes back
struct SpiSink<'a, SPI>(&'a mut SPI);

impl<SPI: SpiBus> ByteSink for SpiSink<'_, SPI> {
    type Error = SPI::Error;

    fn put(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.0.transfer_byte(byte).map(|_| ())
    }

    fn put_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.write(bytes)
    }
}

/// SPI bus plus chip select
pub struct DeviceLink<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI: SpiBus, CS: OutputPin> DeviceLink<SPI, CS> {
    /// Take ownership of the bus and release chip select
    pub fn new(spi: SPI, mut cs: CS) -> Self {
        cs.set_high();
        Self { spi, cs }
    }

    /// Assert chip select
    pub fn select(&mut self) {
        self.cs.set_low();
    }

    /// Release chip select
    pub fn deselect(&mut self) {
        self.cs.set_high();
    }

    /// Send a command in its own transaction
    pub fn send_command(&mut self, code: u8, params: &[u8]) -> Result<(), SPI::Error> {
        self.select();
        let result = self.write_packet(code, params);
        self.deselect();
        result
    }

    /// Tell the sensor all datasets of this pass have been read
    pub fn end_of_data(&mut self) -> Result<(), SPI::Error> {
        self.send_command(EOD, &[])
    }

    /// Read a dataset header in its own transaction
    pub fn read_header<D: DelayNs>(
        &mut self,
        id: u8,
        delay: &mut D,
        settle_us: u32,
    ) -> Result<DataHeader, SPI::Error> {
        self.select();
        let result = self.header_exchange(id, delay, settle_us);
        self.deselect();
        result
    }

    fn header_exchange<D: DelayNs>(
        &mut self,
        id: u8,
        delay: &mut D,
        settle_us: u32,
    ) -> Result<DataHeader, SPI::Error> {
        self.request(SOH, id, delay, settle_us)?;
        let mut raw = [0u8; HEADER_SIZE];
        self.spi.read(&mut raw)?;
        Ok(DataHeader::from_bytes(&raw))
    }

    /// Send a request and turn the link around for reading
    ///
    /// Chip select must already be asserted and stays asserted.
    pub fn request<D: DelayNs>(
        &mut self,
        tag: u8,
        id: u8,
        delay: &mut D,
        settle_us: u32,
    ) -> Result<(), SPI::Error> {
        self.write_packet(tag, &[id])?;
        frame::signal(&mut SpiSink(&mut self.spi), LinkMode::Read.to_byte())?;
        delay.delay_us(settle_us);
        Ok(())
    }

    /// Clock in response bytes
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), SPI::Error> {
        self.spi.read(buf)
    }

    fn write_packet(&mut self, code: u8, params: &[u8]) -> Result<(), SPI::Error> {
        let mut sink = SpiSink(&mut self.spi);
        frame::signal(&mut sink, LinkMode::Write.to_byte())?;
        frame::open(&mut sink)?;
        frame::escape(&mut sink, &[code])?;
        frame::escape(&mut sink, params)?;
        frame::close(&mut sink)
    }

    /// Give back the bus and pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    #[cfg(test)]
    pub(crate) fn bus(&mut self) -> &mut SPI {
        &mut self.spi
    }

    #[cfg(test)]
    pub(crate) fn chip_select(&mut self) -> &mut CS {
        &mut self.cs
    }
}
