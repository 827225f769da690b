//! Wrappers around `embedded-hal` 1.0 implementations
//!
//! Platform HALs already implement the `embedded-hal` traits. These newtypes
//! let those types drive the ArduEye links without extra glue. Pins must be
//! infallible, which is the case for on-chip GPIO on every supported target.

use core::convert::Infallible;

use embedded_hal::digital;
use embedded_hal::spi;

use crate::gpio::{InputPin, OutputPin};
use crate::spi::SpiBus;

/// SPI bus backed by an `embedded_hal::spi::SpiBus`
#[derive(Debug)]
pub struct EhSpi<T>(pub T);

impl<T: spi::SpiBus<u8>> SpiBus for EhSpi<T> {
    type Error = T::Error;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut word = [byte];
        self.0.transfer_in_place(&mut word)?;
        Ok(word[0])
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(data)?;
        self.0.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        buf.fill(0x00);
        self.0.transfer_in_place(buf)
    }
}

/// Output pin backed by an `embedded_hal::digital::OutputPin`
#[derive(Debug)]
pub struct EhOutputPin<T>(pub T);

impl<T: digital::OutputPin<Error = Infallible>> OutputPin for EhOutputPin<T> {
    fn set_high(&mut self) {
        match self.0.set_high() {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn set_low(&mut self) {
        match self.0.set_low() {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}

/// Input pin backed by an `embedded_hal::digital::InputPin`
#[derive(Debug)]
pub struct EhInputPin<T>(pub T);

impl<T: digital::InputPin<Error = Infallible>> InputPin for EhInputPin<T> {
    fn is_high(&mut self) -> bool {
        match self.0.is_high() {
            Ok(level) => level,
            Err(never) => match never {},
        }
    }
}
