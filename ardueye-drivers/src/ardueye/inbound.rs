//! Inbound relay traffic
//!
//! Bytes from the UI are drained into the command ring. Complete command
//! packets are acknowledged with `ESC CMD_ACK` as soon as they are seen and
//! then either executed right away or, while a dataset transfer is in
//! flight, queued until it ends.

use embedded_hal::delay::DelayNs;

use ardueye_core::config::MAX_IN_SERIAL;
use ardueye_hal::{InputPin, OutputPin, SerialPort, SpiBus};
use ardueye_protocol::codes::{CMD_ACK, WRITE_CMD};
use ardueye_protocol::UiCommand;

use super::{ArduEye, DriverResult};
use crate::error::DriverError;

/// When extracted commands run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Dispatch {
    Immediate,
    Deferred,
}

impl<SPI, CS, RDY, SER, D> ArduEye<SPI, CS, RDY, SER, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    SER: SerialPort,
    D: DelayNs,
{
    /// Service the UI link
    ///
    /// Runs queued commands, then drains the serial port and executes every
    /// complete command found. Returns true if an ACK was among the bytes.
    pub fn poll_ui(&mut self) -> DriverResult<bool, SPI, SER> {
        self.run_deferred()?;
        self.ingest(Dispatch::Immediate)
    }

    pub(super) fn ingest(&mut self, mode: Dispatch) -> DriverResult<bool, SPI, SER> {
        let mut remaining = self.relay.port_mut().available();
        if remaining > MAX_IN_SERIAL {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} inbound bytes exceed the ring, reading in slices", remaining);
        }

        let mut acked = false;
        let mut incoming = [0u8; MAX_IN_SERIAL];
        while remaining > 0 {
            let n = remaining.min(MAX_IN_SERIAL);
            for slot in &mut incoming[..n] {
                *slot = self.relay.port_mut().read_byte().map_err(DriverError::Relay)?;
            }
            remaining -= n;

            let outcome = match self.ring.ingest(&incoming[..n]) {
                Ok(outcome) => outcome,
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ring rejected inbound bytes: {}", _err);
                    continue;
                }
            };
            acked |= outcome.acked;
            if outcome.dropped > 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("dropped {} commands", outcome.dropped);
            }
            if outcome.overwritten > 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "{} commands lost to a ring wrap before their end",
                    outcome.overwritten
                );
            }

            for command in outcome.commands {
                self.relay.signal(CMD_ACK).map_err(DriverError::Relay)?;
                match mode {
                    Dispatch::Immediate => self.dispatch(&command)?,
                    Dispatch::Deferred => {
                        if self.deferred.push_back(command).is_err() {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("deferred queue full, command dropped");
                        }
                    }
                }
            }
        }
        Ok(acked)
    }

    /// Execute commands queued during a transfer
    pub(super) fn run_deferred(&mut self) -> DriverResult<(), SPI, SER> {
        while let Some(command) = self.deferred.pop_front() {
            self.dispatch(&command)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, bytes: &[u8]) -> DriverResult<(), SPI, SER> {
        match UiCommand::parse(bytes) {
            Some(UiCommand::Display(id)) => self.start(id),
            Some(UiCommand::Stop(id)) => self.stop(id),
            Some(UiCommand::Write(params)) => self.send_command(WRITE_CMD, &params),
            Some(UiCommand::ToggleRelay) => {
                let on = !self.relay.is_enabled();
                self.enable_relay(on);
                Ok(())
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::debug!("ignoring UI command {=[u8]}", bytes);
                Ok(())
            }
        }
    }
}
