//! GO/ACK flow control toward the UI
//!
//! Before bulk data the driver sends `ESC GO` and waits for `ESC ACK`.
//! Unanswered polls are counted by [`HandshakeBudget`]: after each cycle the
//! driver sleeps, and after the last one it disables the relay.

use embedded_hal::delay::DelayNs;

use ardueye_core::flow::{HandshakeBudget, PollVerdict};
use ardueye_hal::{InputPin, OutputPin, SerialPort, SpiBus};
use ardueye_protocol::codes::GO;

use super::inbound::Dispatch;
use super::{ArduEye, DriverResult};
use crate::error::DriverError;

impl<SPI, CS, RDY, SER, D> ArduEye<SPI, CS, RDY, SER, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    SER: SerialPort,
    D: DelayNs,
{
    /// Ask the UI for permission to send
    ///
    /// Returns `Ok(true)` once an ACK arrives. Returns `Ok(false)` right away
    /// if the relay is disabled, or after the retry budget runs out, in which
    /// case the relay is disabled and marked stalled. UI commands that arrive
    /// while waiting are acknowledged and queued until the current transfer
    /// ends.
    pub fn handshake(&mut self) -> DriverResult<bool, SPI, SER> {
        if !self.relay.is_enabled() {
            return Ok(false);
        }
        let mut budget = HandshakeBudget::new(self.config.handshake);
        loop {
            self.relay.signal(GO).map_err(DriverError::Relay)?;
            self.wait_for_reply();
            if self.ingest(Dispatch::Deferred)? {
                return Ok(true);
            }
            match budget.record_miss() {
                PollVerdict::Retry => {}
                PollVerdict::Cooldown => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("no ACK after cycle {}, cooling down", budget.cycles());
                    self.delay.delay_ms(budget.cooldown_ms());
                }
                PollVerdict::Exhausted => {
                    self.delay.delay_ms(budget.cooldown_ms());
                    self.relay.stall();
                    #[cfg(feature = "defmt")]
                    defmt::warn!("UI not answering, relay disabled");
                    return Ok(false);
                }
            }
        }
    }

    /// Spin until the port has something to read or the wait runs out
    fn wait_for_reply(&mut self) -> bool {
        let port = self.relay.port_mut();
        (0..self.config.handshake.ack_wait_spins).any(|_| port.available() > 0)
    }
}
