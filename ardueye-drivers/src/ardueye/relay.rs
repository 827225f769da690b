//! Relay link writer
//!
//! Two renderings share one serial port:
//!
//! - binary: escape-framed packets for the UI
//!   ```text
//!   header: ESC START <header x5> <hint> ESC END
//!   data:   ESC START <id> [cols] <payload...> ESC END
//!   frame:  ESC START END_FRAME ESC END
//!   ```
//! - monitor: one line of text per event, for a serial terminal
//!
//! Every writer is a no-op while the relay is disabled.

use core::fmt::{self, Write};

use ardueye_hal::SerialPort;
use ardueye_protocol::codes::END_FRAME;
use ardueye_protocol::frame::{self, ByteSink};
use ardueye_protocol::{DataHeader, DisplayHint};

/// Adapts the serial port to [`fmt::Write`], keeping the port error
struct LineWriter<'a, SER: SerialPort> {
    port: &'a mut SER,
    error: Option<SER::Error>,
}

impl<SER: SerialPort> fmt::Write for LineWriter<'_, SER> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.port.write(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

struct PortSink<'a, SER>(&'a mut SER);

impl<SER: SerialPort> ByteSink for PortSink<'_, SER> {
    type Error = SER::Error;

    fn put(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.0.write_byte(byte)
    }

    fn put_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.write(bytes)
    }
}

/// Serial port plus relay state flags
pub struct RelayLink<SER> {
    port: SER,
    enabled: bool,
    monitor: bool,
    stalled: bool,
}

impl<SER: SerialPort> RelayLink<SER> {
    pub fn new(port: SER, enabled: bool, monitor: bool) -> Self {
        Self {
            port,
            enabled,
            monitor,
            stalled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_monitor(&self) -> bool {
        self.monitor
    }

    /// Disabled by an unanswered handshake
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Turn transmission on or off; turning it on clears a stall
    pub fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
        if on {
            self.stalled = false;
        }
    }

    pub fn set_monitor(&mut self, on: bool) {
        self.monitor = on;
    }

    /// Give up on an unresponsive UI
    pub fn stall(&mut self) {
        self.enabled = false;
        self.stalled = true;
    }

    pub fn port_mut(&mut self) -> &mut SER {
        &mut self.port
    }

    fn binary(&self) -> bool {
        self.enabled && !self.monitor
    }

    /// Send `ESC <code>` regardless of state
    pub fn signal(&mut self, code: u8) -> Result<(), SER::Error> {
        frame::signal(&mut PortSink(&mut self.port), code)
    }

    /// Write one monitor line; skipped outside monitor mode
    pub fn text<F>(&mut self, f: F) -> Result<(), SER::Error>
    where
        F: FnOnce(&mut dyn fmt::Write) -> fmt::Result,
    {
        if !(self.enabled && self.monitor) {
            return Ok(());
        }
        let mut writer = LineWriter {
            port: &mut self.port,
            error: None,
        };
        let result = f(&mut writer).and_then(|()| writer.write_str("\r\n"));
        match (result, writer.error) {
            (Err(_), Some(e)) => Err(e),
            _ => Ok(()),
        }
    }

    /// Announce a dataset header
    pub fn header(&mut self, header: &DataHeader, hint: DisplayHint) -> Result<(), SER::Error> {
        if self.binary() {
            let mut sink = PortSink(&mut self.port);
            frame::open(&mut sink)?;
            frame::escape(&mut sink, &header.to_bytes())?;
            sink.put(hint.to_byte())?;
            return frame::close(&mut sink);
        }
        self.text(|w| {
            write!(
                w,
                "{} {} {} {}",
                header.id,
                header.rows,
                header.cols,
                hint.to_byte()
            )
        })
    }

    /// Open a data packet
    ///
    /// Text datasets carry the column count (low byte) right after the id.
    pub fn open_data(
        &mut self,
        header: &DataHeader,
        hint: DisplayHint,
        label: Option<&str>,
    ) -> Result<(), SER::Error> {
        if self.binary() {
            let mut sink = PortSink(&mut self.port);
            frame::open(&mut sink)?;
            sink.put(header.id)?;
            if hint == DisplayHint::Text {
                frame::escape(&mut sink, &header.cols.to_le_bytes()[..1])?;
            }
            return Ok(());
        }
        self.text(|w| write!(w, "start {} {}", header.id, label.unwrap_or("?")))
    }

    /// Relay one payload chunk
    pub fn data(&mut self, chunk: &[u8]) -> Result<(), SER::Error> {
        if self.binary() {
            return frame::escape(&mut PortSink(&mut self.port), chunk);
        }
        self.text(|w| {
            for byte in chunk {
                write!(w, "{} ", byte)?;
            }
            Ok(())
        })
    }

    /// Close a data packet
    pub fn close_data(&mut self, id: u8) -> Result<(), SER::Error> {
        if self.binary() {
            return frame::close(&mut PortSink(&mut self.port));
        }
        self.text(|w| write!(w, "end {}", id))
    }

    /// Mark the end of an acquisition pass; binary mode only
    pub fn end_frame(&mut self) -> Result<(), SER::Error> {
        if self.binary() {
            return frame::packet(&mut PortSink(&mut self.port), &[END_FRAME], &[]);
        }
        Ok(())
    }

    pub fn release(self) -> SER {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSerial;
    use ardueye_protocol::codes::{END, ESC, GO, START};

    fn relay(enabled: bool, monitor: bool) -> RelayLink<MockSerial> {
        RelayLink::new(MockSerial::default(), enabled, monitor)
    }

    fn text(relay: &mut RelayLink<MockSerial>) -> std::string::String {
        std::string::String::from_utf8(relay.port_mut().outbound.clone()).unwrap()
    }

    #[test]
    fn test_binary_header_doubles_escapes() {
        let mut relay = relay(true, false);
        let header = DataHeader { id: ESC, rows: 2, cols: 8 };
        relay.header(&header, DisplayHint::Image).unwrap();

        assert_eq!(
            relay.port_mut().outbound,
            [ESC, START, ESC, ESC, 0, 2, 0, 8, 1, ESC, END]
        );
    }

    #[test]
    fn test_text_dataset_carries_cols() {
        let mut relay = relay(true, false);
        let header = DataHeader { id: 56, rows: 1, cols: 0x0105 };
        relay.open_data(&header, DisplayHint::Text, None).unwrap();
        assert_eq!(relay.port_mut().outbound, [ESC, START, 56, 5]);
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let mut relay = relay(false, false);
        let header = DataHeader { id: 48, rows: 1, cols: 1 };
        relay.header(&header, DisplayHint::Image).unwrap();
        relay.data(&[1, 2, 3]).unwrap();
        relay.end_frame().unwrap();
        assert!(relay.port_mut().outbound.is_empty());
    }

    #[test]
    fn test_signal_ignores_enable() {
        let mut relay = relay(false, false);
        relay.signal(GO).unwrap();
        assert_eq!(relay.port_mut().outbound, [ESC, GO]);
    }

    #[test]
    fn test_monitor_lines() {
        let mut relay = relay(true, true);
        let header = DataHeader { id: 48, rows: 2, cols: 3 };
        relay.header(&header, DisplayHint::Image).unwrap();
        relay.open_data(&header, DisplayHint::Image, Some("raw")).unwrap();
        relay.data(&[1, ESC, 255]).unwrap();
        relay.close_data(48).unwrap();
        relay.end_frame().unwrap();

        assert_eq!(
            text(&mut relay),
            "48 2 3 1\r\nstart 48 raw\r\n1 38 255 \r\nend 48\r\n"
        );
    }

    #[test]
    fn test_enable_clears_stall() {
        let mut relay = relay(true, false);
        relay.stall();
        assert!(!relay.is_enabled());
        assert!(relay.is_stalled());

        relay.set_enabled(true);
        assert!(relay.is_enabled());
        assert!(!relay.is_stalled());
    }

    #[test]
    fn test_port_error_surfaces_from_text() {
        let mut relay = relay(true, true);
        relay.port_mut().fail = true;
        assert!(relay.text(|w| write!(w, "x")).is_err());
    }
}
