//! Acquisition pass
//!
//! For each active dataset, in activation order:
//!
//! 1. read the header over SPI
//! 2. if relaying, handshake and forward the header
//! 3. request the payload and read it in chunks, relaying each one and
//!    re-running the handshake after every other full chunk
//!
//! A pass always ends by telling the sensor `EOD` and, in binary relay
//! mode with datasets active, sending the UI an `END_FRAME` packet.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use ardueye_core::config::MAX_DATASETS;
use ardueye_hal::{InputPin, OutputPin, SerialPort, SpiBus};
use ardueye_protocol::codes::SOD;
use ardueye_protocol::{DataHeader, DisplayHint};

use super::{ArduEye, DriverResult};
use crate::error::DriverError;

/// Outcome of reading one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transfer {
    /// Header reported by the sensor
    pub header: DataHeader,
    /// Payload bytes copied into the caller's buffer
    pub stored: usize,
    /// False if a mid-payload handshake failed and the rest was skipped
    pub complete: bool,
}

/// Copy a chunk into `out` at `offset`, clipped to the buffer
fn store(out: Option<&mut [u8]>, offset: usize, chunk: &[u8]) -> usize {
    let Some(room) = out.and_then(|buf| buf.get_mut(offset..)) else {
        return 0;
    };
    let n = room.len().min(chunk.len());
    room[..n].copy_from_slice(&chunk[..n]);
    n
}

impl<SPI, CS, RDY, SER, D> ArduEye<SPI, CS, RDY, SER, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    SER: SerialPort,
    D: DelayNs,
{
    /// Read every active dataset and relay it
    ///
    /// A dataset whose header reports no data ends the pass early.
    pub fn acquire(&mut self) -> DriverResult<(), SPI, SER> {
        let ids: Vec<u8, MAX_DATASETS> = self.registry.active_ids().collect();
        for id in ids {
            if self.transfer(id, None)?.is_none() {
                #[cfg(feature = "defmt")]
                defmt::debug!("dataset {} reported an empty header, pass cut short", id);
                break;
            }
        }
        self.end_frame()
    }

    /// Read one dataset into `buf`
    ///
    /// The dataset is relayed as during [`acquire`](Self::acquire). At most
    /// `buf.len()` bytes are stored, and for a known dataset no more than its
    /// descriptor capacity; the rest is read and relayed but not stored.
    /// Returns `None` if the header reported no data.
    pub fn fetch_dataset(
        &mut self,
        id: u8,
        buf: &mut [u8],
    ) -> DriverResult<Option<Transfer>, SPI, SER> {
        self.transfer(id, Some(buf))
    }

    /// Close an acquisition pass
    pub fn end_frame(&mut self) -> DriverResult<(), SPI, SER> {
        self.device.end_of_data().map_err(DriverError::Device)?;
        if self.registry.active_count() > 0 {
            self.relay.end_frame().map_err(DriverError::Relay)?;
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        id: u8,
        out: Option<&mut [u8]>,
    ) -> DriverResult<Option<Transfer>, SPI, SER> {
        let (hint, label, capacity) = self
            .registry
            .descriptor(id)
            .map_or((DisplayHint::None, None, usize::MAX), |d| {
                (d.hint, d.label, d.capacity)
            });
        let header = self
            .device
            .read_header(id, &mut self.delay, self.config.read_settle_us)
            .map_err(DriverError::Device)?;

        if self.relay.is_enabled() && self.handshake()? {
            self.relay.header(&header, hint).map_err(DriverError::Relay)?;
        }

        let Some(size) = header.payload_len() else {
            return Ok(None);
        };
        if size > capacity {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "dataset {} announces {} bytes, capacity is {}",
                id,
                size,
                capacity
            );
        }
        let out = out.map(|buf| {
            let limit = buf.len().min(capacity);
            &mut buf[..limit]
        });

        self.relay
            .open_data(&header, hint, label)
            .map_err(DriverError::Relay)?;
        self.device.select();
        let streamed = self.stream_payload(id, size, out);
        self.device.deselect();
        let (stored, complete) = streamed?;
        self.relay.close_data(id).map_err(DriverError::Relay)?;
        self.run_deferred()?;

        if !complete {
            #[cfg(feature = "defmt")]
            defmt::debug!("dataset {} cut short after {} bytes", id, stored);
        }

        Ok(Some(Transfer {
            header,
            stored,
            complete,
        }))
    }

    /// Read `size` payload bytes; chip select must be asserted
    fn stream_payload(
        &mut self,
        id: u8,
        size: usize,
        mut out: Option<&mut [u8]>,
    ) -> DriverResult<(usize, bool), SPI, SER> {
        self.device
            .request(SOD, id, &mut self.delay, self.config.read_settle_us)
            .map_err(DriverError::Device)?;

        let mtu = self.config.chunk_len();
        let mut offset = 0;
        let mut stored = 0;
        let mut index = 0usize;
        while offset + mtu < size {
            let chunk = &mut self.chunk[..mtu];
            self.device.read(chunk).map_err(DriverError::Device)?;
            stored += store(out.as_deref_mut(), offset, chunk);
            if self.relay.is_enabled() {
                self.relay
                    .data(&self.chunk[..mtu])
                    .map_err(DriverError::Relay)?;
                if index % 2 == 0 && !self.handshake()? {
                    return Ok((stored, false));
                }
            }
            offset += mtu;
            index += 1;
        }

        let rest = &mut self.chunk[..size - offset];
        self.device.read(rest).map_err(DriverError::Device)?;
        stored += store(out.as_deref_mut(), offset, rest);
        self.relay
            .data(&self.chunk[..size - offset])
            .map_err(DriverError::Relay)?;
        Ok((stored, true))
    }
}
