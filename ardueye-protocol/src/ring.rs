//! Inbound ring buffer for UI bytes
//!
//! Bytes are appended at a write cursor. When an ingest would run past the
//! end of the buffer, the cursor position is remembered as the *wrap point*
//! and writing restarts at index 0. Everything before the wrap point stays
//! readable, so a packet that began near the end of the buffer can still be
//! reassembled once its `ESC END` arrives at the front.
//!
//! Only one wrap per packet is supported. A packet that stays pending across
//! two wraps, or whose tail runs past its own `START` after one wrap, has
//! lost its first bytes; it is dropped and counted in
//! [`IngestOutcome::overwritten`].

use heapless::Vec;

use crate::codes::{ACK, END, START};
use crate::frame::{Token, Unescaper};

/// Largest command the UI may send, in bytes after `ESC START`
pub const MAX_CMD_SIZE: usize = 10;

/// Commands kept from a single ingest call
pub const MAX_COMMANDS_PER_INGEST: usize = 8;

/// Bytes of one extracted command
pub type CommandBytes = Vec<u8, MAX_CMD_SIZE>;

/// Errors reported by [`CommandRing::ingest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingError {
    /// More bytes than the buffer holds were offered at once.
    /// They would wrap more than once, which the ring cannot reassemble.
    Overrun { incoming: usize, capacity: usize },
}

/// Location of a packet body inside the ring
///
/// `start` is the index of the `START` marker, `end` the index of the `END`
/// marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Span {
    /// Body lies in `start + 1 .. end - 1`
    Linear { start: usize, end: usize },
    /// Body runs from `start + 1` to the wrap point, then from 0 to `end - 1`
    Wrapped {
        start: usize,
        wrap_point: usize,
        end: usize,
    },
}

impl Span {
    /// Classify a packet by raw index comparison
    ///
    /// `start > end` is taken to mean the packet wrapped.
    pub fn classify(start: usize, end: usize, wrap_point: usize) -> Self {
        if start > end {
            Span::Wrapped {
                start,
                wrap_point,
                end,
            }
        } else {
            Span::Linear { start, end }
        }
    }
}

/// Result of one [`CommandRing::ingest`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// An `ESC ACK` was seen in the new bytes
    pub acked: bool,
    /// Commands completed by the new bytes, in arrival order
    pub commands: Vec<CommandBytes, MAX_COMMANDS_PER_INGEST>,
    /// Commands completed but not kept because `commands` was full
    pub dropped: usize,
    /// Commands dropped because the ring overwrote their start before `END`
    pub overwritten: usize,
}

/// Fixed-capacity receive buffer with packet boundary detection
#[derive(Debug, Clone)]
pub struct CommandRing<const N: usize> {
    buf: [u8; N],
    write: usize,
    wrap_point: usize,
    unescaper: Unescaper,
    pending_start: Option<usize>,
    wraps_since_start: u8,
}

impl<const N: usize> Default for CommandRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CommandRing<N> {
    /// Create an empty ring
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            write: 0,
            wrap_point: 0,
            unescaper: Unescaper::new(),
            pending_start: None,
            wraps_since_start: 0,
        }
    }

    /// Buffer capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index the next byte will be written to
    pub fn write_cursor(&self) -> usize {
        self.write
    }

    /// Write cursor at the time of the last wrap
    pub fn wrap_point(&self) -> usize {
        self.wrap_point
    }

    /// Index of the `START` marker of the packet still being received
    pub fn pending_start(&self) -> Option<usize> {
        self.pending_start
    }

    /// Append newly received bytes and scan them
    ///
    /// Only the bytes passed in are scanned; the escape state carries over
    /// from the previous call.
    pub fn ingest(&mut self, incoming: &[u8]) -> Result<IngestOutcome, RingError> {
        if incoming.len() > N {
            return Err(RingError::Overrun {
                incoming: incoming.len(),
                capacity: N,
            });
        }

        if self.write + incoming.len() > N {
            self.wrap_point = self.write;
            self.write = 0;
            if self.pending_start.is_some() {
                self.wraps_since_start = self.wraps_since_start.saturating_add(1);
            }
        }

        let from = self.write;
        self.write += incoming.len();
        self.buf[from..self.write].copy_from_slice(incoming);

        let mut outcome = IngestOutcome::default();
        for index in from..self.write {
            match self.unescaper.feed(self.buf[index]) {
                Some(Token::Marker(START)) => {
                    self.pending_start = Some(index);
                    self.wraps_since_start = 0;
                }
                Some(Token::Marker(END)) => {
                    // END without a START is line noise
                    let Some(start) = self.pending_start.take() else {
                        continue;
                    };
                    let wraps = core::mem::take(&mut self.wraps_since_start);
                    if wraps > 1 || (wraps == 1 && index > start) {
                        outcome.overwritten += 1;
                        continue;
                    }

                    let command = self.extract(Span::classify(start, index, self.wrap_point));
                    if outcome.commands.push(command).is_err() {
                        outcome.dropped += 1;
                    }
                }
                Some(Token::Marker(ACK)) => outcome.acked = true,
                _ => {}
            }
        }

        Ok(outcome)
    }

    /// Copy a packet body out of the ring
    ///
    /// The body excludes the `START` marker and the `ESC` in front of `END`.
    /// Bodies longer than [`MAX_CMD_SIZE`] are truncated.
    pub fn extract(&self, span: Span) -> CommandBytes {
        let (head, tail): (&[u8], &[u8]) = match span {
            Span::Linear { start, end } => (self.buf.get(start + 1..end).unwrap_or(&[]), &[]),
            Span::Wrapped {
                start,
                wrap_point,
                end,
            } => (
                self.buf.get(start + 1..wrap_point).unwrap_or(&[]),
                self.buf.get(..end).unwrap_or(&[]),
            ),
        };

        // Drop the ESC that precedes END
        let body_len = (head.len() + tail.len()).saturating_sub(1);
        head.iter()
            .chain(tail)
            .take(body_len.min(MAX_CMD_SIZE))
            .copied()
            .collect()
    }
}
