//! Escape framing shared by the device and relay links.
//!
//! Packet layout:
//! - `ESC START` opens a packet
//! - payload bytes follow, with every literal `ESC` sent twice
//! - `ESC END` closes the packet
//!
//! Tag bytes written in front of a payload (dataset id, display hint) are
//! never doubled; none of them can take the value of `ESC`.

use heapless::Vec;

use crate::codes::{END, ESC, START};

/// Errors that can occur during packet encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Decoded packet exceeds the decoder capacity
    PacketTooLarge,
}

/// Destination for encoded bytes
///
/// Implemented by the link writers in the driver and by `heapless::Vec` for
/// encoding into memory.
pub trait ByteSink {
    /// Error type of the underlying transport
    type Error;

    /// Write one byte
    fn put(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write a run of bytes verbatim
    fn put_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.put(byte)?;
        }
        Ok(())
    }
}

impl<const N: usize> ByteSink for Vec<u8, N> {
    type Error = FrameError;

    fn put(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.push(byte).map_err(|_| FrameError::BufferTooSmall)
    }

    fn put_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes)
            .map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Write a standalone `ESC code` signal
pub fn signal<S: ByteSink>(sink: &mut S, code: u8) -> Result<(), S::Error> {
    sink.put_all(&[ESC, code])
}

/// Write the `ESC START` packet opener
pub fn open<S: ByteSink>(sink: &mut S) -> Result<(), S::Error> {
    signal(sink, START)
}

/// Write the `ESC END` packet closer
pub fn close<S: ByteSink>(sink: &mut S) -> Result<(), S::Error> {
    signal(sink, END)
}

/// Write payload bytes, doubling every `ESC`
///
/// Runs without an escape are handed to the sink in one piece.
pub fn escape<S: ByteSink>(sink: &mut S, data: &[u8]) -> Result<(), S::Error> {
    for run in data.split_inclusive(|&b| b == ESC) {
        sink.put_all(run)?;
        if run.last() == Some(&ESC) {
            sink.put(ESC)?;
        }
    }
    Ok(())
}

/// Write a complete packet: raw `tag` bytes followed by an escaped `payload`
pub fn packet<S: ByteSink>(sink: &mut S, tag: &[u8], payload: &[u8]) -> Result<(), S::Error> {
    open(sink)?;
    sink.put_all(tag)?;
    escape(sink, payload)?;
    close(sink)
}

/// Number of bytes `data` occupies once escaped
pub fn escaped_len(data: &[u8]) -> usize {
    data.len() + data.iter().filter(|&&b| b == ESC).count()
}

/// Encode a complete packet into a heapless Vec
pub fn encode_to_vec<const N: usize>(tag: &[u8], payload: &[u8]) -> Result<Vec<u8, N>, FrameError> {
    let mut out = Vec::new();
    packet(&mut out, tag, payload)?;
    Ok(out)
}

/// One unit of an unescaped byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Token {
    /// A literal data byte (a doubled `ESC` yields one `ESC`)
    Data(u8),
    /// The byte following a single `ESC`
    Marker(u8),
}

/// Streaming escape decoder
///
/// The "previous byte was ESC" flag survives between calls, so a stream can
/// be fed in arbitrary slices.
#[derive(Debug, Clone, Default)]
pub struct Unescaper {
    escaped: bool,
}

impl Unescaper {
    /// Create a decoder in the idle state
    pub const fn new() -> Self {
        Self { escaped: false }
    }

    /// Forget a pending escape
    pub fn reset(&mut self) {
        self.escaped = false;
    }

    /// True if the last byte fed was an unpaired `ESC`
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Feed one byte
    ///
    /// Returns `None` while an escape is pending.
    pub fn feed(&mut self, byte: u8) -> Option<Token> {
        if self.escaped {
            self.escaped = false;
            if byte == ESC {
                Some(Token::Data(ESC))
            } else {
                Some(Token::Marker(byte))
            }
        } else if byte == ESC {
            self.escaped = true;
            None
        } else {
            Some(Token::Data(byte))
        }
    }
}

/// Item produced by [`PacketDecoder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<const N: usize> {
    /// Unescaped contents of a complete `ESC START .. ESC END` packet
    Packet(Vec<u8, N>),
    /// A standalone signal (GO, ACK, CMD_ACK, ...)
    Signal(u8),
}

/// Reassembles packets from an escaped byte stream
///
/// Signals seen while a packet is open are reported without closing the
/// packet: the relay link interleaves GO requests with payload chunks.
#[derive(Debug, Clone, Default)]
pub struct PacketDecoder<const N: usize> {
    unescaper: Unescaper,
    buffer: Vec<u8, N>,
    in_packet: bool,
}

impl<const N: usize> PacketDecoder<N> {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {
            unescaper: Unescaper::new(),
            buffer: Vec::new(),
            in_packet: false,
        }
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.unescaper.reset();
        self.buffer.clear();
        self.in_packet = false;
    }

    /// Feed a single byte
    ///
    /// Data bytes outside a packet are dropped. A second `ESC START` before
    /// `ESC END` discards the partial packet.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Decoded<N>>, FrameError> {
        match self.unescaper.feed(byte) {
            None => Ok(None),
            Some(Token::Data(b)) => {
                if self.in_packet && self.buffer.push(b).is_err() {
                    self.reset();
                    return Err(FrameError::PacketTooLarge);
                }
                Ok(None)
            }
            Some(Token::Marker(START)) => {
                self.buffer.clear();
                self.in_packet = true;
                Ok(None)
            }
            Some(Token::Marker(END)) => {
                if !self.in_packet {
                    return Ok(None);
                }
                self.in_packet = false;
                let packet = core::mem::take(&mut self.buffer);
                Ok(Some(Decoded::Packet(packet)))
            }
            Some(Token::Marker(code)) => Ok(Some(Decoded::Signal(code))),
        }
    }

    /// Feed multiple bytes
    ///
    /// Returns the first item found; bytes after it are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Decoded<N>>, FrameError> {
        for &byte in bytes {
            if let Some(item) = self.feed(byte)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{ACK, END_FRAME, GO};
    use proptest::prelude::*;

    #[test]
    fn test_packet_layout() {
        let encoded: Vec<u8, 16> = encode_to_vec(&[48], &[1, 2, 3]).unwrap();
        assert_eq!(&encoded[..], &[ESC, START, 48, 1, 2, 3, ESC, END]);
    }

    #[test]
    fn test_escape_doubles_only_esc() {
        let mut out: Vec<u8, 16> = Vec::new();
        escape(&mut out, &[1, ESC, 2, ESC, ESC]).unwrap();
        assert_eq!(&out[..], &[1, ESC, ESC, 2, ESC, ESC, ESC, ESC]);
        assert_eq!(escaped_len(&[1, ESC, 2, ESC, ESC]), out.len());
    }

    #[test]
    fn test_tag_bytes_not_doubled() {
        let encoded: Vec<u8, 16> = encode_to_vec(&[END_FRAME], &[]).unwrap();
        assert_eq!(&encoded[..], &[ESC, START, END_FRAME, ESC, END]);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let result: Result<Vec<u8, 4>, _> = encode_to_vec(&[48], &[1, 2, 3]);
        assert_eq!(result, Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_unescaper_state_spans_calls() {
        let mut unescaper = Unescaper::new();
        assert_eq!(unescaper.feed(ESC), None);
        assert!(unescaper.is_escaped());
        assert_eq!(unescaper.feed(ACK), Some(Token::Marker(ACK)));
        assert!(!unescaper.is_escaped());
        assert_eq!(unescaper.feed(ESC), None);
        assert_eq!(unescaper.feed(ESC), Some(Token::Data(ESC)));
        assert_eq!(unescaper.feed(7), Some(Token::Data(7)));
    }

    #[test]
    fn test_decoder_reports_signal_inside_packet() {
        let mut decoder = PacketDecoder::<16>::new();
        let stream = [ESC, START, 50, 9, ESC, GO, 10, ESC, END];

        assert_eq!(decoder.feed_bytes(&stream[..6]).unwrap(), Some(Decoded::Signal(GO)));
        match decoder.feed_bytes(&stream[6..]).unwrap() {
            Some(Decoded::Packet(p)) => assert_eq!(&p[..], &[50, 9, 10]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decoder_ignores_bytes_outside_packet() {
        let mut decoder = PacketDecoder::<8>::new();
        assert_eq!(decoder.feed_bytes(&[1, 2, 3, ESC, END]).unwrap(), None);
    }

    #[test]
    fn test_decoder_overflow() {
        let mut decoder = PacketDecoder::<2>::new();
        assert_eq!(
            decoder.feed_bytes(&[ESC, START, 1, 2, 3]),
            Err(FrameError::PacketTooLarge)
        );
    }

    proptest! {
        #[test]
        fn prop_escape_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..200)) {
            let mut encoded: Vec<u8, 512> = Vec::new();
            packet(&mut encoded, &[], &payload).unwrap();

            let mut decoder = PacketDecoder::<256>::new();
            let decoded = decoder.feed_bytes(&encoded).unwrap();
            match decoded {
                Some(Decoded::Packet(p)) => prop_assert_eq!(&p[..], &payload[..]),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        #[test]
        fn prop_escaped_len_counts_doubling(
            payload in proptest::collection::vec(prop_oneof![Just(ESC), any::<u8>()], 0..100)
        ) {
            let mut out: Vec<u8, 256> = Vec::new();
            escape(&mut out, &payload).unwrap();
            prop_assert_eq!(out.len(), escaped_len(&payload));
        }
    }
}
