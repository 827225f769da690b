//! ArduEye Packet Protocol
//!
//! This crate defines the byte-level protocol spoken on both ArduEye links:
//! the half-duplex SPI link to the sensor and the asynchronous serial link to
//! the UI. Neither link has framing of its own, so every logical message is
//! delimited with escape sequences.
//!
//! # Packet Format
//!
//! ```text
//! ┌─────┬───────┬──────────────────────────────┬─────┬─────┐
//! │ ESC │ START │ PAYLOAD (ESC bytes doubled)  │ ESC │ END │
//! │ 38  │ 90    │ 0..n bytes                   │ 38  │ 91  │
//! └─────┴───────┴──────────────────────────────┴─────┴─────┘
//! ```
//!
//! An escape followed by anything other than START, END or a second escape is
//! a standalone signal (ACK, GO, CMD_ACK, or the WRITE/READ direction switch
//! on the device link).
//!
//! Inbound UI bytes accumulate in a [`CommandRing`], which finds packet
//! boundaries even when a packet wraps past the end of the buffer.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod codes;
pub mod command;
pub mod display;
pub mod frame;
pub mod header;
pub mod ring;

pub use codes::LinkMode;
pub use command::{DeviceCommand, UiCommand};
pub use display::DisplayHint;
pub use frame::{ByteSink, Decoded, FrameError, PacketDecoder, Token, Unescaper};
pub use header::{DataHeader, HEADER_SIZE};
pub use ring::{CommandBytes, CommandRing, IngestOutcome, RingError, Span, MAX_CMD_SIZE};
