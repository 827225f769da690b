//! ArduEye Hardware Abstraction Layer
//!
//! This crate defines the link collaborators the ArduEye driver needs from
//! the surrounding platform. The driver never touches registers; it only
//! moves bytes through these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application main loop                  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ardueye-drivers (ArduEye instance)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ardueye-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌────────────────┐    ┌────────────────┐
//! │  device link   │    │  relay link    │
//! │  (SPI + pins)  │    │  (serial port) │
//! └────────────────┘    └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Chip select and data-ready lines
//! - [`spi::SpiBus`] - Blocking single-byte SPI transfer
//! - [`serial::SerialPort`] - Polled byte stream to the UI
//!
//! Types implementing the `embedded-hal` 1.0 traits can be plugged in through
//! the wrappers in [`adapters`].

#![no_std]
#![deny(unsafe_code)]

pub mod adapters;
pub mod gpio;
pub mod serial;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use adapters::{EhInputPin, EhOutputPin, EhSpi};
pub use gpio::{InputPin, OutputPin};
pub use serial::SerialPort;
pub use spi::SpiBus;
