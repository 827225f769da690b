//! ArduEye sensor driver
//!
//! This crate provides [`ArduEye`], the host-side driver for the Centeye
//! ArduEye vision sensor. One instance owns both links:
//!
//! - the device link: SPI plus chip select and data-ready pins, spoken as a
//!   half-duplex request/response protocol
//! - the relay link: a serial port to the UI, which receives every dataset
//!   read from the sensor and sends back commands and flow-control ACKs
//!
//! The driver is poll-driven and never spawns work. A typical main loop:
//!
//! ```ignore
//! loop {
//!     eye.poll_ui()?;
//!     if eye.data_ready() {
//!         eye.acquire()?;
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ardueye;
pub mod error;

#[cfg(test)]
mod mock;

pub use ardueye::{ArduEye, DriverResult, Transfer};
pub use error::DriverError;
