//! Board-agnostic state for the ArduEye driver
//!
//! This crate contains everything the driver tracks that does not touch a
//! link:
//!
//! - Dataset descriptors and the ordered active set
//! - Driver configuration and buffer capacities
//! - Retry bookkeeping for the relay flow-control handshake

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod flow;
