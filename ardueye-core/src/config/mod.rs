//! Configuration types
//!
//! Capacities are compile-time constants because every buffer is a fixed
//! array. Timing and retry settings live in [`DriverConfig`] and can be loaded
//! from TOML with the `toml` feature.

#[cfg(feature = "toml")]
mod toml;
pub mod types;

pub use types::*;
