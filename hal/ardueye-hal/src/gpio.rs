//! Discrete lines between host and sensor
//!
//! The device link uses one output (chip select, active low) and one input
//! (data ready, active high). Both are on-chip GPIO, so neither can fail.

/// Line driven by the host, e.g. chip select
pub trait OutputPin {
    /// Drive the line to logic 1
    fn set_high(&mut self);

    /// Drive the line to logic 0
    fn set_low(&mut self);
}

/// Line driven by the sensor, e.g. data ready
pub trait InputPin {
    /// Sample the line; true at logic 1
    fn is_high(&mut self) -> bool;

    /// Inverse of [`is_high`](Self::is_high)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}
