//! Dataset bookkeeping
//!
//! The sensor produces a fixed set of datasets. The driver keeps one
//! [`Descriptor`] per dataset and an ordered list of the ones being streamed.

pub mod descriptor;
pub mod registry;

pub use descriptor::*;
pub use registry::*;
