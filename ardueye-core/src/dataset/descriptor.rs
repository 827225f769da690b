//! Dataset descriptors

use ardueye_protocol::DisplayHint;

use crate::config::{MAX_DATASETS, MAX_IN_SERIAL, MAX_SPI_PACKET_SIZE};

/// Dataset identifiers understood by the sensor
pub mod ids {
    /// Raw grayscale image
    pub const RAW: u8 = 48;
    /// Optic flow, X component
    pub const FLOW_X: u8 = 50;
    /// Optic flow, Y component
    pub const FLOW_Y: u8 = 52;
    /// Frames per second
    pub const FPS: u8 = 54;
    /// Echo of the last command
    pub const CMD: u8 = 56;
    /// Image extrema locations
    pub const MAXES: u8 = 58;
}

/// Optic flow field size
const FLOW_SIZE: usize = 64;

/// Transport and display metadata for one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Identifier sent on both links
    pub id: u8,
    /// Rendering hint forwarded to the UI
    pub hint: DisplayHint,
    /// Short name used in monitor output
    pub label: Option<&'static str>,
    /// Expected upper bound on the payload size
    pub capacity: usize,
    pub(crate) active: bool,
}

impl Descriptor {
    /// Create an inactive descriptor
    pub const fn new(id: u8, hint: DisplayHint, capacity: usize) -> Self {
        Self {
            id,
            hint,
            label: None,
            capacity,
            active: false,
        }
    }

    /// Attach a label
    pub const fn with_label(self, label: &'static str) -> Self {
        Self {
            label: Some(label),
            ..self
        }
    }

    /// True while the dataset is being streamed
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// The dataset table of the stock ArduEye firmware
pub const DEFAULT_DATASETS: [Descriptor; MAX_DATASETS] = [
    Descriptor::new(ids::RAW, DisplayHint::Image, MAX_SPI_PACKET_SIZE).with_label("raw"),
    Descriptor::new(ids::FLOW_X, DisplayHint::Chart, FLOW_SIZE).with_label("flow-x"),
    Descriptor::new(ids::FLOW_Y, DisplayHint::Chart, FLOW_SIZE).with_label("flow-y"),
    Descriptor::new(ids::FPS, DisplayHint::Text, 2).with_label("fps"),
    Descriptor::new(ids::CMD, DisplayHint::Dump, MAX_IN_SERIAL).with_label("cmd"),
    Descriptor::new(ids::MAXES, DisplayHint::Points, FLOW_SIZE).with_label("maxes"),
];
