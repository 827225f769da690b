//! Display hints sent to the UI with every dataset header

/// How the UI should render a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayHint {
    /// Not rendered
    #[default]
    None,
    /// Grayscale image, rows x cols pixels
    Image,
    /// Line chart, one series per row
    Chart,
    /// Text values; the column count is sent in front of the data
    Text,
    /// Raw byte dump
    Dump,
    /// Point markers overlaid on the image
    Points,
}

// Wire format values
const HINT_NONE: u8 = 0;
const HINT_IMAGE: u8 = 1;
const HINT_CHART: u8 = 2;
const HINT_TEXT: u8 = 4;
const HINT_DUMP: u8 = 5;
const HINT_POINTS: u8 = 6;

impl DisplayHint {
    /// Parse a hint from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            HINT_NONE => Some(DisplayHint::None),
            HINT_IMAGE => Some(DisplayHint::Image),
            HINT_CHART => Some(DisplayHint::Chart),
            HINT_TEXT => Some(DisplayHint::Text),
            HINT_DUMP => Some(DisplayHint::Dump),
            HINT_POINTS => Some(DisplayHint::Points),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            DisplayHint::None => HINT_NONE,
            DisplayHint::Image => HINT_IMAGE,
            DisplayHint::Chart => HINT_CHART,
            DisplayHint::Text => HINT_TEXT,
            DisplayHint::Dump => HINT_DUMP,
            DisplayHint::Points => HINT_POINTS,
        }
    }
}
