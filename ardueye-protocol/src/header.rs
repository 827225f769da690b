//! Dataset header returned by the sensor
//!
//! Layout (5 bytes):
//! - dataset id echo
//! - rows, 16-bit big-endian
//! - columns, 16-bit big-endian

/// Size of a dataset header on the device link
pub const HEADER_SIZE: usize = 5;

/// Shape of the dataset the sensor is about to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataHeader {
    /// Dataset id as echoed by the sensor
    pub id: u8,
    pub rows: u16,
    pub cols: u16,
}

impl DataHeader {
    /// Decode a header read from the device link
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            id: bytes[0],
            rows: u16::from_be_bytes([bytes[1], bytes[2]]),
            cols: u16::from_be_bytes([bytes[3], bytes[4]]),
        }
    }

    /// Encode to wire format
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [rows_hi, rows_lo] = self.rows.to_be_bytes();
        let [cols_hi, cols_lo] = self.cols.to_be_bytes();
        [self.id, rows_hi, rows_lo, cols_hi, cols_lo]
    }

    /// Payload length in bytes, or `None` when the header describes no data
    pub fn payload_len(&self) -> Option<usize> {
        let len = u32::from(self.rows) * u32::from(self.cols);
        if len == 0 {
            return None;
        }
        usize::try_from(len).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header() {
        let header = DataHeader::from_bytes(&[48, 0, 4, 0, 4]);
        assert_eq!(header.id, 48);
        assert_eq!(header.rows, 4);
        assert_eq!(header.cols, 4);
        assert_eq!(header.payload_len(), Some(16));
    }

    #[test]
    fn test_big_endian_fields() {
        let header = DataHeader::from_bytes(&[50, 0x01, 0x02, 0x00, 0x10]);
        assert_eq!(header.rows, 0x0102);
        assert_eq!(header.cols, 0x0010);
        assert_eq!(header.to_bytes(), [50, 0x01, 0x02, 0x00, 0x10]);
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(DataHeader::from_bytes(&[48, 0, 0, 0, 9]).payload_len(), None);
        assert_eq!(DataHeader::from_bytes(&[48, 0, 9, 0, 0]).payload_len(), None);
    }

    #[test]
    fn test_large_dataset() {
        let header = DataHeader::from_bytes(&[48, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(header.payload_len(), Some(65535 * 65535));
    }
}
