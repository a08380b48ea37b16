// src/raw_data/mod.rs
//! Raw block handling for u8167 images
//!
//! - [`RawDataBuffer`] - Accumulates one fixed-size block for writing
//! - [`RawDataReader`] - Reads fixed-size blocks with zero-fill on short input
//!
//! # Examples
//!
//! ```
//! use streak_rs::raw_data::{RawDataBuffer, RawDataReader};
//! use std::io::Cursor;
//!
//! let mut buffer = RawDataBuffer::new("intensity", 16);
//! buffer.write_u16_slice(&[10, 20, 30]);
//! let block = buffer.into_block();
//! assert_eq!(block.len(), 16);
//!
//! let mut cursor = Cursor::new(block.to_vec());
//! let values = RawDataReader::read_u16_block(&mut cursor, 16, 3, "intensity").unwrap();
//! assert_eq!(values, vec![10, 20, 30]);
//! ```

mod buffer;
mod reader;

pub use buffer::RawDataBuffer;
pub use reader::RawDataReader;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffer_and_reader_roundtrip() {
        let mut buffer = RawDataBuffer::new("wavelength", 32);
        let original = vec![400.0f32, 450.0, 500.0];
        buffer.write_f32_slice(&original);

        let block = buffer.into_block();
        let mut cursor = Cursor::new(block.to_vec());
        let read = RawDataReader::read_f32_block(&mut cursor, 32, 3, "wavelength").unwrap();

        assert_eq!(original, read);
    }

    #[test]
    fn test_padding_decodes_as_zero() {
        let mut buffer = RawDataBuffer::new("time", 12);
        buffer.write_f32_slice(&[5.0]);

        let block = buffer.into_block();
        let mut cursor = Cursor::new(block.to_vec());
        let read = RawDataReader::read_f32_block(&mut cursor, 12, 3, "time").unwrap();

        assert_eq!(read, vec![5.0, 0.0, 0.0]);
    }
}
