// src/raw_data/reader.rs
use crate::error::{StreakError, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::{BufRead, Read};

/// Helper functions for reading the fixed blocks of a raw image.
///
/// Reads never fail on a short stream: missing bytes are zero-filled and the
/// shortfall is logged.
pub struct RawDataReader;

impl RawDataReader {
    /// Read a block of exactly `size` bytes, zero-filling past the end of the stream
    ///
    /// # Example
    ///
    /// ```
    /// use streak_rs::raw_data::RawDataReader;
    /// use std::io::Cursor;
    ///
    /// let mut cursor = Cursor::new(vec![1u8, 2, 3]);
    /// let block = RawDataReader::read_block(&mut cursor, 5, "test").unwrap();
    /// assert_eq!(block, vec![1, 2, 3, 0, 0]);
    /// ```
    pub fn read_block<R: Read>(reader: &mut R, size: usize, block: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(size);
        let read = reader.by_ref().take(size as u64).read_to_end(&mut bytes)?;

        if read < size {
            log::warn!(
                "short read in {} block: got {} of {} bytes, zero-filling",
                block,
                read,
                size
            );
            bytes.resize(size, 0);
        }
        Ok(bytes)
    }

    /// Read a block and decode its first `count` little-endian `u16` values
    ///
    /// # Example
    ///
    /// ```
    /// use streak_rs::raw_data::RawDataReader;
    /// use std::io::Cursor;
    ///
    /// let mut cursor = Cursor::new(vec![1u8, 0, 2, 0, 0xff, 0xff]);
    /// let values = RawDataReader::read_u16_block(&mut cursor, 6, 2, "intensity").unwrap();
    /// assert_eq!(values, vec![1, 2]);
    /// ```
    pub fn read_u16_block<R: Read>(
        reader: &mut R,
        size: usize,
        count: usize,
        block: &str,
    ) -> Result<Vec<u16>> {
        Self::check_count(size, count, 2, block)?;
        let bytes = Self::read_block(reader, size, block)?;

        let mut values = vec![0u16; count];
        LittleEndian::read_u16_into(&bytes[..count * 2], &mut values);
        Ok(values)
    }

    /// Read a block and decode its first `count` little-endian `f32` values
    pub fn read_f32_block<R: Read>(
        reader: &mut R,
        size: usize,
        count: usize,
        block: &str,
    ) -> Result<Vec<f32>> {
        Self::check_count(size, count, 4, block)?;
        let bytes = Self::read_block(reader, size, block)?;

        let mut values = vec![0f32; count];
        LittleEndian::read_f32_into(&bytes[..count * 4], &mut values);
        Ok(values)
    }

    /// Read one newline-terminated UTF-8 line, keeping the terminator.
    ///
    /// Returns an empty string at end of stream.
    pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
        let mut bytes = Vec::with_capacity(128);
        reader.read_until(b'\n', &mut bytes)?;
        String::from_utf8(bytes).map_err(|_| StreakError::InvalidUtf8)
    }

    fn check_count(size: usize, count: usize, width: usize, block: &str) -> Result<()> {
        if count * width > size {
            return Err(StreakError::Validation(format!(
                "{} block of {} bytes cannot hold {} values",
                block, size, count
            )));
        }
        Ok(())
    }
}
