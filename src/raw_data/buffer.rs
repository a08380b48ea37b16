// src/raw_data/buffer.rs
use bytes::{BufMut, Bytes, BytesMut};
use crate::error::{StreakError, Result};

/// Buffer for one fixed-size block of a raw image.
///
/// Values are appended little-endian. When the block is finished the content
/// is right-padded with zero bytes up to the block size, or cut off at the
/// block size if it grew larger.
///
/// # Example
///
/// ```
/// use streak_rs::raw_data::RawDataBuffer;
///
/// let mut buffer = RawDataBuffer::new("time", 8);
/// buffer.write_f32_slice(&[1.0, 2.0]);
/// assert_eq!(buffer.value_count(), 2);
/// assert_eq!(buffer.byte_len(), 8);
/// assert_eq!(buffer.overflow(), 0);
/// ```
pub struct RawDataBuffer {
    buffer: BytesMut,
    block: &'static str,
    block_size: usize,
    value_count: u64,
}

impl RawDataBuffer {
    /// Create a buffer for a block of `block_size` bytes
    ///
    /// # Arguments
    ///
    /// * `block` - Block name used in errors and log messages
    /// * `block_size` - Size of the block on disk
    pub fn new(block: &'static str, block_size: usize) -> Self {
        RawDataBuffer {
            buffer: BytesMut::with_capacity(block_size),
            block,
            block_size,
            value_count: 0,
        }
    }

    /// Write a slice of `u16` values (little-endian)
    pub fn write_u16_slice(&mut self, values: &[u16]) {
        for &value in values {
            self.buffer.put_u16_le(value);
        }
        self.value_count += values.len() as u64;
    }

    /// Write a slice of `f32` values (little-endian)
    pub fn write_f32_slice(&mut self, values: &[f32]) {
        for &value in values {
            self.buffer.put_f32_le(value);
        }
        self.value_count += values.len() as u64;
    }

    /// Number of values written so far
    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    /// Number of bytes written so far
    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes that do not fit into the block
    pub fn overflow(&self) -> usize {
        self.buffer.len().saturating_sub(self.block_size)
    }

    /// Fail if the written data does not fit into the block
    pub fn check_capacity(&self) -> Result<()> {
        if self.overflow() > 0 {
            return Err(StreakError::CapacityExceeded {
                block: self.block,
                required: self.buffer.len(),
                capacity: self.block_size,
            });
        }
        Ok(())
    }

    /// Finish the block: pad with zeros or truncate to the block size
    pub fn into_block(mut self) -> Bytes {
        if self.overflow() > 0 {
            log::warn!(
                "truncating {} block: {} bytes do not fit into {}",
                self.block,
                self.buffer.len(),
                self.block_size
            );
            self.buffer.truncate(self.block_size);
        } else {
            self.buffer.resize(self.block_size, 0);
        }
        self.buffer.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_little_endian() {
        let mut buffer = RawDataBuffer::new("intensity", 4);
        buffer.write_u16_slice(&[0x0102]);
        let block = buffer.into_block();
        assert_eq!(&block[..], &[0x02, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_truncate_oversized_block() {
        let mut buffer = RawDataBuffer::new("time", 4);
        buffer.write_f32_slice(&[1.0, 2.0]);
        assert_eq!(buffer.overflow(), 4);
        assert!(matches!(
            buffer.check_capacity(),
            Err(StreakError::CapacityExceeded { block: "time", required: 8, capacity: 4 })
        ));

        let block = buffer.into_block();
        assert_eq!(&block[..], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_empty_block_is_zeroed() {
        let buffer = RawDataBuffer::new("wavelength", 16);
        assert!(buffer.is_empty());
        let block = buffer.into_block();
        assert_eq!(block.len(), 16);
        assert!(block.iter().all(|&b| b == 0));
    }
}
