// src/layout/u8167.rs
use crate::error::{StreakError, Result};

/// Block geometry of a u8167 raw image.
///
/// The default value describes the 480 x 640 images the instrument writes.
/// A layout is a plain value; readers and writers copy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct U8167Layout {
    pub sector_size: usize,
    pub wavelength_resolution: usize,
    pub time_resolution: usize,
    pub num_sector_intensity: usize,
    pub num_sector_wavelength: usize,
    pub num_sector_time: usize,
}

impl U8167Layout {
    pub const HEADER_SIZE: usize = 64;
    pub const METADATA_LINES: usize = 4;
    pub const ENCODING: &'static str = "UTF-8";

    pub const DEFAULT: U8167Layout = U8167Layout {
        sector_size: 1024,
        wavelength_resolution: 640,
        time_resolution: 480,
        num_sector_intensity: 600,
        num_sector_wavelength: 4,
        num_sector_time: 4,
    };

    /// Size in bytes of the intensity block
    pub fn intensity_block_size(&self) -> usize {
        self.sector_size * self.num_sector_intensity
    }

    /// Size in bytes of the wavelength block
    pub fn wavelength_block_size(&self) -> usize {
        self.sector_size * self.num_sector_wavelength
    }

    /// Size in bytes of the time block
    pub fn time_block_size(&self) -> usize {
        self.sector_size * self.num_sector_time
    }

    /// Number of samples in a decoded image (time x wavelength)
    pub fn sample_count(&self) -> usize {
        self.time_resolution * self.wavelength_resolution
    }

    /// Total file size for a given metadata length
    pub fn file_size(&self, metadata_len: usize) -> usize {
        Self::HEADER_SIZE
            + metadata_len
            + self.intensity_block_size()
            + self.wavelength_block_size()
            + self.time_block_size()
    }

    /// Check that the resolutions fit into their blocks.
    pub fn validate(&self) -> Result<()> {
        if self.sector_size == 0 {
            return Err(StreakError::Validation("sector size must be positive".into()));
        }
        if self.time_resolution == 0 || self.wavelength_resolution == 0 {
            return Err(StreakError::Validation(format!(
                "resolutions must be positive: time={}, wavelength={}",
                self.time_resolution, self.wavelength_resolution
            )));
        }

        let checks = [
            ("intensity", self.sample_count() * 2, self.intensity_block_size()),
            ("wavelength", self.wavelength_resolution * 4, self.wavelength_block_size()),
            ("time", self.time_resolution * 4, self.time_block_size()),
        ];
        for (block, required, capacity) in checks {
            if required > capacity {
                return Err(StreakError::Validation(format!(
                    "{} block of {} bytes cannot hold {} bytes",
                    block, capacity, required
                )));
            }
        }
        Ok(())
    }
}

impl Default for U8167Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block_sizes() {
        let layout = U8167Layout::default();
        assert_eq!(layout.intensity_block_size(), 614_400);
        assert_eq!(layout.wavelength_block_size(), 4096);
        assert_eq!(layout.time_block_size(), 4096);
        assert_eq!(layout.sample_count(), 307_200);
        assert_eq!(layout.file_size(0), 64 + 614_400 + 4096 + 4096);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_oversized_resolution_rejected() {
        let layout = U8167Layout {
            wavelength_resolution: 2048,
            ..U8167Layout::DEFAULT
        };
        assert!(matches!(layout.validate(), Err(StreakError::Validation(_))));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let layout = U8167Layout {
            time_resolution: 0,
            ..U8167Layout::DEFAULT
        };
        assert!(layout.validate().is_err());
    }
}
