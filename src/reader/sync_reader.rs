// src/reader/sync_reader.rs
use crate::dataset::StreakDataset;
use crate::error::{StreakError, Result};
use crate::layout::U8167Layout;
use crate::raw_data::RawDataReader;
use crate::types::{MetadataBlock, RawHeader, Sample};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// Synchronous decoder for u8167 raw images.
///
/// The reader holds only the block layout; every call decodes a complete
/// dataset and leaves no state behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakReader {
    layout: U8167Layout,
}

impl StreakReader {
    /// Reader for the instrument's default layout
    pub fn new() -> Self {
        StreakReader { layout: U8167Layout::DEFAULT }
    }

    /// Reader for a custom layout; fails if the layout is inconsistent
    pub fn with_layout(layout: U8167Layout) -> Result<Self> {
        layout.validate()?;
        Ok(StreakReader { layout })
    }

    pub fn layout(&self) -> &U8167Layout {
        &self.layout
    }

    /// Decode a raw image file
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<StreakDataset> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(StreakError::InvalidInputType(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        log::debug!("reading {} ({} bytes)", path.display(), metadata.len());
        let file = File::open(path)?;
        self.decode(&mut BufReader::with_capacity(65536, file))
    }

    /// Decode a raw image from a buffered stream.
    ///
    /// Reading stops at the end of the time block; anything after it is left
    /// in `reader`. Wrap unbuffered sources in a [`BufReader`] first.
    pub fn read_from<R: BufRead>(&self, mut reader: R) -> Result<StreakDataset> {
        self.decode(&mut reader)
    }

    /// Decode a raw image held in memory
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<StreakDataset> {
        let mut cursor = bytes;
        self.decode(&mut cursor)
    }

    /// Decode a raw image file through a memory map (requires "mmap" feature)
    #[cfg(feature = "mmap")]
    pub fn read_mmap(&self, path: impl AsRef<Path>) -> Result<StreakDataset> {
        let path = path.as_ref();
        if !fs::metadata(path)?.is_file() {
            return Err(StreakError::InvalidInputType(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        self.read_bytes(&mmap)
    }

    fn decode<R: BufRead>(&self, reader: &mut R) -> Result<StreakDataset> {
        let layout = &self.layout;

        let header = RawDataReader::read_block(reader, U8167Layout::HEADER_SIZE, "header")?;
        let header = RawHeader::from_slice(&header);

        let mut lines = Vec::with_capacity(U8167Layout::METADATA_LINES);
        for _ in 0..U8167Layout::METADATA_LINES {
            lines.push(RawDataReader::read_line(reader)?);
        }
        let metadata = MetadataBlock::new(lines);

        let intensity = RawDataReader::read_u16_block(
            reader,
            layout.intensity_block_size(),
            layout.sample_count(),
            "intensity",
        )?;
        let wavelength = RawDataReader::read_f32_block(
            reader,
            layout.wavelength_block_size(),
            layout.wavelength_resolution,
            "wavelength",
        )?;
        let time = RawDataReader::read_f32_block(
            reader,
            layout.time_block_size(),
            layout.time_resolution,
            "time",
        )?;

        let width = wavelength.len();
        let samples: Vec<Sample> = intensity
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample::new(time[i / width], wavelength[i % width], value))
            .collect();

        log::debug!(
            "decoded {} samples ({} times x {} wavelengths)",
            samples.len(),
            time.len(),
            width
        );
        Ok(StreakDataset::with_parts(samples, header, metadata))
    }
}

/// Decode a raw image file with the default layout
pub fn read_file(path: impl AsRef<Path>) -> Result<StreakDataset> {
    StreakReader::new().read_file(path)
}

/// Decode a raw image from a byte stream with the default layout
pub fn read_from<R: BufRead>(reader: R) -> Result<StreakDataset> {
    StreakReader::new().read_from(reader)
}

/// Decode an in-memory raw image with the default layout
pub fn read_bytes(bytes: &[u8]) -> Result<StreakDataset> {
    StreakReader::new().read_bytes(bytes)
}
