// src/writer/sync_writer.rs
use crate::dataset::StreakDataset;
use crate::error::{Result, StreakError};
use crate::layout::U8167Layout;
use crate::raw_data::RawDataBuffer;
use bytes::{BufMut, Bytes, BytesMut};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Synchronous encoder for u8167 raw images.
///
/// [`encode`](StreakWriter::encode) refuses datasets that do not fit into the
/// fixed blocks; [`encode_truncating`](StreakWriter::encode_truncating) cuts
/// them down to size like the acquisition software does.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakWriter {
    layout: U8167Layout,
}

struct Blocks {
    intensity: RawDataBuffer,
    wavelength: RawDataBuffer,
    time: RawDataBuffer,
}

impl StreakWriter {
    /// Writer for the instrument's default layout
    pub fn new() -> Self {
        StreakWriter { layout: U8167Layout::DEFAULT }
    }

    /// Writer for a custom layout; fails if the layout is inconsistent
    pub fn with_layout(layout: U8167Layout) -> Result<Self> {
        layout.validate()?;
        Ok(StreakWriter { layout })
    }

    pub fn layout(&self) -> &U8167Layout {
        &self.layout
    }

    /// Encode a dataset, failing with [`StreakError::CapacityExceeded`](crate::StreakError::CapacityExceeded)
    /// if it holds more samples, wavelengths or times than the layout decodes
    pub fn encode(&self, dataset: &StreakDataset) -> Result<Bytes> {
        self.check_resolution(dataset)?;
        let blocks = self.fill_blocks(dataset);
        blocks.intensity.check_capacity()?;
        blocks.wavelength.check_capacity()?;
        blocks.time.check_capacity()?;
        Ok(self.assemble(dataset, blocks))
    }

    /// Encode a dataset, dropping whatever does not fit into the blocks
    pub fn encode_truncating(&self, dataset: &StreakDataset) -> Bytes {
        let blocks = self.fill_blocks(dataset);
        self.assemble(dataset, blocks)
    }

    /// Encode a dataset into a stream
    pub fn write_to<W: Write>(&self, writer: &mut W, dataset: &StreakDataset) -> Result<()> {
        let bytes = self.encode(dataset)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Encode a dataset into a file, replacing it if it exists
    pub fn write_file(&self, path: impl AsRef<Path>, dataset: &StreakDataset) -> Result<()> {
        let bytes = self.encode(dataset)?;
        let mut file = BufWriter::new(File::create(path.as_ref())?);
        file.write_all(&bytes)?;
        file.flush()?;
        log::debug!("wrote {} bytes to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    // Counts are reported in bytes, like block overflows.
    fn check_resolution(&self, dataset: &StreakDataset) -> Result<()> {
        let checks = [
            ("intensity", dataset.len() * 2, self.layout.sample_count() * 2),
            (
                "wavelength",
                dataset.distinct_wavelengths().len() * 4,
                self.layout.wavelength_resolution * 4,
            ),
            ("time", dataset.distinct_times().len() * 4, self.layout.time_resolution * 4),
        ];
        for (block, required, capacity) in checks {
            if required > capacity {
                return Err(StreakError::CapacityExceeded { block, required, capacity });
            }
        }
        Ok(())
    }

    fn fill_blocks(&self, dataset: &StreakDataset) -> Blocks {
        let mut intensity = RawDataBuffer::new("intensity", self.layout.intensity_block_size());
        intensity.write_u16_slice(&dataset.intensity());

        let mut wavelength = RawDataBuffer::new("wavelength", self.layout.wavelength_block_size());
        wavelength.write_f32_slice(&dataset.distinct_wavelengths());

        let mut time = RawDataBuffer::new("time", self.layout.time_block_size());
        time.write_f32_slice(&dataset.distinct_times());

        Blocks { intensity, wavelength, time }
    }

    fn assemble(&self, dataset: &StreakDataset, blocks: Blocks) -> Bytes {
        let metadata = dataset.metadata();
        let mut out = BytesMut::with_capacity(self.layout.file_size(metadata.byte_len()));

        out.put_slice(dataset.header().as_bytes());
        for line in metadata.lines() {
            out.put_slice(line.as_bytes());
        }
        out.put(blocks.intensity.into_block());
        out.put(blocks.wavelength.into_block());
        out.put(blocks.time.into_block());
        out.freeze()
    }
}

/// Encode a dataset into a file with the default layout
pub fn write_file(path: impl AsRef<Path>, dataset: &StreakDataset) -> Result<()> {
    StreakWriter::new().write_file(path, dataset)
}
