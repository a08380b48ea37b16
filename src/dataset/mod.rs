// src/dataset/mod.rs
//! Decoded streak-camera measurements.
//!
//! A [`StreakDataset`] owns the sample table of one measurement together with
//! the raw header and metadata it was read with. It is an immutable value:
//! every derived view ([`StreakImage`], [`Spectrum`], [`DecayCurve`]) is a new
//! value computed from it.

mod aggregate;
mod image;

pub use aggregate::{DecayCurve, Offset, Spectrum};
pub use image::StreakImage;

use crate::error::{StreakError, Result};
use crate::layout::U8167Layout;
use crate::types::{MetadataBlock, RawHeader, Sample};
use crate::utils::{distinct_count, distinct_in_order};
use crate::writer::StreakWriter;
use bytes::Bytes;

/// Full time-resolved photoluminescence measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct StreakDataset {
    samples: Vec<Sample>,
    header: RawHeader,
    metadata: MetadataBlock,
}

impl StreakDataset {
    /// Create a dataset with the placeholder header and metadata
    pub fn new(samples: Vec<Sample>) -> Self {
        Self::with_parts(samples, RawHeader::default(), MetadataBlock::default())
    }

    pub fn with_parts(samples: Vec<Sample>, header: RawHeader, metadata: MetadataBlock) -> Self {
        StreakDataset { samples, header, metadata }
    }

    /// Build a dataset from its axes, tiling them row-major.
    ///
    /// Sample `i` is `(time[i / W], wavelength[i % W], intensity[i])` with
    /// `W = wavelength.len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use streak_rs::StreakDataset;
    ///
    /// let data = StreakDataset::from_axes(&[0.0, 5.0], &[400.0, 450.0], &[1, 2, 3, 4]).unwrap();
    /// assert_eq!(data.time(), vec![0.0, 0.0, 5.0, 5.0]);
    /// assert_eq!(data.wavelength(), vec![400.0, 450.0, 400.0, 450.0]);
    /// ```
    pub fn from_axes(time: &[f32], wavelength: &[f32], intensity: &[u16]) -> Result<Self> {
        if intensity.len() != time.len() * wavelength.len() {
            return Err(StreakError::Validation(format!(
                "{} intensity values do not match {} times x {} wavelengths",
                intensity.len(),
                time.len(),
                wavelength.len()
            )));
        }

        let samples = intensity
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let w = wavelength.len();
                Sample::new(time[i / w], wavelength[i % w], value)
            })
            .collect();
        Ok(Self::new(samples))
    }

    /// Replace the header, keeping everything else
    pub fn with_header(mut self, header: RawHeader) -> Self {
        self.header = header;
        self
    }

    /// Replace the metadata, keeping everything else
    pub fn with_metadata(mut self, metadata: MetadataBlock) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    pub fn metadata(&self) -> &MetadataBlock {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of every sample in nanoseconds
    pub fn time(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Wavelength of every sample in nanometers
    pub fn wavelength(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.wavelength).collect()
    }

    /// Intensity of every sample in arbitrary units
    pub fn intensity(&self) -> Vec<u16> {
        self.samples.iter().map(|s| s.intensity).collect()
    }

    /// Distinct times in order of first appearance
    pub fn distinct_times(&self) -> Vec<f32> {
        distinct_in_order(self.samples.iter().map(|s| s.time))
    }

    /// Distinct wavelengths in order of first appearance
    pub fn distinct_wavelengths(&self) -> Vec<f32> {
        distinct_in_order(self.samples.iter().map(|s| s.wavelength))
    }

    /// Whether the dataset can be encoded with `layout` without losing data
    pub fn fits_layout(&self, layout: &U8167Layout) -> bool {
        distinct_count(self.samples.iter().map(|s| s.time)) <= layout.time_resolution
            && distinct_count(self.samples.iter().map(|s| s.wavelength))
                <= layout.wavelength_resolution
            && self.samples.len() <= layout.sample_count()
    }

    /// Reshape the samples into a time x wavelength grid.
    ///
    /// Samples are sorted by time and then wavelength, both ascending.
    /// Fails with [`StreakError::Shape`] if the samples do not cover a
    /// complete rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// use streak_rs::StreakDataset;
    ///
    /// let data = StreakDataset::from_axes(
    ///     &[0.0, 5.0, 10.0],
    ///     &[400.0, 450.0, 500.0],
    ///     &[44, 47, 64, 67, 67, 9, 83, 21, 36],
    /// ).unwrap();
    /// let image = data.to_streak_image().unwrap();
    /// assert_eq!(image.to_rows(), vec![
    ///     vec![44.0, 47.0, 64.0],
    ///     vec![67.0, 67.0, 9.0],
    ///     vec![83.0, 21.0, 36.0],
    /// ]);
    /// ```
    pub fn to_streak_image(&self) -> Result<StreakImage> {
        StreakImage::from_samples(&self.samples)
    }

    /// Encode into the instrument's raw binary format.
    ///
    /// Data that does not fit into the fixed blocks is dropped; use
    /// [`StreakWriter::encode`] to get an error instead.
    pub fn to_raw_binary(&self) -> Bytes {
        StreakWriter::new().encode_truncating(self)
    }
}
