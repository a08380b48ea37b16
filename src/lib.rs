// src/lib.rs
//! # streak-rs
//!
//! Reading, writing and analysing streak-camera images from time-resolved
//! photoluminescence (TRPL) measurements.
//!
//! A streak image is a grid of 16-bit intensities indexed by time and
//! wavelength. On disk it is stored in the U8167 layout: a 64-byte instrument
//! header, four lines of acquisition metadata and three fixed-size blocks for
//! intensity, wavelength and time.
//!
//! ## Features
//!
//! - 📦 **Lossless codec**: header bytes and metadata are carried through unchanged
//! - 🔒 **Strict or lenient**: short files decode with zero-fill, oversized datasets are refused on encode
//! - 📈 **Decay analysis**: smoothing spline, peak widths, decay start, fit range and least-squares fitting
//!
//! ## Quick Start
//!
//! ### Reading an image
//!
//! ```rust,no_run
//! use streak_rs::*;
//!
//! fn main() -> Result<()> {
//!     let data = read_file("measurement.img")?;
//!
//!     let image = data.to_streak_image()?;
//!     println!("{} x {} image", image.shape().0, image.shape().1);
//!
//!     let spectrum = data.aggregate_along_time(None);
//!     println!("{} wavelengths", spectrum.wavelength.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Fitting a decay
//!
//! ```rust,no_run
//! use streak_rs::prelude::*;
//! use streak_rs::analysis::{curve_fit, determine_fit_range, FitOptions, FitRangeOptions};
//!
//! fn main() -> Result<()> {
//!     let data = read_file("measurement.img")?;
//!     let curve = data.aggregate_along_wavelength(Some((480.0, 500.0)), Offset::Auto, Offset::Auto)?;
//!
//!     let (left, right) = determine_fit_range(&curve.time, &curve.intensity, &FitRangeOptions::default())?;
//!     let (t, y): (Vec<f64>, Vec<f64>) = curve
//!         .time
//!         .iter()
//!         .zip(&curve.intensity)
//!         .filter(|(t, _)| **t >= left && **t <= right)
//!         .unzip();
//!
//!     let fit = curve_fit(|t, p| p[0] * (-t / p[1]).exp(), &t, &y, &FitOptions::new(vec![1000.0, 1.0]))?;
//!     println!("lifetime: {} ns", fit.params[1]);
//!     Ok(())
//! }
//! ```
//!
//! ### Writing an image
//!
//! ```rust,no_run
//! use streak_rs::*;
//!
//! fn main() -> Result<()> {
//!     let data = StreakDataset::from_axes(&[0.0, 1.0], &[500.0, 510.0], &[10, 20, 30, 40])?;
//!     write_file("synthetic.img", &data)?;
//!     Ok(())
//! }
//! ```

// Modules
pub mod analysis;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod legacy;
pub mod raw_data;
pub mod reader;
pub mod types;
pub mod writer;

mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{Result, StreakError};

pub use types::{MetadataBlock, RawHeader, Sample};

pub use layout::U8167Layout;

pub use raw_data::{RawDataBuffer, RawDataReader};

pub use dataset::{DecayCurve, Offset, Spectrum, StreakDataset, StreakImage};

pub use reader::{read_bytes, read_file, read_from, StreakReader};

pub use writer::{write_file, StreakWriter};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use streak_rs::prelude::*;
    //! ```

    pub use crate::dataset::{DecayCurve, Offset, Spectrum, StreakDataset, StreakImage};
    pub use crate::error::{Result, StreakError};
    pub use crate::reader::{read_file, StreakReader};
    pub use crate::types::Sample;
    pub use crate::writer::{write_file, StreakWriter};
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_default_file_size() {
        let layout = U8167Layout::default();
        let metadata = MetadataBlock::default();
        assert_eq!(
            layout.file_size(metadata.byte_len()),
            64 + metadata.byte_len() + 614_400 + 4096 + 4096
        );
    }

    #[test]
    fn test_crate_level_round_trip() {
        let data = StreakDataset::from_axes(&[0.0, 5.0], &[400.0, 450.0], &[1, 2, 3, 4]).unwrap();
        let bytes = StreakWriter::new().encode(&data).unwrap();
        let back = read_bytes(&bytes).unwrap();
        // decoding a full-size block yields the whole default grid
        assert_eq!(back.len(), 480 * 640);
        assert_eq!(&back.samples()[..2], &data.samples()[..2]);
        assert_eq!(back.header(), data.header());
        assert_eq!(back.metadata(), data.metadata());
    }
}
