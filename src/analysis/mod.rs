// src/analysis/mod.rs
//! Decay-curve analysis.
//!
//! Every routine here works on plain `(x, y)` slices of equal length, so the
//! curves can come from [`StreakDataset`](crate::StreakDataset) aggregation or
//! from anywhere else.
//!
//! - [`smooth`] - centered moving average
//! - [`SmoothingSpline`] - GCV smoothing spline used to denoise before the steps below
//! - [`find_peaks`] - peaks with half-height widths
//! - [`find_scdc`] - start coordinates of a decay curve
//! - [`determine_fit_range`] - x range suitable for fitting a decay
//! - [`curve_fit`] - nonlinear least squares on the spline-resampled curve

mod curve_fit;
mod fit_range;
mod peaks;
mod scdc;
mod signal;
mod smooth;
mod spline;

pub use curve_fit::{curve_fit, least_squares, CurveFit, FitOptions};
pub use fit_range::{determine_fit_range, FitRangeOptions, PEAK_LAG_SHIFT};
pub use peaks::{find_peaks, Peak, PeakOptions};
pub use scdc::{find_scdc, Scdc, ScdcOptions};
pub use signal::{detect_peaks, DetectedPeak, PeakDetection};
pub use smooth::{smooth, smooth_default};
pub use spline::SmoothingSpline;

use crate::error::{StreakError, Result};

/// Check that `x` and `y` have the same, non-zero length.
pub fn validate_xy(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(StreakError::Validation(format!(
            "the length of `x` and `y` must be the same: {} != {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(StreakError::Validation("`x` and `y` must not be empty".into()));
    }
    Ok(())
}
