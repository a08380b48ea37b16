// src/analysis/fit_range.rs
use super::spline::SmoothingSpline;
use super::validate_xy;
use crate::error::{StreakError, Result};
use crate::utils::argmax;

/// Samples between the smoothed maximum and the left end of the fit range.
///
/// Starting just after the maximum keeps the instrument response of the
/// rising edge out of the fit.
pub const PEAK_LAG_SHIFT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRangeOptions {
    /// Number of points the smoothed curve is sampled on
    pub spline_size: usize,
    /// Fraction of the peak height where the range ends
    pub decay_ratio: f64,
}

impl Default for FitRangeOptions {
    fn default() -> Self {
        FitRangeOptions { spline_size: 1000, decay_ratio: 0.10 }
    }
}

impl FitRangeOptions {
    pub fn with_spline_size(mut self, spline_size: usize) -> Self {
        self.spline_size = spline_size;
        self
    }

    pub fn with_decay_ratio(mut self, decay_ratio: f64) -> Self {
        self.decay_ratio = decay_ratio;
        self
    }
}

/// Determine the `(left, right)` x range over which a decay curve should be fitted.
///
/// The curve is smoothed and resampled; the range starts
/// [`PEAK_LAG_SHIFT`] samples after the smoothed maximum and ends at the last
/// sample still above `decay_ratio` of the maximum.
pub fn determine_fit_range(x: &[f64], y: &[f64], options: &FitRangeOptions) -> Result<(f64, f64)> {
    validate_xy(x, y)?;
    if options.spline_size == 0 {
        return Err(StreakError::Validation("spline_size must be positive".into()));
    }

    let spline = SmoothingSpline::fit(x, y)?;
    let (xs, ys) = spline.resample(options.spline_size);
    let peak = argmax(&ys)
        .ok_or_else(|| StreakError::Validation("smoothed curve has no finite values".into()))?;

    let left = xs[lagged_peak(&ys).unwrap_or(xs.len() - 1)];
    let threshold = options.decay_ratio * ys[peak];
    let right = xs
        .iter()
        .zip(&ys)
        .skip(peak + 1)
        .filter(|(_, &v)| v >= threshold)
        .map(|(&xi, _)| xi)
        .fold(xs[peak], f64::max);

    log::debug!("fit range ({}, {}) around peak at {}", left, right, xs[peak]);
    Ok((left, right))
}

/// Index of the maximum of `ys` delayed by [`PEAK_LAG_SHIFT`] samples.
///
/// The last samples cannot be the source of a delayed value, so a maximum in
/// that tail moves the index back to the largest earlier sample.
fn lagged_peak(ys: &[f64]) -> Option<usize> {
    let head = ys.len().checked_sub(PEAK_LAG_SHIFT)?;
    argmax(&ys[..head]).map(|i| i + PEAK_LAG_SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::linspace;

    fn step_decay() -> (Vec<f64>, Vec<f64>) {
        let x = linspace(-5.0, 5.0, 1000);
        let y = x
            .iter()
            .map(|&v| if v > -2.0 { (-(v + 2.0)).exp() } else { 0.0 })
            .collect();
        (x, y)
    }

    #[test]
    fn test_step_decay_range() {
        let (x, y) = step_decay();
        let (left, right) = determine_fit_range(&x, &y, &FitRangeOptions::default()).unwrap();
        assert!(left > -2.05 && left < -1.8, "left = {}", left);
        // exp(-(x + 2)) = 0.1 at x = ln(10) - 2
        assert!((right - (10f64.ln() - 2.0)).abs() < 0.1, "right = {}", right);
    }

    #[test]
    fn test_idempotent() {
        let (x, y) = step_decay();
        let options = FitRangeOptions::default();
        assert_eq!(
            determine_fit_range(&x, &y, &options).unwrap(),
            determine_fit_range(&x, &y, &options).unwrap()
        );
    }

    #[test]
    fn test_lagged_peak() {
        assert_eq!(lagged_peak(&[0.0, 1.0, 3.0, 2.0, 1.0, 0.0]), Some(4));
        // maximum in the tail: the delayed curve peaks after the earlier hump
        assert_eq!(lagged_peak(&[0.0, 5.0, 1.0, 0.0, 9.0]), Some(3));
        assert_eq!(lagged_peak(&[1.0, 2.0]), None);
    }

    #[test]
    fn test_peak_at_end() {
        let x = linspace(0.0, 1.0, 20);
        let (left, right) =
            determine_fit_range(&x, &x, &FitRangeOptions::default().with_spline_size(50)).unwrap();
        assert_eq!(left, 1.0);
        assert_eq!(right, 1.0);
    }

    #[test]
    fn test_invalid_input() {
        assert!(determine_fit_range(&[], &[], &FitRangeOptions::default()).is_err());
        assert!(determine_fit_range(&[0.0], &[1.0, 2.0], &FitRangeOptions::default()).is_err());
    }
}
