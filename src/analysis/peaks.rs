// src/analysis/peaks.rs
use super::signal::{detect_peaks, PeakDetection};
use super::spline::SmoothingSpline;
use super::validate_xy;
use crate::error::{StreakError, Result};

/// A peak of a smoothed curve together with its width at a fraction of its height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub x: f64,
    pub y: f64,
    /// Left crossing of the width level
    pub x0: f64,
    /// Right crossing of the width level
    pub x1: f64,
    /// Level at which the width is measured
    pub y0: f64,
}

impl Peak {
    /// `x1 - x0`; the full width at half maximum with the default ratio
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakOptions {
    /// Number of points the smoothed curve is sampled on
    pub spline_size: usize,
    /// Minimum peak width in sampled points; replaces `detection.width`
    pub width: f64,
    /// Fraction of the peak height at which `x0` and `x1` are measured
    pub width_height_ratio: f64,
    /// Further filters applied to the sampled curve
    pub detection: PeakDetection,
}

impl Default for PeakOptions {
    fn default() -> Self {
        PeakOptions {
            spline_size: 1000,
            width: 50.0,
            width_height_ratio: 0.5,
            detection: PeakDetection::default(),
        }
    }
}

impl PeakOptions {
    pub fn with_spline_size(mut self, spline_size: usize) -> Self {
        self.spline_size = spline_size;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_width_height_ratio(mut self, ratio: f64) -> Self {
        self.width_height_ratio = ratio;
        self
    }

    pub fn with_detection(mut self, detection: PeakDetection) -> Self {
        self.detection = detection;
        self
    }
}

/// Find the peaks of a noisy curve.
///
/// The curve is smoothed with a [`SmoothingSpline`] and sampled on
/// `spline_size` evenly spaced points. Peaks are detected on the samples;
/// each peak's width is then measured on the spline itself between the
/// nearest crossings of `width_height_ratio × y` on either side, falling back
/// to the ends of the domain.
///
/// # Example
///
/// ```
/// use streak_rs::analysis::{find_peaks, PeakOptions};
///
/// let x: Vec<f64> = (0..=10).map(|i| -2.0 + 0.4 * i as f64).collect();
/// let y: Vec<f64> = x.iter().map(|v| (-v * v).exp()).collect();
/// let peaks = find_peaks(&x, &y, &PeakOptions::default()).unwrap();
/// assert_eq!(peaks.len(), 1);
/// assert!(peaks[0].x.abs() < 0.05);
/// ```
pub fn find_peaks(x: &[f64], y: &[f64], options: &PeakOptions) -> Result<Vec<Peak>> {
    validate_xy(x, y)?;
    if options.spline_size < 2 {
        return Err(StreakError::Validation(format!(
            "spline_size must be at least 2: {}",
            options.spline_size
        )));
    }

    let spline = SmoothingSpline::fit(x, y)?;
    let (xs, ys) = spline.resample(options.spline_size);
    let detection = PeakDetection {
        width: Some(options.width),
        ..options.detection.clone()
    };
    let detected = detect_peaks(&ys, &detection)?;
    log::debug!("{} peaks detected on {} samples", detected.len(), xs.len());

    let (lo, hi) = spline.domain();
    let peaks = detected
        .into_iter()
        .map(|d| {
            let (xp, yp) = (xs[d.index], ys[d.index]);
            let level = yp * options.width_height_ratio;
            let roots = spline.roots(level, &xs);
            let idx = roots.partition_point(|&r| r < xp);
            let x0 = if idx > 0 { roots[idx - 1] } else { lo };
            let x1 = roots.get(idx).copied().unwrap_or(hi);
            Peak { x: xp, y: yp, x0, x1, y0: level }
        })
        .collect();
    Ok(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::linspace;

    #[test]
    fn test_gaussian_peak() {
        let x = linspace(-2.0, 2.0, 11);
        let y: Vec<f64> = x.iter().map(|v| (-v * v).exp()).collect();
        let peaks = find_peaks(&x, &y, &PeakOptions::default()).unwrap();

        assert_eq!(peaks.len(), 1);
        let peak = peaks[0];
        assert!(peak.x.abs() < 0.05);
        assert!((peak.y - 1.0).abs() < 0.05);
        assert_eq!(peak.y0, peak.y * 0.5);
        // FWHM of exp(-x²) is 2·sqrt(ln 2) ≈ 1.665
        assert!(peak.x0 < 0.0 && peak.x1 > 0.0);
        assert!((peak.width() - 1.665).abs() < 0.2);
    }

    #[test]
    fn test_two_peaks_in_order() {
        let x = linspace(0.0, 10.0, 201);
        let y: Vec<f64> = x
            .iter()
            .map(|v| (-(v - 3.0).powi(2)).exp() + 0.5 * (-(v - 7.0).powi(2)).exp())
            .collect();
        let peaks = find_peaks(&x, &y, &PeakOptions::default()).unwrap();
        assert_eq!(peaks.len(), 2);
        assert!((peaks[0].x - 3.0).abs() < 0.05);
        assert!((peaks[1].x - 7.0).abs() < 0.05);
        assert!(peaks[0].y > peaks[1].y);
    }

    #[test]
    fn test_width_falls_back_to_domain() {
        // Nothing on the left drops below half of the peak
        let x = linspace(0.0, 4.0, 41);
        let y: Vec<f64> = x.iter().map(|v| 2.0 + (-(v - 1.0).powi(2)).exp()).collect();
        let options = PeakOptions::default().with_width(1.0);
        let peaks = find_peaks(&x, &y, &options).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].x0, 0.0);
        assert_eq!(peaks[0].x1, 4.0);
    }

    #[test]
    fn test_height_filter_applies() {
        let x = linspace(-2.0, 2.0, 11);
        let y: Vec<f64> = x.iter().map(|v| (-v * v).exp()).collect();
        let options =
            PeakOptions::default().with_detection(PeakDetection::default().with_height(2.0));
        assert!(find_peaks(&x, &y, &options).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_input() {
        assert!(find_peaks(&[1.0, 2.0], &[1.0], &PeakOptions::default()).is_err());
        assert!(find_peaks(&[], &[], &PeakOptions::default()).is_err());
        let options = PeakOptions::default().with_spline_size(1);
        assert!(find_peaks(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], &options).is_err());
    }
}
