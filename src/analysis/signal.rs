// src/analysis/signal.rs
//! Local-maximum peak detection on an evenly sampled curve.
//!
//! Candidates are strict local maxima (flat tops resolve to their middle
//! sample) and are then filtered in a fixed order: height, threshold,
//! distance, prominence, width.

use crate::error::{StreakError, Result};

/// Filters applied to local maxima; `None` disables a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDetection {
    /// Minimum peak value
    pub height: Option<f64>,
    /// Minimum vertical drop to both direct neighbours
    pub threshold: Option<f64>,
    /// Minimum index distance between peaks; taller peaks win
    pub distance: Option<f64>,
    pub prominence: Option<f64>,
    /// Minimum width in samples, measured at `rel_height` of the prominence
    pub width: Option<f64>,
    pub max_width: Option<f64>,
    pub rel_height: f64,
}

impl Default for PeakDetection {
    fn default() -> Self {
        PeakDetection {
            height: None,
            threshold: None,
            distance: None,
            prominence: None,
            width: None,
            max_width: None,
            rel_height: 0.5,
        }
    }
}

impl PeakDetection {
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = Some(prominence);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_rel_height(mut self, rel_height: f64) -> Self {
        self.rel_height = rel_height;
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(d) = self.distance {
            if !(d >= 1.0) {
                return Err(StreakError::Validation(format!(
                    "peak distance must be at least 1: {}",
                    d
                )));
            }
        }
        if !(self.rel_height >= 0.0) {
            return Err(StreakError::Validation(format!(
                "relative height must be non-negative: {}",
                self.rel_height
            )));
        }
        Ok(())
    }

    fn needs_prominence(&self) -> bool {
        self.prominence.is_some() || self.needs_width()
    }

    fn needs_width(&self) -> bool {
        self.width.is_some() || self.max_width.is_some()
    }
}

/// A peak that passed every filter.
///
/// `prominence` and `width` are filled in only when a filter needed them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedPeak {
    pub index: usize,
    pub prominence: Option<f64>,
    /// Width in samples
    pub width: Option<f64>,
}

/// Find peaks in `y`, returned in increasing index order.
pub fn detect_peaks(y: &[f64], options: &PeakDetection) -> Result<Vec<DetectedPeak>> {
    options.validate()?;

    let mut peaks = local_maxima(y);
    if let Some(height) = options.height {
        peaks.retain(|&p| y[p] >= height);
    }
    if let Some(threshold) = options.threshold {
        peaks.retain(|&p| (y[p] - y[p - 1]).min(y[p] - y[p + 1]) >= threshold);
    }
    if let Some(distance) = options.distance {
        peaks = select_by_distance(&peaks, y, distance.ceil() as usize);
    }

    let mut detected: Vec<DetectedPeak> = peaks
        .iter()
        .map(|&index| DetectedPeak { index, prominence: None, width: None })
        .collect();
    if !options.needs_prominence() {
        return Ok(detected);
    }

    let mut bases = Vec::with_capacity(detected.len());
    for peak in &mut detected {
        let (prom, left, right) = prominence(y, peak.index);
        peak.prominence = Some(prom);
        bases.push((left, right));
    }

    let mut kept = Vec::with_capacity(detected.len());
    for (mut peak, (left, right)) in detected.into_iter().zip(bases) {
        let prom = peak.prominence.unwrap_or(0.0);
        if options.prominence.is_some_and(|min| prom < min) {
            continue;
        }
        if options.needs_width() {
            let width = width_at(y, peak.index, prom, left, right, options.rel_height);
            if options.width.is_some_and(|min| width < min)
                || options.max_width.is_some_and(|max| width > max)
            {
                continue;
            }
            peak.width = Some(width);
        }
        kept.push(peak);
    }
    Ok(kept)
}

fn local_maxima(y: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if y.len() < 3 {
        return peaks;
    }
    let last = y.len() - 1;
    let mut i = 1;
    while i < last {
        if y[i - 1] < y[i] {
            let mut ahead = i + 1;
            while ahead < last && y[ahead] == y[i] {
                ahead += 1;
            }
            if y[ahead] < y[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn select_by_distance(peaks: &[usize], y: &[f64], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| y[peaks[a]].total_cmp(&y[peaks[b]]));

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }
    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Prominence of the peak at `peak` with its left and right base indices.
fn prominence(y: &[f64], peak: usize) -> (f64, usize, usize) {
    let top = y[peak];

    let (mut left_min, mut left_base) = (top, peak);
    let mut i = peak;
    loop {
        if y[i] > top {
            break;
        }
        if y[i] < left_min {
            left_min = y[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let (mut right_min, mut right_base) = (top, peak);
    for (i, &v) in y.iter().enumerate().skip(peak) {
        if v > top {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = i;
        }
    }

    (top - left_min.max(right_min), left_base, right_base)
}

/// Width in samples at `rel_height` of the prominence below the top,
/// interpolating linearly between samples.
fn width_at(
    y: &[f64],
    peak: usize,
    prominence: f64,
    left: usize,
    right: usize,
    rel_height: f64,
) -> f64 {
    let height = y[peak] - prominence * rel_height;

    let mut i = peak;
    while left < i && height < y[i] {
        i -= 1;
    }
    let mut left_ip = i as f64;
    if y[i] < height {
        left_ip += (height - y[i]) / (y[i + 1] - y[i]);
    }

    let mut i = peak;
    while i < right && height < y[i] {
        i += 1;
    }
    let mut right_ip = i as f64;
    if y[i] < height {
        right_ip -= (height - y[i]) / (y[i - 1] - y[i]);
    }

    right_ip - left_ip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(peaks: &[DetectedPeak]) -> Vec<usize> {
        peaks.iter().map(|p| p.index).collect()
    }

    #[test]
    fn test_local_maxima_with_plateau() {
        let y = [0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 0.0, 1.0, 1.0];
        // index 7..8 runs into the border and is not a peak
        assert_eq!(local_maxima(&y), vec![1, 4]);
    }

    #[test]
    fn test_height_and_threshold() {
        let y = [0.0, 3.0, 0.0, 1.0, 0.5, 5.0, 4.5];
        let all = detect_peaks(&y, &PeakDetection::default()).unwrap();
        assert_eq!(indices(&all), vec![1, 3, 5]);

        let tall = detect_peaks(&y, &PeakDetection::default().with_height(2.0)).unwrap();
        assert_eq!(indices(&tall), vec![1, 5]);

        let sharp = detect_peaks(&y, &PeakDetection::default().with_threshold(1.0)).unwrap();
        assert_eq!(indices(&sharp), vec![1]);
    }

    #[test]
    fn test_distance_prefers_taller() {
        let y = [0.0, 2.0, 0.0, 3.0, 0.0, 1.0, 0.0, 0.0, 0.0, 4.0, 0.0];
        let peaks = detect_peaks(&y, &PeakDetection::default().with_distance(3.0)).unwrap();
        assert_eq!(indices(&peaks), vec![3, 9]);
    }

    #[test]
    fn test_prominence() {
        let y = [0.0, 5.0, 3.0, 4.0, 1.0];
        let peaks = detect_peaks(&y, &PeakDetection::default().with_prominence(0.0)).unwrap();
        assert_eq!(indices(&peaks), vec![1, 3]);
        assert_eq!(peaks[0].prominence, Some(4.0));
        assert_eq!(peaks[1].prominence, Some(1.0));

        let prominent = detect_peaks(&y, &PeakDetection::default().with_prominence(2.0)).unwrap();
        assert_eq!(indices(&prominent), vec![1]);
    }

    #[test]
    fn test_width_interpolates() {
        let y = [0.0, 1.0, 2.0, 1.0, 0.0];
        let peaks = detect_peaks(&y, &PeakDetection::default().with_width(0.0)).unwrap();
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].width.unwrap() - 2.0).abs() < 1e-12);

        let narrow = detect_peaks(&y, &PeakDetection::default().with_max_width(1.5)).unwrap();
        assert!(narrow.is_empty());
    }

    #[test]
    fn test_invalid_options() {
        let y = [0.0, 1.0, 0.0];
        assert!(detect_peaks(&y, &PeakDetection::default().with_distance(0.5)).is_err());
        assert!(detect_peaks(&y, &PeakDetection::default().with_rel_height(-1.0)).is_err());
    }

    #[test]
    fn test_short_input() {
        assert!(detect_peaks(&[], &PeakDetection::default()).unwrap().is_empty());
        assert!(detect_peaks(&[1.0, 2.0], &PeakDetection::default()).unwrap().is_empty());
    }
}
