// src/analysis/scdc.rs
//! Start coordinates of a decay curve.
//!
//! A decay curve is flat background noise followed by a sharp rise and a
//! slower decay. The start is the last point before the rise that still sits
//! below the background level.

use super::validate_xy;
use crate::error::{StreakError, Result};
use crate::utils::{argmax, mean, quantile, sample_std};

/// Start coordinates of a decay curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scdc {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScdcOptions {
    /// Number of trailing samples in the rolling background statistics
    pub window: usize,
    /// Standard deviations above the rolling mean that count as signal
    pub k: f64,
}

impl Default for ScdcOptions {
    fn default() -> Self {
        ScdcOptions { window: 10, k: 2.0 }
    }
}

impl ScdcOptions {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }
}

/// `mean + k·std` over the trailing `window` samples; `NaN` where the window
/// is incomplete.
fn noise_ceiling(y: &[f64], window: usize, k: f64) -> Vec<f64> {
    (0..y.len())
        .map(|i| {
            if i + 1 < window {
                return f64::NAN;
            }
            let w = &y[i + 1 - window..=i];
            mean(w) + k * sample_std(w)
        })
        .collect()
}

/// Find the start coordinates of a decay curve.
///
/// The background ends where a sample first exceeds the noise ceiling of the
/// samples before it. Its baseline is the mean of the background between its
/// 5th and 95th percentiles, and the result is the last sample before the
/// curve maximum that lies below the baseline.
pub fn find_scdc(x: &[f64], y: &[f64], options: &ScdcOptions) -> Result<Scdc> {
    validate_xy(x, y)?;
    if options.window < 2 {
        return Err(StreakError::Validation(format!(
            "rolling window must span at least 2 samples: {}",
            options.window
        )));
    }

    let ceiling = noise_ceiling(y, options.window, options.k);
    let rise = (0..y.len().saturating_sub(1)).find(|&r| y[r + 1] > ceiling[r]);

    let background: Vec<f64> = match rise {
        Some(r) => x
            .iter()
            .zip(y)
            .filter(|(xi, _)| **xi <= x[r])
            .map(|(_, yi)| *yi)
            .collect(),
        None => y.to_vec(),
    };
    let lo = quantile(&background, 0.05);
    let hi = quantile(&background, 0.95);
    let trimmed: Vec<f64> = background.into_iter().filter(|v| *v >= lo && *v <= hi).collect();
    let baseline = mean(&trimmed);
    log::debug!("decay background ends at {:?}, baseline {}", rise, baseline);

    let peak = argmax(y).ok_or(StreakError::NoDecayOnset)?;
    let index = (0..peak)
        .rev()
        .find(|&i| y[i] < baseline)
        .ok_or(StreakError::NoDecayOnset)?;
    Ok(Scdc { x: x[index], y: y[index] })
}
