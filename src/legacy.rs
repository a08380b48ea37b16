// src/legacy.rs
//! Deprecated entry points kept for older callers.
//!
//! Each function logs a [`DeprecationNotice`] at `warn` level on every call
//! and otherwise behaves as before.

#![allow(deprecated)]

use crate::analysis::validate_xy;
use crate::dataset::StreakDataset;
use crate::error::Result;
use crate::utils::{argmax, min_max};
use std::fmt;
use std::path::Path;

/// Structured record of a call to a deprecated item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecationNotice {
    pub name: &'static str,
    pub since: &'static str,
    pub replacement: &'static str,
}

impl DeprecationNotice {
    pub fn emit(&self) {
        log::warn!(target: "streak_rs::deprecated", "{}", self);
    }
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` is deprecated since {}; use `{}` instead",
            self.name, self.since, self.replacement
        )
    }
}

/// Read a streak image file.
#[deprecated(since = "0.4.0", note = "use `read_file` instead")]
pub fn read_img(path: impl AsRef<Path>) -> Result<StreakDataset> {
    DeprecationNotice { name: "read_img", since: "0.4.0", replacement: "read_file" }.emit();
    crate::reader::read_file(path)
}

/// `(x, y)` at the largest raw `y`, without smoothing.
#[deprecated(since = "0.5.0", note = "use `analysis::find_peaks` instead")]
pub fn find_peak(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    DeprecationNotice { name: "find_peak", since: "0.5.0", replacement: "analysis::find_peaks" }
        .emit();
    validate_xy(x, y)?;
    let i = argmax(y).unwrap_or(0);
    Ok((x[i], y[i]))
}

/// Nearest x on each side of the maximum where `y` falls below half of it.
///
/// Falls back to the smallest or largest x when one side never drops that far.
#[deprecated(since = "0.5.0", note = "use `analysis::find_peaks` instead")]
pub fn find_half_range(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    DeprecationNotice {
        name: "find_half_range",
        since: "0.5.0",
        replacement: "analysis::find_peaks",
    }
    .emit();
    validate_xy(x, y)?;

    let peak = argmax(y).unwrap_or(0);
    let (x_peak, half) = (x[peak], y[peak] / 2.0);
    let (x_min, x_max) = min_max(x).unwrap_or((x_peak, x_peak));

    let below = || x.iter().zip(y).filter(|(_, &v)| v < half).map(|(&xi, _)| xi);
    let left = below().filter(|&xi| xi < x_peak).fold(None, |acc: Option<f64>, xi| {
        Some(acc.map_or(xi, |a| a.max(xi)))
    });
    let right = below().filter(|&xi| xi > x_peak).fold(None, |acc: Option<f64>, xi| {
        Some(acc.map_or(xi, |a| a.min(xi)))
    });
    Ok((left.unwrap_or(x_min), right.unwrap_or(x_max)))
}

/// Full width at half maximum of the raw curve.
#[deprecated(since = "0.5.0", note = "use `analysis::find_peaks` instead")]
pub fn find_fwhm(x: &[f64], y: &[f64]) -> Result<f64> {
    DeprecationNotice { name: "find_fwhm", since: "0.5.0", replacement: "analysis::find_peaks" }
        .emit();
    let (left, right) = find_half_range(x, y)?;
    Ok((right - left).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreakError;

    #[test]
    fn test_find_peak() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 4.0, 4.0, 2.0];
        assert_eq!(find_peak(&x, &y).unwrap(), (1.0, 4.0));
    }

    #[test]
    fn test_find_half_range() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [0.0, 1.0, 3.0, 4.0, 3.0, 1.5, 0.5];
        assert_eq!(find_half_range(&x, &y).unwrap(), (1.0, 5.0));
        assert_eq!(find_fwhm(&x, &y).unwrap(), 4.0);
    }

    #[test]
    fn test_find_half_range_fallbacks() {
        let x = [0.0, 1.0, 2.0];
        let y = [3.0, 4.0, 3.0];
        assert_eq!(find_half_range(&x, &y).unwrap(), (0.0, 2.0));
    }

    #[test]
    fn test_mismatched_input() {
        assert!(matches!(find_peak(&[1.0], &[]), Err(StreakError::Validation(_))));
        assert!(find_fwhm(&[], &[]).is_err());
    }

    #[test]
    fn test_notice_message() {
        let notice = DeprecationNotice { name: "read_img", since: "0.4.0", replacement: "read_file" };
        assert_eq!(
            notice.to_string(),
            "`read_img` is deprecated since 0.4.0; use `read_file` instead"
        );
    }
}
