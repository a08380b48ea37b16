// src/analysis/smooth.rs
use crate::error::{StreakError, Result};

/// Smooth a sequence with a centered moving average.
///
/// `window` in `(0, 1]` is a fraction of the sequence length; larger values
/// are an absolute number of samples. Near the ends the average is taken over
/// the samples that exist, so the output always has the input's length.
///
/// # Example
///
/// ```
/// use streak_rs::analysis::smooth;
///
/// let x: Vec<f64> = (0..10).map(f64::from).collect();
/// let expected = vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.5];
/// assert_eq!(smooth(&x, 3.0).unwrap(), expected);
/// assert_eq!(smooth(&x, 0.3).unwrap(), expected);
/// ```
pub fn smooth(y: &[f64], window: f64) -> Result<Vec<f64>> {
    if !window.is_finite() || window < 0.0 {
        return Err(StreakError::Validation(format!(
            "`window` must be a positive number: {}",
            window
        )));
    }
    if y.is_empty() {
        return Ok(Vec::new());
    }

    let n = y.len();
    let w = if window > 0.0 && window <= 1.0 {
        (n as f64 * window) as usize
    } else {
        window as usize
    };
    if w == 0 {
        return Err(StreakError::Validation(format!(
            "window {} selects no samples out of {}",
            window, n
        )));
    }

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for &v in y {
        prefix.push(prefix[prefix.len() - 1] + v);
    }

    let offset = (w - 1) / 2;
    let smoothed = (0..n)
        .map(|i| {
            let end = (i + 1 + offset).min(n);
            let start = (i + 1 + offset).saturating_sub(w);
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect();
    Ok(smoothed)
}

/// [`smooth`] with a three-sample window
pub fn smooth_default(y: &[f64]) -> Result<Vec<f64>> {
    smooth(y, 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_window_is_left_heavy() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        // window 4 at index 2 covers indices 0..=3
        let smoothed = smooth(&x, 4.0).unwrap();
        assert_eq!(smoothed, vec![0.5, 1.0, 1.5, 2.5, 3.0]);
    }

    #[test]
    fn test_window_one_is_whole_sequence() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let smoothed = smooth(&x, 1.0).unwrap();
        assert_eq!(smoothed, vec![2.0, 2.5, 2.5, 3.0]);
    }

    #[test]
    fn test_negative_window_rejected() {
        assert!(matches!(smooth(&[1.0, 2.0], -1.0), Err(StreakError::Validation(_))));
        assert!(smooth(&[1.0, 2.0], f64::NAN).is_err());
    }

    #[test]
    fn test_zero_effective_window_rejected() {
        assert!(smooth(&[1.0, 2.0, 3.0], 0.1).is_err());
        assert!(smooth(&[1.0, 2.0, 3.0], 0.0).is_err());
    }

    #[test]
    fn test_default_window() {
        assert_eq!(smooth_default(&[3.0, 3.0, 3.0]).unwrap(), vec![3.0, 3.0, 3.0]);
        assert!(smooth_default(&[]).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_length_preserved(
            y in proptest::collection::vec(-1e6f64..1e6, 1..200),
            window in 2.0f64..50.0,
        ) {
            let smoothed = smooth(&y, window).unwrap();
            prop_assert_eq!(smoothed.len(), y.len());
        }

        #[test]
        fn prop_bounded_by_input(y in proptest::collection::vec(-1e3f64..1e3, 1..100)) {
            let lo = y.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            for v in smooth(&y, 5.0).unwrap() {
                prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
            }
        }
    }
}
