// src/dataset/aggregate.rs
//! Aggregation of the sample table along one axis.
//!
//! Each aggregation filters samples by an inclusive range on one axis,
//! groups the rest by the other axis and sums their intensities.

use super::StreakDataset;
use crate::analysis::{find_scdc, ScdcOptions};
use crate::error::Result;
use crate::types::Sample;

/// Offset subtracted from a decay curve axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Offset {
    /// Use the start coordinates of the decay curve
    #[default]
    Auto,
    Value(f64),
}

/// Time-integrated emission spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Wavelengths in ascending order
    pub wavelength: Vec<f32>,
    /// Summed intensity per wavelength
    pub intensity: Vec<u64>,
    /// Inclusive time range that was integrated
    pub time_range: (f32, f32),
}

/// Wavelength-integrated decay curve
#[derive(Debug, Clone, PartialEq)]
pub struct DecayCurve {
    /// Times in ascending order, shifted by `time_offset`
    pub time: Vec<f64>,
    /// Summed intensity per time, shifted by `intensity_offset`
    pub intensity: Vec<f64>,
    /// Inclusive wavelength range that was integrated
    pub wavelength_range: (f32, f32),
    pub time_offset: f64,
    pub intensity_offset: f64,
}

fn full_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<(f32, f32)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0))
}

/// Group samples by `key`, summing intensities; groups come out sorted by key.
fn group_sum<'a>(
    samples: impl Iterator<Item = &'a Sample>,
    key: impl Fn(&Sample) -> f32,
) -> (Vec<f32>, Vec<u64>) {
    let mut pairs: Vec<(f32, u64)> = samples.map(|s| (key(s), u64::from(s.intensity))).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut keys: Vec<f32> = Vec::new();
    let mut sums: Vec<u64> = Vec::new();
    for (k, v) in pairs {
        if keys.last() == Some(&k) {
            if let Some(sum) = sums.last_mut() {
                *sum += v;
            }
        } else {
            keys.push(k);
            sums.push(v);
        }
    }
    (keys, sums)
}

impl StreakDataset {
    /// Sum intensities over time, per wavelength.
    ///
    /// `time_range` is inclusive; `None` covers the whole measurement.
    pub fn aggregate_along_time(&self, time_range: Option<(f32, f32)>) -> Spectrum {
        let time_range =
            time_range.unwrap_or_else(|| full_range(self.samples().iter().map(|s| s.time)));
        let (lo, hi) = time_range;

        let (wavelength, intensity) = group_sum(
            self.samples().iter().filter(|s| s.time >= lo && s.time <= hi),
            |s| s.wavelength,
        );
        Spectrum { wavelength, intensity, time_range }
    }

    /// Sum intensities over wavelength, per time, then shift both axes.
    ///
    /// With [`Offset::Auto`] the offset is the matching coordinate of the
    /// curve's decay start (see [`find_scdc`]).
    pub fn aggregate_along_wavelength(
        &self,
        wavelength_range: Option<(f32, f32)>,
        time_offset: Offset,
        intensity_offset: Offset,
    ) -> Result<DecayCurve> {
        let wavelength_range = wavelength_range
            .unwrap_or_else(|| full_range(self.samples().iter().map(|s| s.wavelength)));
        let (lo, hi) = wavelength_range;

        let (times, sums) = group_sum(
            self.samples().iter().filter(|s| s.wavelength >= lo && s.wavelength <= hi),
            |s| s.time,
        );
        let mut time: Vec<f64> = times.into_iter().map(f64::from).collect();
        let mut intensity: Vec<f64> = sums.into_iter().map(|v| v as f64).collect();

        let (time_offset, intensity_offset) = match (time_offset, intensity_offset) {
            (Offset::Value(t), Offset::Value(i)) => (t, i),
            (t, i) => {
                let scdc = find_scdc(&time, &intensity, &ScdcOptions::default())?;
                log::debug!("decay start at ({}, {})", scdc.x, scdc.y);
                let pick = |offset: Offset, auto: f64| match offset {
                    Offset::Auto => auto,
                    Offset::Value(v) => v,
                };
                (pick(t, scdc.x), pick(i, scdc.y))
            }
        };

        time.iter_mut().for_each(|t| *t -= time_offset);
        intensity.iter_mut().for_each(|v| *v -= intensity_offset);

        Ok(DecayCurve {
            time,
            intensity,
            wavelength_range,
            time_offset,
            intensity_offset,
        })
    }
}
