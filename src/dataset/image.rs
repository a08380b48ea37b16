// src/dataset/image.rs
use crate::error::{StreakError, Result};
use crate::types::Sample;
use std::cmp::Ordering;

/// Time x wavelength intensity grid.
///
/// Rows are time steps, columns are wavelengths, both ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct StreakImage {
    times: Vec<f32>,
    wavelengths: Vec<f32>,
    data: Vec<f32>,
}

fn by_time_then_wavelength(a: &Sample, b: &Sample) -> Ordering {
    a.time
        .total_cmp(&b.time)
        .then_with(|| a.wavelength.total_cmp(&b.wavelength))
}

impl StreakImage {
    pub(crate) fn from_samples(samples: &[Sample]) -> Result<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_by(by_time_then_wavelength);

        let mut times: Vec<f32> = Vec::new();
        let mut rows: Vec<&[Sample]> = Vec::new();
        let mut start = 0;
        for i in 1..=sorted.len() {
            if i == sorted.len() || sorted[i].time != sorted[start].time {
                times.push(sorted[start].time);
                rows.push(&sorted[start..i]);
                start = i;
            }
        }

        let wavelengths: Vec<f32> = rows
            .first()
            .map(|row| row.iter().map(|s| s.wavelength).collect())
            .unwrap_or_default();

        let shape_error = || StreakError::Shape {
            samples: samples.len(),
            times: times.len(),
            wavelengths: wavelengths.len(),
        };

        if times.len() * wavelengths.len() != samples.len() {
            return Err(shape_error());
        }
        for row in &rows {
            let matches = row.len() == wavelengths.len()
                && row.iter().zip(&wavelengths).all(|(s, &w)| s.wavelength == w);
            if !matches {
                return Err(shape_error());
            }
        }
        if wavelengths.windows(2).any(|w| w[0] == w[1]) {
            return Err(shape_error());
        }

        let data = sorted.iter().map(|s| f32::from(s.intensity)).collect();
        Ok(StreakImage { times, wavelengths, data })
    }

    /// (rows, columns) = (time steps, wavelengths)
    pub fn shape(&self) -> (usize, usize) {
        (self.times.len(), self.wavelengths.len())
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn wavelengths(&self) -> &[f32] {
        &self.wavelengths
    }

    /// Row-major intensity values
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, time_index: usize, wavelength_index: usize) -> Option<f32> {
        if wavelength_index >= self.wavelengths.len() {
            return None;
        }
        self.data
            .get(time_index * self.wavelengths.len() + wavelength_index)
            .copied()
    }

    pub fn row(&self, time_index: usize) -> Option<&[f32]> {
        let width = self.wavelengths.len();
        let start = time_index.checked_mul(width)?;
        self.data.get(start..start + width)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.times.len()).filter_map(move |t| self.row(t))
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.rows().map(<[f32]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: &[(f32, f32, u16)]) -> Vec<Sample> {
        values.iter().map(|&(t, w, i)| Sample::new(t, w, i)).collect()
    }

    #[test]
    fn test_sorts_before_reshaping() {
        let samples = grid(&[
            (5.0, 450.0, 4),
            (0.0, 450.0, 2),
            (5.0, 400.0, 3),
            (0.0, 400.0, 1),
        ]);
        let image = StreakImage::from_samples(&samples).unwrap();
        assert_eq!(image.shape(), (2, 2));
        assert_eq!(image.times(), &[0.0, 5.0]);
        assert_eq!(image.wavelengths(), &[400.0, 450.0]);
        assert_eq!(image.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(image.get(1, 0), Some(3.0));
        assert_eq!(image.get(0, 2), None);
        assert_eq!(image.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(image.row(2), None);
    }

    #[test]
    fn test_incomplete_grid_is_shape_error() {
        let samples = grid(&[(0.0, 400.0, 1), (0.0, 450.0, 2), (5.0, 400.0, 3)]);
        assert!(matches!(
            StreakImage::from_samples(&samples),
            Err(StreakError::Shape { samples: 3, .. })
        ));
    }

    #[test]
    fn test_mismatched_rows_are_shape_error() {
        let samples = grid(&[
            (0.0, 400.0, 1),
            (0.0, 450.0, 2),
            (5.0, 400.0, 3),
            (5.0, 500.0, 4),
        ]);
        assert!(StreakImage::from_samples(&samples).is_err());
    }

    #[test]
    fn test_duplicate_samples_are_shape_error() {
        let samples = grid(&[(0.0, 400.0, 1), (0.0, 400.0, 2)]);
        assert!(StreakImage::from_samples(&samples).is_err());
    }

    #[test]
    fn test_empty_image() {
        let image = StreakImage::from_samples(&[]).unwrap();
        assert_eq!(image.shape(), (0, 0));
        assert_eq!(image.rows().count(), 0);
    }
}
