// src/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreakError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input type: {0}")]
    InvalidInputType(String),

    #[error("Invalid UTF-8 in metadata")]
    InvalidUtf8,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Shape error: {samples} samples cannot form a {times}x{wavelengths} grid")]
    Shape { samples: usize, times: usize, wavelengths: usize },

    #[error("Capacity exceeded in {block} block: {required} bytes required, capacity is {capacity}")]
    CapacityExceeded { block: &'static str, required: usize, capacity: usize },

    #[error("Fit failure: {0}")]
    FitFailure(String),

    #[error("No decay onset found before the curve maximum")]
    NoDecayOnset,
}

pub type Result<T> = std::result::Result<T, StreakError>;
