// src/utils/distinct.rs
use std::collections::HashSet;

/// Bit pattern used as a hash key; folds -0.0 into 0.0 so that both compare equal.
fn key(value: f32) -> u32 {
    if value == 0.0 {
        0.0f32.to_bits()
    } else {
        value.to_bits()
    }
}

/// Distinct values in order of first appearance
pub fn distinct_in_order(values: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|&v| seen.insert(key(v))).collect()
}

/// Number of distinct values
pub fn distinct_count(values: impl IntoIterator<Item = f32>) -> usize {
    values.into_iter().map(key).collect::<HashSet<_>>().len()
}
