// src/utils/mod.rs
mod distinct;
mod stats;

pub(crate) use distinct::*;
pub(crate) use stats::*;
