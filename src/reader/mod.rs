// src/reader/mod.rs
mod sync_reader;

pub use sync_reader::{read_bytes, read_file, read_from, StreakReader};
