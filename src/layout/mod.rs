// src/layout/mod.rs
//! Fixed binary layout of u8167 streak-camera images.
//!
//! A raw image is a sequence of fixed-size blocks:
//!
//! | Block      | Size                  | Content                             |
//! |------------|-----------------------|-------------------------------------|
//! | Header     | 64 bytes              | opaque, copied verbatim             |
//! | Metadata   | 4 lines               | UTF-8 text, newline-terminated      |
//! | Intensity  | 600 sectors           | row-major little-endian `u16`       |
//! | Wavelength | 4 sectors             | little-endian `f32`, zero padded    |
//! | Time       | 4 sectors             | little-endian `f32`, zero padded    |
//!
//! A sector is 1024 bytes.

mod defaults;
mod u8167;

pub use defaults::{DEFAULT_HEADER, DEFAULT_METADATA};
pub use u8167::U8167Layout;
