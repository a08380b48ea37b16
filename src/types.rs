// src/types.rs
use crate::layout::{U8167Layout, DEFAULT_HEADER, DEFAULT_METADATA};
use std::fmt;

/// Opaque 64-byte instrument header.
///
/// The bytes are never interpreted; they are carried from decode to encode
/// unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHeader([u8; U8167Layout::HEADER_SIZE]);

impl RawHeader {
    pub const SIZE: usize = U8167Layout::HEADER_SIZE;

    pub const fn new(bytes: [u8; U8167Layout::HEADER_SIZE]) -> Self {
        RawHeader(bytes)
    }

    /// Build a header from a possibly short slice, zero-filling missing bytes
    /// and ignoring anything past 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut raw = [0u8; U8167Layout::HEADER_SIZE];
        let n = bytes.len().min(raw.len());
        raw[..n].copy_from_slice(&bytes[..n]);
        RawHeader(raw)
    }

    pub fn as_bytes(&self) -> &[u8; U8167Layout::HEADER_SIZE] {
        &self.0
    }
}

impl Default for RawHeader {
    fn default() -> Self {
        RawHeader(DEFAULT_HEADER)
    }
}

impl fmt::Debug for RawHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHeader(")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl From<[u8; U8167Layout::HEADER_SIZE]> for RawHeader {
    fn from(bytes: [u8; U8167Layout::HEADER_SIZE]) -> Self {
        RawHeader(bytes)
    }
}

/// Free-text acquisition metadata.
///
/// Each line keeps its trailing newline so that encoding is a plain
/// concatenation of the lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataBlock {
    lines: Vec<String>,
}

impl MetadataBlock {
    pub fn new(lines: Vec<String>) -> Self {
        MetadataBlock { lines }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MetadataBlock {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total encoded length in bytes
    pub fn byte_len(&self) -> usize {
        self.lines.iter().map(String::len).sum()
    }

    /// Look up a `Key=Value` entry in any line, e.g. `MCPGain` or `Wavelength`.
    ///
    /// Entries are separated by commas; the value is returned trimmed.
    pub fn find_value(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .flat_map(|line| line.trim_end().split(','))
            .filter_map(|entry| {
                let (k, v) = entry.split_once('=')?;
                let k = k.rsplit(':').next().unwrap_or(k).trim();
                (k == key).then(|| v.trim())
            })
            .next()
    }
}

impl Default for MetadataBlock {
    fn default() -> Self {
        MetadataBlock::from_lines(DEFAULT_METADATA)
    }
}

/// One reading of the streak camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Time in nanoseconds
    pub time: f32,
    /// Wavelength in nanometers
    pub wavelength: f32,
    /// Intensity in arbitrary units
    pub intensity: u16,
}

impl Sample {
    pub fn new(time: f32, wavelength: f32, intensity: u16) -> Self {
        Sample { time, wavelength, intensity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_from_short_slice() {
        let header = RawHeader::from_slice(&[1, 2, 3]);
        assert_eq!(&header.as_bytes()[..4], &[1, 2, 3, 0]);
        assert!(header.as_bytes()[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_default_header_magic() {
        let header = RawHeader::default();
        assert_eq!(&header.as_bytes()[..2], b"IM");
    }

    #[test]
    fn test_default_metadata_lines() {
        let metadata = MetadataBlock::default();
        assert_eq!(metadata.len(), U8167Layout::METADATA_LINES);
        assert!(metadata.lines().iter().all(|l| l.ends_with('\n')));
        assert!(metadata.lines()[0].starts_with("HiPic"));
    }

    #[test]
    fn test_metadata_find_value() {
        let metadata = MetadataBlock::default();
        assert_eq!(metadata.find_value("MCPGain"), Some("10"));
        assert_eq!(metadata.find_value("Time"), Some("300.0[sec]"));
        assert_eq!(metadata.find_value("Mode"), Some("Operate"));
        assert_eq!(metadata.find_value("Wavelength"), Some("490.000[nm]"));
        assert_eq!(metadata.find_value("Missing"), None);
    }
}
