//! Whole-payload compression
//!
//! Compression is a single-shot byte transform applied to everything after
//! the header. The stream records the uncompressed length ahead of the
//! compressed bytes:
//!
//! ```text
//! [header 36 bytes][payload_len u32][zlib stream]
//! ```
//!
//! The zlib stream ends itself, so decompression also reports how much of
//! the input it used. Anything after that is trailing data.

use std::io::{Read, Write};

use flate2::Compression as Level;
use flate2::bufread::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{NaiError, Result};

/// Default zlib level
pub const DEFAULT_LEVEL: u32 = 6;

/// A black-box (de)compression transform.
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Inflate the stream at the start of `data`, which must expand to
    /// exactly `expected_len` bytes. Returns the inflated bytes and the
    /// number of input bytes the stream occupied.
    fn decompress(&self, data: &[u8], expected_len: usize) -> Result<(Vec<u8>, usize)>;
}

/// zlib (RFC 1950) via flate2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zlib {
    level: u32,
}

impl Zlib {
    /// Levels above 9 are clamped.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for Zlib {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Compressor for Zlib {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Level::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| NaiError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| NaiError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8], expected_len: usize) -> Result<(Vec<u8>, usize)> {
        // One byte of slack detects streams longer than recorded
        let mut out = Vec::with_capacity(expected_len.min(data.len().saturating_mul(8)));
        let mut decoder = ZlibDecoder::new(data);
        (&mut decoder)
            .take(expected_len as u64 + 1)
            .read_to_end(&mut out)
            .map_err(|e| NaiError::Compression(e.to_string()))?;

        if out.len() > expected_len {
            return Err(NaiError::Compression(format!(
                "payload inflates past the recorded {} bytes",
                expected_len
            )));
        }
        if out.len() < expected_len {
            return Err(NaiError::Compression(format!(
                "payload inflated to {} bytes, expected {}",
                out.len(),
                expected_len
            )));
        }
        Ok((out, decoder.total_in() as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        (0..4096u32).map(|i| (i % 61) as u8).collect()
    }

    #[test]
    fn test_zlib_roundtrip() {
        let zlib = Zlib::default();
        let data = sample();
        let packed = zlib.compress(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(
            zlib.decompress(&packed, data.len()).unwrap(),
            (data, packed.len())
        );
    }

    #[test]
    fn test_stored_level() {
        let zlib = Zlib::new(0);
        let data = sample();
        let packed = zlib.compress(&data).unwrap();
        assert_eq!(zlib.decompress(&packed, data.len()).unwrap().0, data);
    }

    #[test]
    fn test_bytes_after_stream_not_consumed() {
        let zlib = Zlib::default();
        let data = sample();
        let mut packed = zlib.compress(&data).unwrap();
        let stream_len = packed.len();
        packed.extend_from_slice(b"junkjunk");
        let (out, consumed) = zlib.decompress(&packed, data.len()).unwrap();
        assert_eq!(out, data);
        assert_eq!(consumed, stream_len);
    }

    #[test]
    fn test_level_clamped() {
        assert_eq!(Zlib::new(42).level(), 9);
    }

    #[test]
    fn test_size_mismatch() {
        let zlib = Zlib::default();
        let data = sample();
        let packed = zlib.compress(&data).unwrap();
        assert!(matches!(
            zlib.decompress(&packed, data.len() + 1),
            Err(NaiError::Compression(_))
        ));
        assert!(matches!(
            zlib.decompress(&packed, data.len() - 1),
            Err(NaiError::Compression(_))
        ));
    }

    #[test]
    fn test_corrupt_stream() {
        let zlib = Zlib::default();
        assert!(matches!(
            zlib.decompress(&[0xDE, 0xAD, 0xBE, 0xEF], 16),
            Err(NaiError::Compression(_))
        ));
    }
}
