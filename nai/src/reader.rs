//! Bounds-checked little-endian reader over a byte slice

use crate::error::{NaiError, Result, Section};

/// Read cursor over a byte slice. All reads are little-endian.
///
/// Every read checks the remaining length first, so a short stream surfaces
/// as [`NaiError::Truncated`] tagged with the section being decoded.
#[derive(Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    section: Section,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            section: Section::Payload,
        }
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining bytes from current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Tag subsequent truncation errors with `section`.
    pub fn enter(&mut self, section: Section) {
        self.section = section;
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Fail unless `n` more bytes are available.
    pub fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        Ok(())
    }

    /// Same as [`ensure`](Self::ensure) for sizes computed in 64-bit
    /// arithmetic, which may not fit in `usize` on every target.
    pub fn ensure_u64(&self, n: u64) -> Result<usize> {
        match usize::try_from(n) {
            Ok(n) => self.ensure(n).map(|_| n),
            Err(_) => Err(self.truncated(usize::MAX)),
        }
    }

    fn truncated(&self, need: usize) -> NaiError {
        NaiError::Truncated {
            section: self.section,
            offset: self.pos,
            need,
            have: self.remaining(),
        }
    }

    /// Read a slice of `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `count` floats in one bounds check.
    pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>> {
        let len = count.checked_mul(4).ok_or_else(|| self.truncated(usize::MAX))?;
        let bytes = self.read_bytes(len)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Read everything left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0x00, 0x00, 0x80, 0x3F];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_short_read_reports_section() {
        let data = [0u8; 3];
        let mut r = ByteReader::new(&data);
        r.enter(Section::Texture(2));
        r.read_u16().unwrap();
        match r.read_u16() {
            Err(NaiError::Truncated {
                section,
                offset,
                need,
                have,
            }) => {
                assert_eq!(section, Section::Texture(2));
                assert_eq!(offset, 2);
                assert_eq!(need, 2);
                assert_eq!(have, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        // A failed read does not advance
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn test_read_f32_vec() {
        let mut data = Vec::new();
        for f in [1.0f32, -2.5, 3.25] {
            data.extend_from_slice(&f.to_le_bytes());
        }
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_f32_vec(3).unwrap(), vec![1.0, -2.5, 3.25]);
        assert!(r.read_f32_vec(1).is_err());
    }
}
