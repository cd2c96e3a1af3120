//! Opaque animation and skeleton blocks
//!
//! # Layout
//! ```text
//! 0x00: len u32
//! 0x04: bytes[len]
//! ```
//!
//! The codec only keeps length bookkeeping for these sections; their contents
//! pass through byte for byte.

use std::io::Write;

use crate::error::{NaiError, Result};
use crate::reader::ByteReader;

/// Length-prefixed block the codec does not interpret
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpaqueBlock {
    pub data: Vec<u8>,
}

impl OpaqueBlock {
    /// Size of the length prefix
    pub const PREFIX_SIZE: usize = 4;

    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Bytes this block occupies in the stream
    pub fn encoded_len(&self) -> usize {
        Self::PREFIX_SIZE + self.data.len()
    }

    pub fn validate(&self) -> Result<()> {
        if u32::try_from(self.data.len()).is_err() {
            return Err(NaiError::invalid(format!(
                "opaque block of {} bytes exceeds the u32 length field",
                self.data.len()
            )));
        }
        Ok(())
    }
}

impl From<Vec<u8>> for OpaqueBlock {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// Read one opaque block.
pub fn read_opaque(r: &mut ByteReader<'_>) -> Result<OpaqueBlock> {
    let len = r.read_u32()?;
    let len = r.ensure_u64(len as u64)?;
    Ok(OpaqueBlock::new(r.read_bytes(len)?.to_vec()))
}

/// Write one opaque block. The block must already be validated.
pub fn write_opaque<W: Write>(w: &mut W, block: &OpaqueBlock) -> Result<()> {
    w.write_all(&(block.data.len() as u32).to_le_bytes())?;
    w.write_all(&block.data)?;
    Ok(())
}
