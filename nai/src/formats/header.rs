//! NAI container header (36 bytes)
//!
//! # Layout
//! ```text
//! 0x00: magic [u8; 4]             "NAI~"
//! 0x04: version [u8; 2]           major, minor
//! 0x06: layout_mask u16           one bit per group, see below
//! 0x08: vertex_types [u8; 8]      slot array of VertexAttribute codes
//! 0x10: material_values [u8; 8]   slot array of MaterialValueKind codes
//! 0x18: compression u16           0 = none, 1 = zlib
//! 0x1A: mesh_count u16
//! 0x1C: material_count u16
//! 0x1E: texture_count u16
//! 0x20: animation_count u16
//! 0x22: skeleton_count u16
//! ```
//!
//! Layout mask groups are mutually exclusive: exactly one of bits 0..=2
//! (vertices none / interleaved / separated) and exactly one of bits 3..=5
//! (textures none / internal / external).

use serde::{Deserialize, Serialize};

use crate::error::{NaiError, Result, Section};
use crate::layout::{AttributeSet, TextureStorage, ValueSet, VertexLayout};
use crate::slots::MAX_SLOTS;

/// File magic
pub const NAI_MAGIC: &[u8; 4] = b"NAI~";

/// Major version this codec reads and writes. Files with a newer major
/// version are rejected; minor versions are accepted.
pub const NAI_VERSION_MAJOR: u8 = 1;

/// Minor version of headers built by this codec
pub const NAI_VERSION_MINOR: u8 = 0;

pub const LAYOUT_VERTICES_NONE: u16 = 1 << 0;
pub const LAYOUT_VERTICES_INTERLEAVED: u16 = 1 << 1;
pub const LAYOUT_VERTICES_SEPARATED: u16 = 1 << 2;
pub const LAYOUT_TEXTURES_NONE: u16 = 1 << 3;
pub const LAYOUT_TEXTURES_INTERNAL: u16 = 1 << 4;
pub const LAYOUT_TEXTURES_EXTERNAL: u16 = 1 << 5;

const VERTEX_GROUP: u16 =
    LAYOUT_VERTICES_NONE | LAYOUT_VERTICES_INTERLEAVED | LAYOUT_VERTICES_SEPARATED;
const TEXTURE_GROUP: u16 =
    LAYOUT_TEXTURES_NONE | LAYOUT_TEXTURES_INTERNAL | LAYOUT_TEXTURES_EXTERNAL;

/// Raw on-disk header (36 bytes)
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct NaiFileHeader {
    pub magic: [u8; 4],
    pub version: [u8; 2],
    pub layout_mask: u16,
    pub vertex_types: [u8; MAX_SLOTS],
    pub material_values: [u8; MAX_SLOTS],
    pub compression: u16,
    pub mesh_count: u16,
    pub material_count: u16,
    pub texture_count: u16,
    pub animation_count: u16,
    pub skeleton_count: u16,
}

impl NaiFileHeader {
    pub const SIZE: usize = 36;

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version);
        bytes[6..8].copy_from_slice(&self.layout_mask.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.vertex_types);
        bytes[16..24].copy_from_slice(&self.material_values);
        bytes[24..26].copy_from_slice(&self.compression.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.mesh_count.to_le_bytes());
        bytes[28..30].copy_from_slice(&self.material_count.to_le_bytes());
        bytes[30..32].copy_from_slice(&self.texture_count.to_le_bytes());
        bytes[32..34].copy_from_slice(&self.animation_count.to_le_bytes());
        bytes[34..36].copy_from_slice(&self.skeleton_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        let mut vertex_types = [0u8; MAX_SLOTS];
        vertex_types.copy_from_slice(&bytes[8..16]);
        let mut material_values = [0u8; MAX_SLOTS];
        material_values.copy_from_slice(&bytes[16..24]);

        Some(Self {
            magic,
            version: [bytes[4], bytes[5]],
            layout_mask: u16_at(6),
            vertex_types,
            material_values,
            compression: u16_at(24),
            mesh_count: u16_at(26),
            material_count: u16_at(28),
            texture_count: u16_at(30),
            animation_count: u16_at(32),
            skeleton_count: u16_at(34),
        })
    }
}

/// Whole-payload compression applied after the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum Compression {
    #[default]
    None = 0,
    Zlib = 1,
}

impl Compression {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Compression::None),
            1 => Some(Compression::Zlib),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const CURRENT: Version = Version {
        major: NAI_VERSION_MAJOR,
        minor: NAI_VERSION_MINOR,
    };
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// One choice per layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutMode {
    pub vertices: VertexLayout,
    pub textures: TextureStorage,
}

impl LayoutMode {
    pub fn to_mask(self) -> u16 {
        let vertices = match self.vertices {
            VertexLayout::None => LAYOUT_VERTICES_NONE,
            VertexLayout::Interleaved => LAYOUT_VERTICES_INTERLEAVED,
            VertexLayout::Separated => LAYOUT_VERTICES_SEPARATED,
        };
        let textures = match self.textures {
            TextureStorage::None => LAYOUT_TEXTURES_NONE,
            TextureStorage::Internal => LAYOUT_TEXTURES_INTERNAL,
            TextureStorage::External => LAYOUT_TEXTURES_EXTERNAL,
        };
        vertices | textures
    }

    /// Fails with [`NaiError::Format`] unless each group has exactly one bit
    /// set and no bit outside the groups is set.
    pub fn from_mask(mask: u16) -> Result<Self> {
        let unknown = mask & !(VERTEX_GROUP | TEXTURE_GROUP);
        if unknown != 0 {
            return Err(NaiError::format(
                "layout mask",
                format!("unknown bits {:#06x}", unknown),
            ));
        }
        let vertices = match mask & VERTEX_GROUP {
            LAYOUT_VERTICES_NONE => VertexLayout::None,
            LAYOUT_VERTICES_INTERLEAVED => VertexLayout::Interleaved,
            LAYOUT_VERTICES_SEPARATED => VertexLayout::Separated,
            other => {
                return Err(NaiError::format(
                    "layout mask",
                    format!("vertex layout bits {:#05b} are not a single choice", other),
                ));
            }
        };
        let textures = match mask & TEXTURE_GROUP {
            LAYOUT_TEXTURES_NONE => TextureStorage::None,
            LAYOUT_TEXTURES_INTERNAL => TextureStorage::Internal,
            LAYOUT_TEXTURES_EXTERNAL => TextureStorage::External,
            other => {
                return Err(NaiError::format(
                    "layout mask",
                    format!(
                        "texture storage bits {:#05b} are not a single choice",
                        other >> 3
                    ),
                ));
            }
        };
        Ok(Self { vertices, textures })
    }
}

/// Declared number of each section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionCounts {
    pub meshes: u16,
    pub materials: u16,
    pub textures: u16,
    pub animations: u16,
    pub skeletons: u16,
}

/// Decoded container header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub version: Version,
    pub layout: LayoutMode,
    pub vertex_attributes: AttributeSet,
    pub material_values: ValueSet,
    pub compression: Compression,
    pub counts: SectionCounts,
}

impl Header {
    pub const SIZE: usize = NaiFileHeader::SIZE;

    /// Decode and validate the header at the start of `bytes`.
    ///
    /// The magic is checked before anything else. Trailing header fields a
    /// newer minor version may add are not read.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() >= NAI_MAGIC.len() && &bytes[0..4] != NAI_MAGIC {
            return Err(NaiError::format(
                "header",
                format!(
                    "invalid magic {:?} (expected {:?})",
                    String::from_utf8_lossy(&bytes[0..4]),
                    std::str::from_utf8(NAI_MAGIC).unwrap_or("NAI~")
                ),
            ));
        }
        let raw = NaiFileHeader::from_bytes(bytes).ok_or(NaiError::Truncated {
            section: Section::Header,
            offset: 0,
            need: Self::SIZE,
            have: bytes.len(),
        })?;
        Self::from_raw(&raw)
    }

    /// Validate a raw header.
    pub fn from_raw(raw: &NaiFileHeader) -> Result<Self> {
        if &raw.magic != NAI_MAGIC {
            return Err(NaiError::format("header", "invalid magic"));
        }
        let version = Version {
            major: raw.version[0],
            minor: raw.version[1],
        };
        if version.major > NAI_VERSION_MAJOR {
            return Err(NaiError::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
                supported: NAI_VERSION_MAJOR,
            });
        }

        let layout = LayoutMode::from_mask(raw.layout_mask)?;
        let vertex_attributes = AttributeSet::from_slots(&raw.vertex_types)?;
        let material_values = ValueSet::from_slots(&raw.material_values)?;
        let compression = Compression::from_u16(raw.compression).ok_or_else(|| {
            NaiError::format(
                "header",
                format!("unknown compression kind {}", raw.compression),
            )
        })?;

        Ok(Self {
            version,
            layout,
            vertex_attributes,
            material_values,
            compression,
            counts: SectionCounts {
                meshes: raw.mesh_count,
                materials: raw.material_count,
                textures: raw.texture_count,
                animations: raw.animation_count,
                skeletons: raw.skeleton_count,
            },
        })
    }

    /// Encode-time checks the field types cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.version.major > NAI_VERSION_MAJOR {
            return Err(NaiError::invalid(format!(
                "cannot write version {}.{}, newest supported major version is {}",
                self.version.major, self.version.minor, NAI_VERSION_MAJOR
            )));
        }
        Ok(())
    }

    /// Project onto the raw header. The version is written as stored.
    pub fn to_raw(&self) -> NaiFileHeader {
        NaiFileHeader {
            magic: *NAI_MAGIC,
            version: [self.version.major, self.version.minor],
            layout_mask: self.layout.to_mask(),
            vertex_types: self.vertex_attributes.to_slots(),
            material_values: self.material_values.to_slots(),
            compression: self.compression as u16,
            mesh_count: self.counts.meshes,
            material_count: self.counts.materials,
            texture_count: self.counts.textures,
            animation_count: self.counts.animations,
            skeleton_count: self.counts.skeletons,
        }
    }

    /// Encode the header.
    ///
    /// The slot sets and counts are bounded by their types, so every header
    /// value has an encoding. [`Header::validate`] rejects versions this
    /// codec could not read back.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        self.to_raw().to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MaterialValueKind, VertexAttribute};

    fn sample_header() -> Header {
        Header {
            version: Version::CURRENT,
            layout: LayoutMode {
                vertices: VertexLayout::Separated,
                textures: TextureStorage::External,
            },
            vertex_attributes: AttributeSet::from_kinds(&[
                VertexAttribute::Position,
                VertexAttribute::Uv,
            ])
            .unwrap(),
            material_values: ValueSet::from_kinds(&[MaterialValueKind::BaseColour]).unwrap(),
            compression: Compression::Zlib,
            counts: SectionCounts {
                meshes: 1,
                materials: 2,
                textures: 3,
                animations: 4,
                skeletons: 5,
            },
        }
    }

    #[test]
    fn test_header_size() {
        assert_eq!(NaiFileHeader::SIZE, 36);
        assert_eq!(sample_header().to_bytes().len(), 36);
    }

    #[test]
    fn test_header_byte_layout() {
        let bytes = sample_header().to_bytes();
        assert_eq!(&bytes[0..4], b"NAI~");
        assert_eq!(bytes[4..6], [1, 0]);
        // separated (1 << 2) | external (1 << 5)
        assert_eq!(bytes[6..8], [0x24, 0x00]);
        assert_eq!(bytes[8..16], [1, 7, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[16..24], [8, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[24..26], [1, 0]);
        assert_eq!(bytes[26..36], [1, 0, 2, 0, 3, 0, 4, 0, 5, 0]);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_header();
        let parsed = Header::decode(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = sample_header().to_bytes();
        bytes[0..4].copy_from_slice(b"XXXX");
        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, NaiError::Format { .. }), "{:?}", err);
    }

    #[test]
    fn test_bad_magic_checked_before_length() {
        let err = Header::decode(b"XXXX").unwrap_err();
        assert!(matches!(err, NaiError::Format { .. }));
    }

    #[test]
    fn test_short_header() {
        let bytes = sample_header().to_bytes();
        let err = Header::decode(&bytes[..20]).unwrap_err();
        assert!(matches!(
            err,
            NaiError::Truncated {
                section: Section::Header,
                need: 36,
                have: 20,
                ..
            }
        ));
    }

    #[test]
    fn test_newer_major_rejected() {
        let mut bytes = sample_header().to_bytes();
        bytes[4] = NAI_VERSION_MAJOR + 1;
        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, NaiError::UnsupportedVersion { major: 2, .. }));
    }

    #[test]
    fn test_newer_minor_accepted() {
        let mut bytes = sample_header().to_bytes();
        bytes[5] = 7;
        let parsed = Header::decode(&bytes).unwrap();
        assert_eq!(parsed.version, Version { major: 1, minor: 7 });
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn test_unreadable_major_not_written() {
        let mut header = sample_header();
        header.version = Version { major: 1, minor: 3 };
        assert!(header.validate().is_ok());
        header.version.major = NAI_VERSION_MAJOR + 1;
        assert!(matches!(
            header.validate(),
            Err(NaiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_layout_mask_roundtrip() {
        for vertices in [
            VertexLayout::None,
            VertexLayout::Interleaved,
            VertexLayout::Separated,
        ] {
            for textures in [
                TextureStorage::None,
                TextureStorage::Internal,
                TextureStorage::External,
            ] {
                let mode = LayoutMode { vertices, textures };
                assert_eq!(LayoutMode::from_mask(mode.to_mask()).unwrap(), mode);
            }
        }
    }

    #[test]
    fn test_layout_mask_invalid_combinations() {
        // Both interleaved and separated
        assert!(LayoutMode::from_mask(0b010110).is_err());
        // No vertex choice
        assert!(LayoutMode::from_mask(LAYOUT_TEXTURES_INTERNAL).is_err());
        // No texture choice
        assert!(LayoutMode::from_mask(LAYOUT_VERTICES_INTERLEAVED).is_err());
        // Unknown bit
        assert!(LayoutMode::from_mask(0b010010 | (1 << 9)).is_err());
    }

    #[test]
    fn test_unknown_compression_rejected() {
        let mut bytes = sample_header().to_bytes();
        bytes[24] = 2;
        assert!(matches!(
            Header::decode(&bytes),
            Err(NaiError::Format { .. })
        ));
    }

    #[test]
    fn test_slot_gap_rejected() {
        let mut bytes = sample_header().to_bytes();
        // position, none, uv
        bytes[8..11].copy_from_slice(&[1, 0, 7]);
        assert!(matches!(
            Header::decode(&bytes),
            Err(NaiError::Format { .. })
        ));
    }

    #[test]
    fn test_duplicate_material_slot_rejected() {
        let mut bytes = sample_header().to_bytes();
        bytes[16..18].copy_from_slice(&[8, 8]);
        assert!(matches!(
            Header::decode(&bytes),
            Err(NaiError::Format { .. })
        ));
    }
}
