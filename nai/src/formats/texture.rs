//! NAI texture section
//!
//! # Layout
//! ```text
//! 0x00: type u16      TextureKind code
//! 0x02: format u16    TextureFormat code
//! 0x04: width u16
//! 0x06: height u16
//! 0x08: payload       format_size(format, width, height) bytes, internal storage only
//! ```
//!
//! With external storage the payload lives in a sibling file named after the
//! texture kind (`model-diffuse.dds`); the stream carries only the prefix.
//! With storage `none` there is no payload anywhere.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{NaiError, Result, Section};
use crate::formats::header::Header;
use crate::layout::{self, TextureFormat, TextureStorage};
use crate::reader::ByteReader;

/// Default extension of external texture siblings
pub const DEFAULT_EXTERNAL_EXTENSION: &str = "dds";

/// Semantic role of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum TextureKind {
    #[default]
    None = 0,
    Diffuse = 1,
    Specular = 2,
    Ambient = 3,
    Emissive = 4,
    Height = 5,
    Normals = 6,
    Shininess = 7,
    Opacity = 8,
    Displacement = 9,
    Lightmap = 10,
    Reflection = 11,
    EmissionColour = 12,
    Metalness = 13,
    DiffuseRoughness = 14,
    Sheen = 15,
    Clearcoat = 16,
    Transmission = 17,
}

impl TextureKind {
    pub const ALL: [TextureKind; 18] = [
        TextureKind::None,
        TextureKind::Diffuse,
        TextureKind::Specular,
        TextureKind::Ambient,
        TextureKind::Emissive,
        TextureKind::Height,
        TextureKind::Normals,
        TextureKind::Shininess,
        TextureKind::Opacity,
        TextureKind::Displacement,
        TextureKind::Lightmap,
        TextureKind::Reflection,
        TextureKind::EmissionColour,
        TextureKind::Metalness,
        TextureKind::DiffuseRoughness,
        TextureKind::Sheen,
        TextureKind::Clearcoat,
        TextureKind::Transmission,
    ];

    pub fn from_u16(value: u16) -> Option<Self> {
        TextureKind::ALL.get(value as usize).copied()
    }

    /// Lowercase name used in sibling file names
    pub const fn name(self) -> &'static str {
        match self {
            TextureKind::None => "none",
            TextureKind::Diffuse => "diffuse",
            TextureKind::Specular => "specular",
            TextureKind::Ambient => "ambient",
            TextureKind::Emissive => "emissive",
            TextureKind::Height => "height",
            TextureKind::Normals => "normals",
            TextureKind::Shininess => "shininess",
            TextureKind::Opacity => "opacity",
            TextureKind::Displacement => "displacement",
            TextureKind::Lightmap => "lightmap",
            TextureKind::Reflection => "reflection",
            TextureKind::EmissionColour => "emission_colour",
            TextureKind::Metalness => "metalness",
            TextureKind::DiffuseRoughness => "diffuse_roughness",
            TextureKind::Sheen => "sheen",
            TextureKind::Clearcoat => "clearcoat",
            TextureKind::Transmission => "transmission",
        }
    }
}

/// Raw texture prefix (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct NaiTextureHeader {
    pub kind: u16,
    pub format: u16,
    pub width: u16,
    pub height: u16,
}

impl NaiTextureHeader {
    pub const SIZE: usize = 8;

    pub fn new(kind: TextureKind, format: TextureFormat, width: u16, height: u16) -> Self {
        Self {
            kind: kind as u16,
            format: format as u16,
            width,
            height,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.kind.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.format.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.width.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            kind: u16::from_le_bytes([bytes[0], bytes[1]]),
            format: u16::from_le_bytes([bytes[2], bytes[3]]),
            width: u16::from_le_bytes([bytes[4], bytes[5]]),
            height: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }
}

/// Where a texture's pixel data is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TexturePayload {
    /// Stored inline after the prefix
    Embedded(Vec<u8>),
    /// Stored in a sibling file the codec does not open
    External,
    /// Excluded from the file
    Omitted,
}

/// Decoded texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub kind: TextureKind,
    pub format: TextureFormat,
    pub width: u16,
    pub height: u16,
    pub payload: TexturePayload,
}

impl Texture {
    pub fn embedded(
        kind: TextureKind,
        format: TextureFormat,
        width: u16,
        height: u16,
        data: Vec<u8>,
    ) -> Self {
        Self {
            kind,
            format,
            width,
            height,
            payload: TexturePayload::Embedded(data),
        }
    }

    /// Payload size implied by format and dimensions
    pub fn data_size(&self) -> usize {
        layout::format_size(self.format, self.width, self.height)
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.payload {
            TexturePayload::Embedded(data) => Some(data),
            _ => None,
        }
    }

    /// Check the encode-time invariants against `header`.
    pub fn validate(&self, header: &Header) -> Result<()> {
        match (header.layout.textures, &self.payload) {
            (TextureStorage::Internal, TexturePayload::Embedded(data)) => {
                let expected = self.data_size();
                if data.len() != expected {
                    return Err(NaiError::invalid(format!(
                        "{:?} {}x{} texture needs {} bytes, has {}",
                        self.format,
                        self.width,
                        self.height,
                        expected,
                        data.len()
                    )));
                }
                Ok(())
            }
            (TextureStorage::External, TexturePayload::External)
            | (TextureStorage::None, TexturePayload::Omitted) => Ok(()),
            (storage, payload) => Err(NaiError::invalid(format!(
                "{} payload does not match texture storage {:?}",
                match payload {
                    TexturePayload::Embedded(_) => "embedded",
                    TexturePayload::External => "external",
                    TexturePayload::Omitted => "omitted",
                },
                storage
            ))),
        }
    }

    /// Decode one texture from the start of `bytes`.
    ///
    /// Returns the texture and the number of bytes consumed.
    pub fn decode(bytes: &[u8], header: &Header) -> Result<(Texture, usize)> {
        let mut reader = ByteReader::new(bytes);
        reader.enter(Section::Texture(0));
        let texture = read_texture(&mut reader, header)?;
        Ok((texture, reader.position()))
    }

    /// Validate and encode this texture.
    pub fn encode(&self, header: &Header) -> Result<Vec<u8>> {
        self.validate(header)?;
        let mut out = Vec::new();
        write_texture(&mut out, self)?;
        Ok(out)
    }
}

/// Read one texture section.
pub fn read_texture(r: &mut ByteReader<'_>, header: &Header) -> Result<Texture> {
    let prefix = r.read_array::<{ NaiTextureHeader::SIZE }>()?;
    let raw = NaiTextureHeader::from_bytes(&prefix)
        .ok_or_else(|| NaiError::format("texture", "short prefix"))?;

    let kind = TextureKind::from_u16(raw.kind)
        .ok_or_else(|| NaiError::format("texture", format!("unknown texture type {}", raw.kind)))?;
    let format = TextureFormat::from_u16(raw.format).ok_or_else(|| {
        NaiError::format("texture", format!("unknown texture format {}", raw.format))
    })?;

    let payload = match header.layout.textures {
        TextureStorage::Internal => {
            let size = layout::format_size(format, raw.width, raw.height);
            TexturePayload::Embedded(r.read_bytes(size)?.to_vec())
        }
        TextureStorage::External => TexturePayload::External,
        TextureStorage::None => TexturePayload::Omitted,
    };

    Ok(Texture {
        kind,
        format,
        width: raw.width,
        height: raw.height,
        payload,
    })
}

/// Write one texture section. The texture must already be validated.
pub fn write_texture<W: Write>(w: &mut W, texture: &Texture) -> Result<()> {
    let raw = NaiTextureHeader::new(texture.kind, texture.format, texture.width, texture.height);
    w.write_all(&raw.to_bytes())?;
    if let TexturePayload::Embedded(data) = &texture.payload {
        w.write_all(data)?;
    }
    Ok(())
}

/// Sibling path for an external texture: `{dir}/{stem}-{kind}.{ext}`.
///
/// ```
/// use std::path::Path;
/// use nai::{external_texture_path, TextureKind};
///
/// let path = external_texture_path(Path::new("assets/model.nai"), TextureKind::Diffuse, "dds");
/// assert_eq!(path, Path::new("assets/model-diffuse.dds"));
/// ```
pub fn external_texture_path(output: &Path, kind: TextureKind, extension: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{}-{}.{}", stem, kind.name(), extension);
    match output.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
