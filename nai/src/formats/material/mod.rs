//! NAI material section
//!
//! # Layout
//! ```text
//! 0x00: texture_count u16
//! 0x02: reserved u16          must be 0
//! 0x04: values                one per kind in the header's material value set, in set order
//! var:  texture_refs          texture_count × u16 indices into the document's textures
//! ```
//!
//! Value encodings by shape:
//! - String: `len:u16` + UTF-8 bytes
//! - Bool: one byte, 0 or 1
//! - Float: one f32
//! - Colour: four f32 (r, g, b, a)


use std::io::Write;

use glam::Vec4;

use crate::error::{NaiError, Result, Section};
use crate::formats::header::Header;
use crate::layout::{MaterialValueKind, ValueShape};
use crate::reader::ByteReader;

/// Raw material prefix (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct NaiMaterialHeader {
    pub texture_count: u16,
    /// Reserved, must be 0
    pub reserved: u16,
}

impl NaiMaterialHeader {
    pub const SIZE: usize = 4;

    pub fn new(texture_count: u16) -> Self {
        Self {
            texture_count,
            reserved: 0,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.texture_count.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            texture_count: u16::from_le_bytes([bytes[0], bytes[1]]),
            reserved: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// One material property value
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialValue {
    Name(String),
    TwoSided(bool),
    /// Any scalar kind (opacity, shininess, the PBR factors)
    Factor(f32),
    Colour(Vec4),
}

impl MaterialValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            MaterialValue::Name(_) => ValueShape::String,
            MaterialValue::TwoSided(_) => ValueShape::Bool,
            MaterialValue::Factor(_) => ValueShape::Float,
            MaterialValue::Colour(_) => ValueShape::Colour,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MaterialValue::Name(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MaterialValue::TwoSided(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            MaterialValue::Factor(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_colour(&self) -> Option<Vec4> {
        match self {
            MaterialValue::Colour(c) => Some(*c),
            _ => None,
        }
    }

    fn read(r: &mut ByteReader<'_>, kind: MaterialValueKind) -> Result<Self> {
        Ok(match kind.shape() {
            ValueShape::String => {
                let len = r.read_u16()? as usize;
                let bytes = r.read_bytes(len)?;
                let name = std::str::from_utf8(bytes).map_err(|e| {
                    NaiError::format("material", format!("{:?} is not UTF-8: {}", kind, e))
                })?;
                MaterialValue::Name(name.to_owned())
            }
            ValueShape::Bool => match r.read_u8()? {
                0 => MaterialValue::TwoSided(false),
                1 => MaterialValue::TwoSided(true),
                other => {
                    return Err(NaiError::format(
                        "material",
                        format!("{:?} byte must be 0 or 1, got {}", kind, other),
                    ));
                }
            },
            ValueShape::Float => MaterialValue::Factor(r.read_f32()?),
            ValueShape::Colour => {
                let c = r.read_f32_vec(4)?;
                MaterialValue::Colour(Vec4::from_slice(&c))
            }
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            MaterialValue::Name(name) => {
                // Length checked by Material::validate
                w.write_all(&(name.len() as u16).to_le_bytes())?;
                w.write_all(name.as_bytes())?;
            }
            MaterialValue::TwoSided(b) => w.write_all(&[*b as u8])?,
            MaterialValue::Factor(f) => w.write_all(&f.to_le_bytes())?,
            MaterialValue::Colour(c) => {
                for f in c.to_array() {
                    w.write_all(&f.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }
}

/// Decoded material
///
/// `values` pairs each kind of the header's material value set with its
/// value, in set order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    pub values: Vec<(MaterialValueKind, MaterialValue)>,
    /// Indices into the document's textures
    pub textures: Vec<u16>,
}

impl Material {
    /// Value of `kind`, if present
    pub fn get(&self, kind: MaterialValueKind) -> Option<&MaterialValue> {
        self.values
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, value)| value)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(MaterialValueKind::Name).and_then(MaterialValue::as_str)
    }

    /// Check the encode-time invariants against `header`.
    pub fn validate(&self, header: &Header) -> Result<()> {
        let set = &header.material_values;
        if self.values.len() != set.len() {
            return Err(NaiError::invalid(format!(
                "material has {} values, header requests {}",
                self.values.len(),
                set.len()
            )));
        }
        for (expected, (kind, value)) in set.iter().zip(&self.values) {
            if *kind != expected {
                return Err(NaiError::invalid(format!(
                    "material value {:?} where header order expects {:?}",
                    kind, expected
                )));
            }
            if value.shape() != kind.shape() {
                return Err(NaiError::invalid(format!(
                    "{:?} needs a {:?} value, got {:?}",
                    kind,
                    kind.shape(),
                    value
                )));
            }
            match value {
                MaterialValue::Name(name) if name.len() > u16::MAX as usize => {
                    return Err(NaiError::invalid(format!(
                        "material name of {} bytes exceeds the u16 length field",
                        name.len()
                    )));
                }
                _ => {}
            }
        }

        if u16::try_from(self.textures.len()).is_err() {
            return Err(NaiError::invalid(format!(
                "{} texture references exceed the u16 count field",
                self.textures.len()
            )));
        }
        if let Some(&bad) = self
            .textures
            .iter()
            .find(|&&t| t >= header.counts.textures)
        {
            return Err(NaiError::invalid(format!(
                "texture reference {} out of range ({} textures)",
                bad, header.counts.textures
            )));
        }
        Ok(())
    }

    /// Decode one material from the start of `bytes`.
    ///
    /// Returns the material and the number of bytes consumed.
    pub fn decode(bytes: &[u8], header: &Header) -> Result<(Material, usize)> {
        let mut reader = ByteReader::new(bytes);
        reader.enter(Section::Material(0));
        let material = read_material(&mut reader, header)?;
        Ok((material, reader.position()))
    }

    /// Validate and encode this material.
    pub fn encode(&self, header: &Header) -> Result<Vec<u8>> {
        self.validate(header)?;
        let mut out = Vec::new();
        write_material(&mut out, self)?;
        Ok(out)
    }
}

/// Read one material section.
pub fn read_material(r: &mut ByteReader<'_>, header: &Header) -> Result<Material> {
    let prefix = r.read_array::<{ NaiMaterialHeader::SIZE }>()?;
    let raw = NaiMaterialHeader::from_bytes(&prefix)
        .ok_or_else(|| NaiError::format("material", "short prefix"))?;
    if raw.reserved != 0 {
        return Err(NaiError::format(
            "material",
            format!("reserved field is {:#06x}, expected 0", raw.reserved),
        ));
    }

    let mut values = Vec::with_capacity(header.material_values.len());
    for kind in &header.material_values {
        values.push((kind, MaterialValue::read(r, kind)?));
    }

    r.ensure(raw.texture_count as usize * 2)?;
    let mut textures = Vec::with_capacity(raw.texture_count as usize);
    for _ in 0..raw.texture_count {
        let index = r.read_u16()?;
        if index >= header.counts.textures {
            return Err(NaiError::format(
                "material",
                format!(
                    "texture reference {} out of range ({} textures)",
                    index, header.counts.textures
                ),
            ));
        }
        textures.push(index);
    }

    Ok(Material { values, textures })
}

/// Write one material section. The material must already be validated.
pub fn write_material<W: Write>(w: &mut W, material: &Material) -> Result<()> {
    let raw = NaiMaterialHeader::new(material.textures.len() as u16);
    w.write_all(&raw.to_bytes())?;
    for (_, value) in &material.values {
        value.write(w)?;
    }
    for index in &material.textures {
        w.write_all(&index.to_le_bytes())?;
    }
    Ok(())
}
