//! Primitive layout rules
//!
//! Pure functions mapping the format's enumerated values to sizes:
//! vertex attribute widths, index element widths, material value shapes and
//! texture payload sizes. Everything the section codecs compute about a
//! payload's length comes from here.

use bytemuck::cast_slice;
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{NaiError, Result};
use crate::slots::{SlotKind, SlotSet};

// ============================================================================
// Layout Choices
// ============================================================================

/// How vertex data is laid out in every mesh of a document
///
/// ```text
/// Interleaved: [xyz][nnn][uv][xyz][nnn][uv]...
/// Separated:   [xyz][xyz]...[nnn][nnn]...[uv][uv]...
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexLayout {
    /// Vertex buffers are excluded from the file
    None,
    #[default]
    Interleaved,
    Separated,
}

/// Where texture payloads live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureStorage {
    /// Texture payloads are excluded from the file
    None,
    /// Payloads are embedded after each texture prefix
    #[default]
    Internal,
    /// Payloads are written to sibling files (`model-diffuse.dds`)
    External,
}

// ============================================================================
// Vertex Attributes
// ============================================================================

/// Vertex attribute kinds, each stored as 32-bit floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VertexAttribute {
    Position = 1,
    Normal = 2,
    Tangent = 3,
    Bitangent = 4,
    ColourRgba = 5,
    ColourRgb = 6,
    Uv = 7,
    Uv3 = 8,
}

impl VertexAttribute {
    /// Number of f32 components per vertex
    pub const fn components(self) -> usize {
        match self {
            VertexAttribute::Position
            | VertexAttribute::Normal
            | VertexAttribute::Tangent
            | VertexAttribute::Bitangent
            | VertexAttribute::ColourRgb
            | VertexAttribute::Uv3 => 3,
            VertexAttribute::ColourRgba => 4,
            VertexAttribute::Uv => 2,
        }
    }
}

impl SlotKind for VertexAttribute {
    const NAME: &'static str = "vertex attribute";

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => VertexAttribute::Position,
            2 => VertexAttribute::Normal,
            3 => VertexAttribute::Tangent,
            4 => VertexAttribute::Bitangent,
            5 => VertexAttribute::ColourRgba,
            6 => VertexAttribute::ColourRgb,
            7 => VertexAttribute::Uv,
            8 => VertexAttribute::Uv3,
            _ => return None,
        })
    }
}

/// Requested vertex attributes, in buffer order
pub type AttributeSet = SlotSet<VertexAttribute>;

/// Floats per vertex for an attribute set
pub fn vertex_stride(attributes: &AttributeSet) -> usize {
    attributes.iter().map(VertexAttribute::components).sum()
}

/// Floats stored for a mesh of `vert_count` vertices.
///
/// Zero when the layout excludes vertices.
pub fn vertex_floats(layout: VertexLayout, attributes: &AttributeSet, vert_count: u32) -> u64 {
    match layout {
        VertexLayout::None => 0,
        VertexLayout::Interleaved | VertexLayout::Separated => {
            vert_count as u64 * vertex_stride(attributes) as u64
        }
    }
}

/// Location of one attribute of one vertex inside a vertex buffer.
///
/// Returns the float range, or `None` if the attribute is not in the set or
/// the layout excludes vertices.
pub fn attribute_range(
    layout: VertexLayout,
    attributes: &AttributeSet,
    vert_count: u32,
    kind: VertexAttribute,
    vertex: u32,
) -> Option<std::ops::Range<usize>> {
    let index = attributes.position(kind)?;
    if vertex >= vert_count {
        return None;
    }
    let preceding: usize = attributes.as_slice()[..index]
        .iter()
        .map(|a| a.components())
        .sum();
    let width = kind.components();
    let vertex = vertex as usize;

    let start = match layout {
        VertexLayout::None => return None,
        VertexLayout::Interleaved => vertex * vertex_stride(attributes) + preceding,
        VertexLayout::Separated => preceding * vert_count as usize + vertex * width,
    };
    Some(start..start + width)
}

/// Convert a vertex buffer between interleaved and separated order.
///
/// Converting to [`VertexLayout::None`] drops the data. Fails with
/// [`NaiError::InvalidArgument`] if `data` does not hold exactly `vert_count`
/// vertices in the `from` layout, or when asked to restore excluded data.
pub fn relayout_vertices(
    data: &[f32],
    attributes: &AttributeSet,
    vert_count: u32,
    from: VertexLayout,
    to: VertexLayout,
) -> Result<Vec<f32>> {
    let expected = vertex_floats(from, attributes, vert_count);
    if data.len() as u64 != expected {
        return Err(NaiError::invalid(format!(
            "vertex buffer holds {} floats, expected {}",
            data.len(),
            expected
        )));
    }
    if from == to {
        return Ok(data.to_vec());
    }
    if to == VertexLayout::None {
        return Ok(Vec::new());
    }
    if from == VertexLayout::None {
        if vertex_floats(to, attributes, vert_count) != 0 {
            return Err(NaiError::invalid("cannot restore excluded vertex data"));
        }
        return Ok(Vec::new());
    }

    let mut out = vec![0.0; data.len()];
    for vertex in 0..vert_count {
        for kind in attributes {
            // Both ranges exist: kind is in the set and vertex < vert_count
            if let (Some(src), Some(dst)) = (
                attribute_range(from, attributes, vert_count, kind, vertex),
                attribute_range(to, attributes, vert_count, kind, vertex),
            ) {
                out[dst].copy_from_slice(&data[src]);
            }
        }
    }
    Ok(out)
}

/// Typed per-attribute source data for [`pack_vertices`]
#[derive(Debug, Clone, Copy)]
pub enum VertexStream<'a> {
    Vec2(&'a [Vec2]),
    Vec3(&'a [Vec3]),
    Vec4(&'a [Vec4]),
}

impl VertexStream<'_> {
    fn components(&self) -> usize {
        match self {
            VertexStream::Vec2(_) => 2,
            VertexStream::Vec3(_) => 3,
            VertexStream::Vec4(_) => 4,
        }
    }

    fn len(&self) -> usize {
        match self {
            VertexStream::Vec2(v) => v.len(),
            VertexStream::Vec3(v) => v.len(),
            VertexStream::Vec4(v) => v.len(),
        }
    }

    fn floats(&self) -> &[f32] {
        match self {
            VertexStream::Vec2(v) => cast_slice(*v),
            VertexStream::Vec3(v) => cast_slice(*v),
            VertexStream::Vec4(v) => cast_slice(*v),
        }
    }
}

/// Build a vertex buffer from one stream per attribute, in set order.
///
/// Returns the buffer and the vertex count. Fails with
/// [`NaiError::InvalidArgument`] if the streams do not match the set in
/// number, width, or length.
pub fn pack_vertices(
    layout: VertexLayout,
    attributes: &AttributeSet,
    streams: &[VertexStream<'_>],
) -> Result<(Vec<f32>, u32)> {
    if streams.len() != attributes.len() {
        return Err(NaiError::invalid(format!(
            "{} vertex streams for {} attributes",
            streams.len(),
            attributes.len()
        )));
    }
    let vert_count = streams.first().map_or(0, VertexStream::len);
    for (kind, stream) in attributes.iter().zip(streams) {
        if stream.components() != kind.components() {
            return Err(NaiError::invalid(format!(
                "{:?} needs {} components, stream has {}",
                kind,
                kind.components(),
                stream.components()
            )));
        }
        if stream.len() != vert_count {
            return Err(NaiError::invalid(format!(
                "{:?} stream has {} vertices, expected {}",
                kind,
                stream.len(),
                vert_count
            )));
        }
    }
    let vert_count = u32::try_from(vert_count)
        .map_err(|_| NaiError::invalid("vertex count exceeds u32 range"))?;

    // Separated order is the streams back to back
    let separated: Vec<f32> = streams
        .iter()
        .flat_map(|s| s.floats().iter().copied())
        .collect();
    let data = relayout_vertices(
        &separated,
        attributes,
        vert_count,
        VertexLayout::Separated,
        layout,
    )?;
    Ok((data, vert_count))
}

// ============================================================================
// Index Sizes
// ============================================================================

/// Index element width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum IndexSize {
    #[default]
    None = 0,
    U8 = 1,
    U16 = 2,
    U32 = 3,
    U64 = 4,
}

impl IndexSize {
    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            0 => IndexSize::None,
            1 => IndexSize::U8,
            2 => IndexSize::U16,
            3 => IndexSize::U32,
            4 => IndexSize::U64,
            _ => return None,
        })
    }

    /// Bytes per index element
    pub const fn bytes(self) -> usize {
        match self {
            IndexSize::None => 0,
            IndexSize::U8 => 1,
            IndexSize::U16 => 2,
            IndexSize::U32 => 4,
            IndexSize::U64 => 8,
        }
    }
}

// ============================================================================
// Material Values
// ============================================================================

/// Fixed shape of a material value on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// `len:u16` + UTF-8 bytes
    String,
    /// One byte, 0 or 1
    Bool,
    /// One f32
    Float,
    /// Four f32 (rgba)
    Colour,
}

/// Material value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MaterialValueKind {
    Name = 1,
    TwoSided = 2,
    Opacity = 3,
    Shininess = 4,
    ShininessStrength = 5,
    Reflectivity = 6,
    RefractiveIndex = 7,
    BaseColour = 8,
    DiffuseColour = 9,
    AmbientColour = 10,
    SpecularColour = 11,
    EmissiveColour = 12,
    TransparentColour = 13,
    ReflectiveColour = 14,
    SheenColour = 15,
    MetallicFactor = 16,
    RoughnessFactor = 17,
    SpecularFactor = 18,
    GlossinessFactor = 19,
    EmissiveFactor = 20,
    TransmissionFactor = 21,
    ClearcoatFactor = 22,
    ClearcoatRoughnessFactor = 23,
    AnisotropyFactor = 24,
}

impl MaterialValueKind {
    /// Every kind, in code order
    pub const ALL: [MaterialValueKind; 24] = [
        MaterialValueKind::Name,
        MaterialValueKind::TwoSided,
        MaterialValueKind::Opacity,
        MaterialValueKind::Shininess,
        MaterialValueKind::ShininessStrength,
        MaterialValueKind::Reflectivity,
        MaterialValueKind::RefractiveIndex,
        MaterialValueKind::BaseColour,
        MaterialValueKind::DiffuseColour,
        MaterialValueKind::AmbientColour,
        MaterialValueKind::SpecularColour,
        MaterialValueKind::EmissiveColour,
        MaterialValueKind::TransparentColour,
        MaterialValueKind::ReflectiveColour,
        MaterialValueKind::SheenColour,
        MaterialValueKind::MetallicFactor,
        MaterialValueKind::RoughnessFactor,
        MaterialValueKind::SpecularFactor,
        MaterialValueKind::GlossinessFactor,
        MaterialValueKind::EmissiveFactor,
        MaterialValueKind::TransmissionFactor,
        MaterialValueKind::ClearcoatFactor,
        MaterialValueKind::ClearcoatRoughnessFactor,
        MaterialValueKind::AnisotropyFactor,
    ];

    pub const fn shape(self) -> ValueShape {
        match self {
            MaterialValueKind::Name => ValueShape::String,
            MaterialValueKind::TwoSided => ValueShape::Bool,
            MaterialValueKind::BaseColour
            | MaterialValueKind::DiffuseColour
            | MaterialValueKind::AmbientColour
            | MaterialValueKind::SpecularColour
            | MaterialValueKind::EmissiveColour
            | MaterialValueKind::TransparentColour
            | MaterialValueKind::ReflectiveColour
            | MaterialValueKind::SheenColour => ValueShape::Colour,
            MaterialValueKind::Opacity
            | MaterialValueKind::Shininess
            | MaterialValueKind::ShininessStrength
            | MaterialValueKind::Reflectivity
            | MaterialValueKind::RefractiveIndex
            | MaterialValueKind::MetallicFactor
            | MaterialValueKind::RoughnessFactor
            | MaterialValueKind::SpecularFactor
            | MaterialValueKind::GlossinessFactor
            | MaterialValueKind::EmissiveFactor
            | MaterialValueKind::TransmissionFactor
            | MaterialValueKind::ClearcoatFactor
            | MaterialValueKind::ClearcoatRoughnessFactor
            | MaterialValueKind::AnisotropyFactor => ValueShape::Float,
        }
    }
}

impl SlotKind for MaterialValueKind {
    const NAME: &'static str = "material value";

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        MaterialValueKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
    }
}

/// Requested material values, in payload order
pub type ValueSet = SlotSet<MaterialValueKind>;

// ============================================================================
// Texture Formats
// ============================================================================

/// Texture storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TextureFormat {
    R = 1,
    Rg = 2,
    Rgb = 3,
    Rgba = 4,
    Bc1 = 100,
    Bc3 = 101,
    Bc4 = 102,
    Bc5 = 103,
    Bc6h = 104,
    Bc7 = 105,
    Etc1 = 200,
    Astc4x4 = 300,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 12] = [
        TextureFormat::R,
        TextureFormat::Rg,
        TextureFormat::Rgb,
        TextureFormat::Rgba,
        TextureFormat::Bc1,
        TextureFormat::Bc3,
        TextureFormat::Bc4,
        TextureFormat::Bc5,
        TextureFormat::Bc6h,
        TextureFormat::Bc7,
        TextureFormat::Etc1,
        TextureFormat::Astc4x4,
    ];

    pub fn from_u16(value: u16) -> Option<Self> {
        TextureFormat::ALL
            .iter()
            .copied()
            .find(|format| *format as u16 == value)
    }

    /// Bytes per 4×4 block, or `None` for uncompressed formats
    pub const fn block_bytes(self) -> Option<usize> {
        match self {
            TextureFormat::R | TextureFormat::Rg | TextureFormat::Rgb | TextureFormat::Rgba => {
                None
            }
            // 64-bit blocks
            TextureFormat::Bc1 | TextureFormat::Bc4 | TextureFormat::Etc1 => Some(8),
            // 128-bit blocks
            TextureFormat::Bc3
            | TextureFormat::Bc5
            | TextureFormat::Bc6h
            | TextureFormat::Bc7
            | TextureFormat::Astc4x4 => Some(16),
        }
    }

    /// Bytes per pixel for uncompressed formats
    pub const fn channels(self) -> Option<usize> {
        match self {
            TextureFormat::R => Some(1),
            TextureFormat::Rg => Some(2),
            TextureFormat::Rgb => Some(3),
            TextureFormat::Rgba => Some(4),
            _ => None,
        }
    }

    pub const fn is_compressed(self) -> bool {
        self.block_bytes().is_some()
    }
}

/// Payload size in bytes of a `width × height` texture.
///
/// Block-compressed formats round each dimension up to whole 4×4 blocks.
pub fn format_size(format: TextureFormat, width: u16, height: u16) -> usize {
    let w = width as usize;
    let h = height as usize;

    match format.block_bytes() {
        Some(block) => w.div_ceil(4) * h.div_ceil(4) * block,
        None => w * h * format.channels().unwrap_or(0),
    }
}
