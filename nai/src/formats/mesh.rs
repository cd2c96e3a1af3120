//! NAI mesh section
//!
//! # Layout
//! ```text
//! 0x00: material_index u16   0xFFFF = no material
//! 0x02: index_size u16       0 = none, 1 = u8, 2 = u16, 3 = u32, 4 = u64
//! 0x04: vert_count u32
//! 0x08: index_count u32
//! 0x0C: vertex_data (vert_count × stride f32, stride from the header's attribute set)
//! var:  index_data (index_count × index width), no padding before it
//! ```
//!
//! Indices follow vertices directly, so the index region starts at
//! `vertex_data + vert_count × stride` with no separate offset field. The
//! vertex region is empty when the header excludes vertices.

use std::io::Write;

use crate::error::{NaiError, Result, Section};
use crate::formats::header::Header;
use crate::layout::{self, IndexSize, VertexAttribute};
use crate::reader::ByteReader;

/// `material_index` value for a mesh without a material
pub const NO_MATERIAL: u16 = 0xFFFF;

/// Raw mesh prefix (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct NaiMeshHeader {
    pub material_index: u16,
    pub index_size: u16,
    pub vert_count: u32,
    pub index_count: u32,
}

impl NaiMeshHeader {
    pub const SIZE: usize = 12;

    pub fn new(material_index: u16, index_size: IndexSize, vert_count: u32, index_count: u32) -> Self {
        Self {
            material_index,
            index_size: index_size as u16,
            vert_count,
            index_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.material_index.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.index_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.vert_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.index_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            material_index: u16::from_le_bytes([bytes[0], bytes[1]]),
            index_size: u16::from_le_bytes([bytes[2], bytes[3]]),
            vert_count: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            index_count: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }
}

/// Typed index buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Indices {
    #[default]
    None,
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl Indices {
    pub fn size(&self) -> IndexSize {
        match self {
            Indices::None => IndexSize::None,
            Indices::U8(_) => IndexSize::U8,
            Indices::U16(_) => IndexSize::U16,
            Indices::U32(_) => IndexSize::U32,
            Indices::U64(_) => IndexSize::U64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::None => 0,
            Indices::U8(v) => v.len(),
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
            Indices::U64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index `i`, widened to u64
    pub fn get(&self, i: usize) -> Option<u64> {
        match self {
            Indices::None => None,
            Indices::U8(v) => v.get(i).map(|&x| x as u64),
            Indices::U16(v) => v.get(i).map(|&x| x as u64),
            Indices::U32(v) => v.get(i).map(|&x| x as u64),
            Indices::U64(v) => v.get(i).copied(),
        }
    }

    fn from_le_bytes(size: IndexSize, bytes: &[u8]) -> Self {
        match size {
            IndexSize::None => Indices::None,
            IndexSize::U8 => Indices::U8(bytes.to_vec()),
            IndexSize::U16 => Indices::U16(
                bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect(),
            ),
            IndexSize::U32 => Indices::U32(
                bytes
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            IndexSize::U64 => Indices::U64(
                bytes
                    .chunks_exact(8)
                    .map(|c| {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(c);
                        u64::from_le_bytes(b)
                    })
                    .collect(),
            ),
        }
    }

    fn write_le<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        match self {
            Indices::None => Ok(()),
            Indices::U8(v) => w.write_all(v),
            Indices::U16(v) => v.iter().try_for_each(|i| w.write_all(&i.to_le_bytes())),
            Indices::U32(v) => v.iter().try_for_each(|i| w.write_all(&i.to_le_bytes())),
            Indices::U64(v) => v.iter().try_for_each(|i| w.write_all(&i.to_le_bytes())),
        }
    }
}

/// Decoded mesh
///
/// The vertex buffer layout (interleaved or separated) and the attributes it
/// holds are set once for the whole document by the [`Header`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Index into the document's materials
    pub material: Option<u16>,
    pub vert_count: u32,
    pub vertices: Vec<f32>,
    pub indices: Indices,
}

impl Mesh {
    /// Components of one attribute of one vertex.
    pub fn attribute(&self, header: &Header, kind: VertexAttribute, vertex: u32) -> Option<&[f32]> {
        let range = layout::attribute_range(
            header.layout.vertices,
            &header.vertex_attributes,
            self.vert_count,
            kind,
            vertex,
        )?;
        self.vertices.get(range)
    }

    /// Check the encode-time invariants against `header`.
    pub fn validate(&self, header: &Header) -> Result<()> {
        if let Some(material) = self.material {
            if material == NO_MATERIAL || material >= header.counts.materials {
                return Err(NaiError::invalid(format!(
                    "material index {} out of range ({} materials)",
                    material, header.counts.materials
                )));
            }
        }

        let expected = layout::vertex_floats(
            header.layout.vertices,
            &header.vertex_attributes,
            self.vert_count,
        );
        if self.vertices.len() as u64 != expected {
            return Err(NaiError::invalid(format!(
                "vertex buffer holds {} floats, expected {} ({} vertices)",
                self.vertices.len(),
                expected,
                self.vert_count
            )));
        }

        if self.indices.size() != IndexSize::None && self.indices.is_empty() {
            return Err(NaiError::invalid(
                "empty index buffer must use Indices::None",
            ));
        }
        if u32::try_from(self.indices.len()).is_err() {
            return Err(NaiError::invalid(format!(
                "{} indices exceed the u32 count field",
                self.indices.len()
            )));
        }
        Ok(())
    }

    /// Decode one mesh from the start of `bytes`.
    ///
    /// Returns the mesh and the number of bytes consumed.
    pub fn decode(bytes: &[u8], header: &Header) -> Result<(Mesh, usize)> {
        let mut reader = ByteReader::new(bytes);
        reader.enter(Section::Mesh(0));
        let mesh = read_mesh(&mut reader, header)?;
        Ok((mesh, reader.position()))
    }

    /// Validate and encode this mesh.
    pub fn encode(&self, header: &Header) -> Result<Vec<u8>> {
        self.validate(header)?;
        let mut out = Vec::new();
        write_mesh(&mut out, self)?;
        Ok(out)
    }
}

/// Read one mesh section.
pub fn read_mesh(r: &mut ByteReader<'_>, header: &Header) -> Result<Mesh> {
    let prefix = r.read_array::<{ NaiMeshHeader::SIZE }>()?;
    // Length checked by read_array
    let raw = NaiMeshHeader::from_bytes(&prefix)
        .ok_or_else(|| NaiError::format("mesh", "short prefix"))?;

    let material = match raw.material_index {
        NO_MATERIAL => None,
        index if index < header.counts.materials => Some(index),
        index => {
            return Err(NaiError::format(
                "mesh",
                format!(
                    "material index {} out of range ({} materials)",
                    index, header.counts.materials
                ),
            ));
        }
    };

    let index_size = IndexSize::from_u16(raw.index_size).ok_or_else(|| {
        NaiError::format("mesh", format!("unknown index size {}", raw.index_size))
    })?;
    match (index_size, raw.index_count) {
        (IndexSize::None, n) if n > 0 => {
            return Err(NaiError::format(
                "mesh",
                format!("{} indices with index size none", n),
            ));
        }
        (size, 0) if size != IndexSize::None => {
            return Err(NaiError::format(
                "mesh",
                format!("index size {:?} with no indices", size),
            ));
        }
        _ => {}
    }

    let floats = layout::vertex_floats(
        header.layout.vertices,
        &header.vertex_attributes,
        raw.vert_count,
    );
    let floats = r.ensure_u64(floats * 4)? / 4;
    let vertices = r.read_f32_vec(floats)?;

    let index_bytes = r.ensure_u64(raw.index_count as u64 * index_size.bytes() as u64)?;
    let indices = Indices::from_le_bytes(index_size, r.read_bytes(index_bytes)?);

    Ok(Mesh {
        material,
        vert_count: raw.vert_count,
        vertices,
        indices,
    })
}

/// Write one mesh section. The mesh must already be validated.
pub fn write_mesh<W: Write>(w: &mut W, mesh: &Mesh) -> Result<()> {
    let raw = NaiMeshHeader::new(
        mesh.material.unwrap_or(NO_MATERIAL),
        mesh.indices.size(),
        mesh.vert_count,
        mesh.indices.len() as u32,
    );
    w.write_all(&raw.to_bytes())?;
    for f in &mesh.vertices {
        w.write_all(&f.to_le_bytes())?;
    }
    mesh.indices.write_le(w)?;
    Ok(())
}
