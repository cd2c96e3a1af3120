//! Stream assembler
//!
//! Decoding is one sequential pass: header, optional inflate of everything
//! after it, then `mesh_count` meshes, `material_count` materials,
//! `texture_count` textures, `animation_count` animations and
//! `skeleton_count` skeletons, each starting where the previous one ended.
//! Encoding validates the whole document first and only then serializes, so
//! a failed encode never leaves a partial stream behind.

use std::borrow::Cow;
use std::io::Write;

use crate::compression::{Compressor, Zlib};
use crate::config::CodecConfig;
use crate::document::{Decoded, Document, TrailingData};
use crate::error::{NaiError, Result, Section};
use crate::formats::{
    Compression, Header, read_material, read_mesh, read_opaque, read_texture, write_material,
    write_mesh, write_opaque, write_texture,
};
use crate::reader::ByteReader;

/// NAI encoder and decoder
#[derive(Debug, Clone)]
pub struct NaiCodec<C: Compressor = Zlib> {
    compressor: C,
    reject_trailing_data: bool,
}

impl NaiCodec<Zlib> {
    /// Codec with default zlib level that reports trailing data without
    /// failing.
    pub fn new() -> Self {
        Self {
            compressor: Zlib::default(),
            reject_trailing_data: false,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            compressor: Zlib::new(config.compression.level),
            reject_trailing_data: config.decode.reject_trailing_data,
        }
    }
}

impl Default for NaiCodec<Zlib> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Compressor> NaiCodec<C> {
    /// Swap the transform used for `Compression::Zlib` payloads.
    pub fn with_compressor<D: Compressor>(self, compressor: D) -> NaiCodec<D> {
        NaiCodec {
            compressor,
            reject_trailing_data: self.reject_trailing_data,
        }
    }

    /// Fail with [`NaiError::TrailingData`] instead of reporting it.
    pub fn reject_trailing_data(mut self, reject: bool) -> Self {
        self.reject_trailing_data = reject;
        self
    }

    /// Decode a complete NAI stream.
    ///
    /// Offsets in errors count from the start of `bytes` for uncompressed
    /// streams, and from the start of the inflated payload for compressed
    /// ones. [`Decoded::trailing`] follows the same rule, except that bytes
    /// after the end of a zlib stream are reported at their offset in
    /// `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        let header = Header::decode(bytes)?;
        tracing::debug!(
            "Decoding NAI {}.{}: {:?} vertices, {:?} textures, {:?} compression",
            header.version.major,
            header.version.minor,
            header.layout.vertices,
            header.layout.textures,
            header.compression
        );

        let (payload, start, after_stream) = match header.compression {
            Compression::None => (Cow::Borrowed(bytes), Header::SIZE, None),
            Compression::Zlib => {
                let mut r = ByteReader::new(&bytes[Header::SIZE..]);
                r.enter(Section::Payload);
                let payload_len = r.read_u32()? as usize;
                let compressed = r.read_rest();
                let (inflated, consumed) = self.compressor.decompress(compressed, payload_len)?;
                tracing::trace!(
                    "Inflated {} byte payload to {} bytes",
                    consumed,
                    inflated.len()
                );
                let unread = compressed.len().saturating_sub(consumed);
                let after_stream = (unread > 0).then_some(TrailingData {
                    offset: Header::SIZE + 4 + consumed,
                    len: unread,
                });
                (Cow::Owned(inflated), 0, after_stream)
            }
        };

        let mut r = ByteReader::new(&payload);
        r.read_bytes(start)?;
        let document = read_sections(&mut r, header)?;

        let trailing = if r.is_empty() {
            after_stream
        } else {
            Some(TrailingData {
                offset: r.position(),
                len: r.remaining(),
            })
        };
        if let Some(trailing) = trailing {
            if self.reject_trailing_data {
                return Err(NaiError::TrailingData {
                    offset: trailing.offset,
                    len: trailing.len,
                });
            }
            tracing::warn!(
                "{} trailing bytes after the last section at offset {:#x}",
                trailing.len,
                trailing.offset
            );
        }

        Ok(Decoded { document, trailing })
    }

    /// Validate and encode a document.
    pub fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        document.validate()?;

        let mut payload = Vec::new();
        write_sections(&mut payload, document)?;

        let header = &document.header;
        let mut out = Vec::with_capacity(Header::SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        match header.compression {
            Compression::None => out.extend_from_slice(&payload),
            Compression::Zlib => {
                let payload_len = u32::try_from(payload.len()).map_err(|_| {
                    NaiError::invalid(format!(
                        "{} byte payload exceeds the u32 length field",
                        payload.len()
                    ))
                })?;
                let packed = self.compressor.compress(&payload)?;
                tracing::trace!(
                    "Deflated {} byte payload to {} bytes",
                    payload.len(),
                    packed.len()
                );
                out.extend_from_slice(&payload_len.to_le_bytes());
                out.extend_from_slice(&packed);
            }
        }

        tracing::debug!(
            "Encoded NAI document: {} meshes, {} materials, {} textures, {} animations, {} skeletons ({} bytes)",
            document.meshes.len(),
            document.materials.len(),
            document.textures.len(),
            document.animations.len(),
            document.skeletons.len(),
            out.len()
        );
        Ok(out)
    }

    /// Encode a document into `writer`. Nothing is written if encoding fails.
    pub fn encode_to<W: Write>(&self, document: &Document, writer: &mut W) -> Result<()> {
        let bytes = self.encode(document)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

fn read_sections(r: &mut ByteReader<'_>, header: Header) -> Result<Document> {
    let counts = header.counts;

    let mut meshes = Vec::with_capacity(counts.meshes as usize);
    for i in 0..counts.meshes {
        r.enter(Section::Mesh(i));
        tracing::trace!("mesh {} at {:#x}", i, r.position());
        meshes.push(read_mesh(r, &header)?);
    }

    let mut materials = Vec::with_capacity(counts.materials as usize);
    for i in 0..counts.materials {
        r.enter(Section::Material(i));
        tracing::trace!("material {} at {:#x}", i, r.position());
        materials.push(read_material(r, &header)?);
    }

    let mut textures = Vec::with_capacity(counts.textures as usize);
    for i in 0..counts.textures {
        r.enter(Section::Texture(i));
        tracing::trace!("texture {} at {:#x}", i, r.position());
        textures.push(read_texture(r, &header)?);
    }

    let mut animations = Vec::with_capacity(counts.animations as usize);
    for i in 0..counts.animations {
        r.enter(Section::Animation(i));
        animations.push(read_opaque(r)?);
    }

    let mut skeletons = Vec::with_capacity(counts.skeletons as usize);
    for i in 0..counts.skeletons {
        r.enter(Section::Skeleton(i));
        skeletons.push(read_opaque(r)?);
    }

    tracing::debug!(
        "Decoded {} meshes, {} materials, {} textures, {} animations, {} skeletons",
        meshes.len(),
        materials.len(),
        textures.len(),
        animations.len(),
        skeletons.len()
    );

    Ok(Document {
        header,
        meshes,
        materials,
        textures,
        animations,
        skeletons,
    })
}

fn write_sections<W: Write>(w: &mut W, document: &Document) -> Result<()> {
    for mesh in &document.meshes {
        write_mesh(w, mesh)?;
    }
    for material in &document.materials {
        write_material(w, material)?;
    }
    for texture in &document.textures {
        write_texture(w, texture)?;
    }
    for block in document.animations.iter().chain(&document.skeletons) {
        write_opaque(w, block)?;
    }
    Ok(())
}

/// Decode with the default codec.
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    NaiCodec::new().decode(bytes)
}

/// Encode with the default codec.
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    NaiCodec::new().encode(document)
}
