//! NAI: binary container for 3D scene assets
//!
//! Reads and writes `.nai` streams holding meshes, materials, textures and
//! opaque animation and skeleton blocks. The 36-byte header is the only
//! schema: its layout choices, vertex attribute set and material value set
//! decide the length of every section that follows.
//!
//! # Modules
//!
//! - [`layout`] - Size rules (attribute widths, index widths, texture `format_size`)
//! - [`formats`] - Header and section wire formats
//! - [`document`] - Decoded document model
//! - [`stream`] - Stream assembler ([`NaiCodec`])
//! - [`compression`] - Payload compression seam (zlib by default)
//! - [`config`] - Codec configuration from TOML
//!
//! # Example
//!
//! ```
//! use nai::{CodecConfig, Document, Indices, Mesh, VertexLayout, VertexStream, pack_vertices};
//! use glam::{Vec2, Vec3};
//!
//! let config = CodecConfig::default();
//! let mut doc = Document::new(config.header()?);
//!
//! let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
//! let normals = [Vec3::Z; 3];
//! let uvs = [Vec2::ZERO, Vec2::X, Vec2::Y];
//! let (vertices, vert_count) = pack_vertices(
//!     VertexLayout::Interleaved,
//!     &doc.header.vertex_attributes,
//!     &[
//!         VertexStream::Vec3(&positions),
//!         VertexStream::Vec3(&normals),
//!         VertexStream::Vec2(&uvs),
//!     ],
//! )?;
//! doc.meshes.push(Mesh {
//!     material: None,
//!     vert_count,
//!     vertices,
//!     indices: Indices::U16(vec![0, 1, 2]),
//! });
//! doc.refresh_counts()?;
//!
//! let codec = config.codec();
//! let bytes = codec.encode(&doc)?;
//! assert_eq!(codec.decode(&bytes)?.document, doc);
//! # Ok::<(), nai::NaiError>(())
//! ```

pub mod compression;
pub mod config;
pub mod document;
pub mod error;
pub mod formats;
pub mod layout;
pub mod reader;
pub mod slots;
pub mod stream;

pub use compression::{Compressor, Zlib};
pub use config::CodecConfig;
pub use document::{Decoded, Document, TrailingData};
pub use error::{NaiError, Result, Section};
pub use formats::{
    Compression, Header, Indices, LayoutMode, Material, MaterialValue, Mesh, NAI_MAGIC,
    NAI_VERSION_MAJOR, NAI_VERSION_MINOR, NO_MATERIAL, OpaqueBlock, SectionCounts, Texture,
    TextureKind, TexturePayload, Version, external_texture_path,
};
pub use layout::{
    AttributeSet, IndexSize, MaterialValueKind, TextureFormat, TextureStorage, ValueSet,
    VertexAttribute, VertexLayout, VertexStream, format_size, pack_vertices, relayout_vertices,
};
pub use slots::{MAX_SLOTS, SlotKind, SlotSet};
pub use stream::{NaiCodec, decode, encode};
