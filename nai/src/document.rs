//! In-memory NAI document

use std::path::{Path, PathBuf};

use crate::error::{NaiError, Result};
use crate::formats::{
    Header, Material, Mesh, OpaqueBlock, SectionCounts, Texture, TextureKind,
    external_texture_path,
};
use crate::layout::TextureStorage;

/// A decoded NAI container
///
/// The header's section counts must equal the section list lengths;
/// [`Document::refresh_counts`] sets them from the lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub header: Header,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub animations: Vec<OpaqueBlock>,
    pub skeletons: Vec<OpaqueBlock>,
}

impl Document {
    /// Empty document using `header`'s layout, slot sets and compression.
    /// Counts are reset to zero.
    pub fn new(header: Header) -> Self {
        Self {
            header: Header {
                counts: SectionCounts::default(),
                ..header
            },
            ..Default::default()
        }
    }

    /// Set the header counts from the section lists.
    pub fn refresh_counts(&mut self) -> Result<()> {
        fn count(name: &str, len: usize) -> Result<u16> {
            u16::try_from(len).map_err(|_| {
                NaiError::invalid(format!("{} {} exceed the u16 count field", len, name))
            })
        }

        self.header.counts = SectionCounts {
            meshes: count("meshes", self.meshes.len())?,
            materials: count("materials", self.materials.len())?,
            textures: count("textures", self.textures.len())?,
            animations: count("animations", self.animations.len())?,
            skeletons: count("skeletons", self.skeletons.len())?,
        };
        Ok(())
    }

    /// Check every encode-time invariant without writing anything.
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;

        let counts = &self.header.counts;
        for (name, declared, len) in [
            ("mesh", counts.meshes, self.meshes.len()),
            ("material", counts.materials, self.materials.len()),
            ("texture", counts.textures, self.textures.len()),
            ("animation", counts.animations, self.animations.len()),
            ("skeleton", counts.skeletons, self.skeletons.len()),
        ] {
            if declared as usize != len {
                return Err(NaiError::invalid(format!(
                    "header declares {} {} sections, document holds {}",
                    declared, name, len
                )));
            }
        }

        for mesh in &self.meshes {
            mesh.validate(&self.header)?;
        }
        for material in &self.materials {
            material.validate(&self.header)?;
        }
        for texture in &self.textures {
            texture.validate(&self.header)?;
        }
        if self.header.layout.textures == TextureStorage::External {
            // Siblings are named by kind
            for (i, texture) in self.textures.iter().enumerate() {
                if self.textures[..i].iter().any(|t| t.kind == texture.kind) {
                    return Err(NaiError::invalid(format!(
                        "texture {} repeats kind {:?}, external siblings would collide",
                        i, texture.kind
                    )));
                }
            }
        }
        for block in self.animations.iter().chain(&self.skeletons) {
            block.validate()?;
        }
        Ok(())
    }

    /// Sibling files holding texture payloads when storage is external, one
    /// entry per texture in order. Empty for other storage modes.
    ///
    /// Paths are distinct for any document that passes [`Document::validate`],
    /// which rejects repeated kinds under external storage.
    pub fn external_textures(&self, output: &Path, extension: &str) -> Vec<(TextureKind, PathBuf)> {
        if self.header.layout.textures != TextureStorage::External {
            return Vec::new();
        }
        self.textures
            .iter()
            .map(|t| (t.kind, external_texture_path(output, t.kind, extension)))
            .collect()
    }
}

/// Bytes left over after the last declared section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingData {
    /// Offset of the first unread byte: in the inflated payload when the
    /// sections left it unfinished, otherwise in the outer stream
    pub offset: usize,
    pub len: usize,
}

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub document: Document,
    pub trailing: Option<TrailingData>,
}

impl Decoded {
    pub fn into_document(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{Indices, LayoutMode, TexturePayload};
    use crate::layout::{TextureFormat, VertexLayout};

    fn external_header() -> Header {
        Header {
            layout: LayoutMode {
                vertices: VertexLayout::None,
                textures: TextureStorage::External,
            },
            ..Default::default()
        }
    }

    fn external(kind: TextureKind) -> Texture {
        Texture {
            kind,
            format: TextureFormat::Bc7,
            width: 64,
            height: 64,
            payload: TexturePayload::External,
        }
    }

    #[test]
    fn test_new_resets_counts() {
        let mut header = external_header();
        header.counts.meshes = 4;
        let doc = Document::new(header);
        assert_eq!(doc.header.counts, SectionCounts::default());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let mut doc = Document::new(external_header());
        doc.meshes.push(Mesh {
            indices: Indices::U8(vec![0, 1, 2]),
            vert_count: 3,
            ..Default::default()
        });
        assert!(matches!(doc.validate(), Err(NaiError::InvalidArgument(_))));
        doc.refresh_counts().unwrap();
        assert_eq!(doc.header.counts.meshes, 1);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_too_many_sections() {
        let mut doc = Document::new(external_header());
        doc.animations = vec![OpaqueBlock::default(); u16::MAX as usize + 1];
        assert!(doc.refresh_counts().is_err());
    }

    #[test]
    fn test_external_textures() {
        let mut doc = Document::new(external_header());
        doc.textures = vec![external(TextureKind::Diffuse), external(TextureKind::Normals)];
        let siblings = doc.external_textures(Path::new("build/model.nai"), "dds");
        assert_eq!(
            siblings,
            vec![
                (TextureKind::Diffuse, PathBuf::from("build/model-diffuse.dds")),
                (TextureKind::Normals, PathBuf::from("build/model-normals.dds")),
            ]
        );

        doc.header.layout.textures = TextureStorage::Internal;
        assert!(doc.external_textures(Path::new("model.nai"), "dds").is_empty());
    }

    #[test]
    fn test_repeated_external_kind_rejected() {
        let mut doc = Document::new(external_header());
        doc.textures = vec![
            external(TextureKind::Diffuse),
            external(TextureKind::Normals),
            external(TextureKind::Diffuse),
        ];
        doc.refresh_counts().unwrap();
        assert!(matches!(doc.validate(), Err(NaiError::InvalidArgument(_))));

        doc.textures[2].kind = TextureKind::Emissive;
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_repeated_kind_allowed_inline() {
        let mut doc = Document::new(Header {
            layout: LayoutMode {
                vertices: VertexLayout::None,
                textures: TextureStorage::None,
            },
            ..Default::default()
        });
        let omitted = |kind| Texture {
            payload: TexturePayload::Omitted,
            ..external(kind)
        };
        doc.textures = vec![omitted(TextureKind::Diffuse), omitted(TextureKind::Diffuse)];
        doc.refresh_counts().unwrap();
        assert!(doc.validate().is_ok());
    }
}
