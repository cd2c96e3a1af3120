//! Codec configuration (nai.toml)
//!
//! Chooses the layout, slot sets and compression the encoder writes, and how
//! strict the decoder is. Every field has a default, so an empty file is a
//! valid configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compression::DEFAULT_LEVEL;
use crate::document::Document;
use crate::formats::{Compression, DEFAULT_EXTERNAL_EXTENSION, Header, LayoutMode, TextureKind};
use crate::layout::{
    AttributeSet, MaterialValueKind, TextureStorage, ValueSet, VertexAttribute, VertexLayout,
};
use crate::stream::NaiCodec;

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CodecConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub external: ExternalConfig,
}

/// Layout choices and slot sets written to the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub vertices: VertexLayout,
    #[serde(default)]
    pub textures: TextureStorage,
    /// Vertex attributes in buffer order (default: position, normal, uv)
    #[serde(default = "default_vertex_attributes")]
    pub vertex_attributes: Vec<VertexAttribute>,
    /// Material values in payload order
    #[serde(default = "default_material_values")]
    pub material_values: Vec<MaterialValueKind>,
}

/// Payload compression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default)]
    pub kind: Compression,
    /// zlib level (default: 6, range: 0-9)
    #[serde(default = "default_level")]
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecodeConfig {
    /// Fail instead of warning when bytes follow the last section
    #[serde(default)]
    pub reject_trailing_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// Extension of external texture siblings (default: "dds")
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_vertex_attributes() -> Vec<VertexAttribute> {
    vec![
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::Uv,
    ]
}

fn default_material_values() -> Vec<MaterialValueKind> {
    vec![
        MaterialValueKind::Name,
        MaterialValueKind::BaseColour,
        MaterialValueKind::MetallicFactor,
        MaterialValueKind::RoughnessFactor,
    ]
}

fn default_level() -> u32 {
    DEFAULT_LEVEL
}

fn default_extension() -> String {
    DEFAULT_EXTERNAL_EXTENSION.to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertices: VertexLayout::default(),
            textures: TextureStorage::default(),
            vertex_attributes: default_vertex_attributes(),
            material_values: default_material_values(),
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            kind: Compression::None,
            level: default_level(),
        }
    }
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

impl CodecConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse codec config")
    }

    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read codec config: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse codec config: {:?}", path))
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize codec config")
    }

    /// Header template with zero section counts.
    ///
    /// Fails with [`NaiError::InvalidArgument`](crate::NaiError::InvalidArgument)
    /// for duplicate kinds or more than eight of either kind.
    pub fn header(&self) -> crate::Result<Header> {
        Ok(Header {
            layout: LayoutMode {
                vertices: self.layout.vertices,
                textures: self.layout.textures,
            },
            vertex_attributes: AttributeSet::from_kinds(&self.layout.vertex_attributes)?,
            material_values: ValueSet::from_kinds(&self.layout.material_values)?,
            compression: self.compression.kind,
            ..Default::default()
        })
    }

    /// Build a codec for this configuration.
    pub fn codec(&self) -> NaiCodec {
        NaiCodec::from_config(self)
    }

    /// Sibling texture files for `document` written next to `output`, using
    /// the configured extension.
    pub fn external_textures(
        &self,
        document: &Document,
        output: &Path,
    ) -> Vec<(TextureKind, PathBuf)> {
        document.external_textures(output, &self.external.extension)
    }
}
