//! Sample scene shared by the integration tests

#![allow(dead_code)]

use glam::{Vec2, Vec3, Vec4};
use nai::{
    AttributeSet, Compression, Document, Header, Indices, LayoutMode, Material, MaterialValue,
    MaterialValueKind, Mesh, OpaqueBlock, Texture, TextureFormat, TextureKind, TexturePayload,
    TextureStorage, ValueSet, VertexAttribute, VertexLayout, VertexStream, format_size,
    pack_vertices,
};

pub const ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute::Position,
    VertexAttribute::Normal,
    VertexAttribute::Uv,
    VertexAttribute::ColourRgba,
];

pub const VALUES: [MaterialValueKind; 6] = [
    MaterialValueKind::Name,
    MaterialValueKind::TwoSided,
    MaterialValueKind::BaseColour,
    MaterialValueKind::MetallicFactor,
    MaterialValueKind::RoughnessFactor,
    MaterialValueKind::EmissiveColour,
];

pub fn header(vertices: VertexLayout, textures: TextureStorage, compression: Compression) -> Header {
    Header {
        layout: LayoutMode { vertices, textures },
        vertex_attributes: AttributeSet::from_kinds(&ATTRIBUTES).unwrap(),
        material_values: ValueSet::from_kinds(&VALUES).unwrap(),
        compression,
        ..Default::default()
    }
}

/// Quad of two triangles
fn quad(layout: VertexLayout, attributes: &AttributeSet, material: Option<u16>) -> Mesh {
    let positions = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    ];
    let normals = [Vec3::Z; 4];
    let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
    let colours = [Vec4::ONE, Vec4::X, Vec4::Y, Vec4::Z];

    let (vertices, vert_count) = match layout {
        VertexLayout::None => (Vec::new(), 4),
        _ => pack_vertices(
            layout,
            attributes,
            &[
                VertexStream::Vec3(&positions),
                VertexStream::Vec3(&normals),
                VertexStream::Vec2(&uvs),
                VertexStream::Vec4(&colours),
            ],
        )
        .unwrap(),
    };

    Mesh {
        material,
        vert_count,
        vertices,
        indices: Indices::U16(vec![0, 1, 2, 0, 2, 3]),
    }
}

fn material(name: &str, textures: Vec<u16>) -> Material {
    Material {
        values: vec![
            (MaterialValueKind::Name, MaterialValue::Name(name.to_string())),
            (MaterialValueKind::TwoSided, MaterialValue::TwoSided(false)),
            (
                MaterialValueKind::BaseColour,
                MaterialValue::Colour(Vec4::new(0.8, 0.7, 0.6, 1.0)),
            ),
            (MaterialValueKind::MetallicFactor, MaterialValue::Factor(0.0)),
            (MaterialValueKind::RoughnessFactor, MaterialValue::Factor(0.9)),
            (
                MaterialValueKind::EmissiveColour,
                MaterialValue::Colour(Vec4::new(0.0, 0.0, 0.0, 1.0)),
            ),
        ],
        textures,
    }
}

fn texture(storage: TextureStorage, kind: TextureKind, format: TextureFormat, w: u16, h: u16) -> Texture {
    let payload = match storage {
        TextureStorage::Internal => TexturePayload::Embedded(
            (0..format_size(format, w, h)).map(|i| (i * 7) as u8).collect(),
        ),
        TextureStorage::External => TexturePayload::External,
        TextureStorage::None => TexturePayload::Omitted,
    };
    Texture {
        kind,
        format,
        width: w,
        height: h,
        payload,
    }
}

/// Two meshes, two materials, three textures, one animation, two skeletons.
pub fn document(vertices: VertexLayout, textures: TextureStorage, compression: Compression) -> Document {
    let mut doc = Document::new(header(vertices, textures, compression));
    let attributes = doc.header.vertex_attributes.clone();

    doc.meshes = vec![
        quad(vertices, &attributes, Some(1)),
        quad(vertices, &attributes, None),
    ];
    doc.materials = vec![material("floor", vec![0, 1]), material("trim", vec![2])];
    doc.textures = vec![
        texture(textures, TextureKind::Diffuse, TextureFormat::Bc1, 8, 8),
        texture(textures, TextureKind::Normals, TextureFormat::Rgba, 3, 2),
        texture(textures, TextureKind::Emissive, TextureFormat::Astc4x4, 5, 5),
    ];
    doc.animations = vec![OpaqueBlock::new(b"walk-cycle".to_vec())];
    doc.skeletons = vec![OpaqueBlock::new(vec![1, 2, 3, 4]), OpaqueBlock::default()];
    doc.refresh_counts().unwrap();
    doc
}
