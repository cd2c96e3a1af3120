//! End-to-end encode/decode tests over every layout combination

mod scene;

use std::path::Path;

use nai::{
    Compression, NaiCodec, NaiError, TextureKind, TextureStorage, Version, VertexAttribute,
    VertexLayout, decode, encode, relayout_vertices,
};

const VERTEX_LAYOUTS: [VertexLayout; 3] = [
    VertexLayout::None,
    VertexLayout::Interleaved,
    VertexLayout::Separated,
];

const TEXTURE_STORAGE: [TextureStorage; 3] = [
    TextureStorage::None,
    TextureStorage::Internal,
    TextureStorage::External,
];

#[test]
fn test_every_layout_roundtrips() {
    for vertices in VERTEX_LAYOUTS {
        for textures in TEXTURE_STORAGE {
            for compression in [Compression::None, Compression::Zlib] {
                let doc = scene::document(vertices, textures, compression);
                let bytes = encode(&doc).unwrap();
                let decoded = decode(&bytes).unwrap();
                assert_eq!(
                    decoded.document, doc,
                    "{:?} / {:?} / {:?}",
                    vertices, textures, compression
                );
                assert_eq!(decoded.trailing, None);
            }
        }
    }
}

#[test]
fn test_reencode_is_byte_exact() {
    let doc = scene::document(
        VertexLayout::Separated,
        TextureStorage::Internal,
        Compression::None,
    );
    let bytes = encode(&doc).unwrap();
    let again = encode(&decode(&bytes).unwrap().document).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn test_newer_minor_version_survives_roundtrip() {
    for compression in [Compression::None, Compression::Zlib] {
        let mut doc = scene::document(
            VertexLayout::Interleaved,
            TextureStorage::Internal,
            compression,
        );
        doc.header.version = Version { major: 1, minor: 3 };
        let bytes = encode(&doc).unwrap();
        assert_eq!(&bytes[4..6], &[1, 3]);
        assert_eq!(decode(&bytes).unwrap().document, doc);
    }
}

#[test]
fn test_unreadable_major_version_not_encoded() {
    let mut doc = scene::document(
        VertexLayout::Interleaved,
        TextureStorage::Internal,
        Compression::None,
    );
    doc.header.version = Version { major: 2, minor: 0 };
    assert!(matches!(encode(&doc), Err(NaiError::InvalidArgument(_))));
}

#[test]
fn test_uncompressed_size_is_sum_of_sections() {
    let doc = scene::document(
        VertexLayout::Interleaved,
        TextureStorage::Internal,
        Compression::None,
    );
    // pos 3 + normal 3 + uv 2 + rgba 4 = 12 floats per vertex
    let mesh = 12 + 4 * 12 * 4 + 6 * 2;
    let name_floor = 2 + "floor".len();
    let name_trim = 2 + "trim".len();
    // two_sided 1 + 2 colours 32 + 2 factors 8
    let values = 1 + 32 + 8;
    let materials = (4 + name_floor + values + 2 * 2) + (4 + name_trim + values + 2);
    // BC1 8x8 = 32, RGBA 3x2 = 24, ASTC 5x5 = 64
    let textures = (8 + 32) + (8 + 24) + (8 + 64);
    let opaque = (4 + 10) + (4 + 4) + 4;

    let bytes = encode(&doc).unwrap();
    assert_eq!(bytes.len(), 36 + 2 * mesh + materials + textures + opaque);
}

#[test]
fn test_zlib_shrinks_and_restores() {
    let plain = scene::document(
        VertexLayout::Interleaved,
        TextureStorage::Internal,
        Compression::None,
    );
    let mut packed = plain.clone();
    packed.header.compression = Compression::Zlib;

    let plain_bytes = encode(&plain).unwrap();
    let packed_bytes = encode(&packed).unwrap();
    assert!(packed_bytes.len() < plain_bytes.len());
    // Recorded length is the uncompressed payload
    assert_eq!(
        &packed_bytes[36..40],
        &((plain_bytes.len() - 36) as u32).to_le_bytes()
    );
    assert_eq!(decode(&packed_bytes).unwrap().document, packed);
}

#[test]
fn test_layouts_hold_same_vertices() {
    let interleaved = scene::document(
        VertexLayout::Interleaved,
        TextureStorage::None,
        Compression::None,
    );
    let separated = scene::document(
        VertexLayout::Separated,
        TextureStorage::None,
        Compression::None,
    );
    let header_i = &interleaved.header;
    let header_s = &separated.header;
    let mesh_i = &interleaved.meshes[0];
    let mesh_s = &separated.meshes[0];

    for vertex in 0..mesh_i.vert_count {
        for kind in scene::ATTRIBUTES {
            assert_eq!(
                mesh_i.attribute(header_i, kind, vertex),
                mesh_s.attribute(header_s, kind, vertex)
            );
        }
    }
    assert_eq!(
        mesh_s.attribute(header_s, VertexAttribute::Uv, 2),
        Some(&[1.0, 1.0][..])
    );

    let converted = relayout_vertices(
        &mesh_i.vertices,
        &header_i.vertex_attributes,
        mesh_i.vert_count,
        VertexLayout::Interleaved,
        VertexLayout::Separated,
    )
    .unwrap();
    assert_eq!(converted, mesh_s.vertices);
}

#[test]
fn test_external_siblings() {
    let doc = scene::document(
        VertexLayout::Interleaved,
        TextureStorage::External,
        Compression::None,
    );
    let siblings = doc.external_textures(Path::new("out/level.nai"), "dds");
    let names: Vec<_> = siblings
        .iter()
        .map(|(kind, path)| (*kind, path.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(
        names,
        vec![
            (TextureKind::Diffuse, "out/level-diffuse.dds".to_string()),
            (TextureKind::Normals, "out/level-normals.dds".to_string()),
            (TextureKind::Emissive, "out/level-emissive.dds".to_string()),
        ]
    );

    // Only the 8-byte prefixes stay inline
    let internal = scene::document(
        VertexLayout::Interleaved,
        TextureStorage::Internal,
        Compression::None,
    );
    let diff = encode(&internal).unwrap().len() - encode(&doc).unwrap().len();
    assert_eq!(diff, 32 + 24 + 64);
}

#[test]
fn test_encode_to_writer() {
    let doc = scene::document(
        VertexLayout::Separated,
        TextureStorage::Internal,
        Compression::Zlib,
    );
    let codec = NaiCodec::new();
    let mut out = Vec::new();
    codec.encode_to(&doc, &mut out).unwrap();
    assert_eq!(out, codec.encode(&doc).unwrap());
}
