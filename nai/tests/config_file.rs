//! Codec configuration loaded from disk

mod scene;

use std::fs;

use nai::{
    CodecConfig, Compression, Compressor, Document, Header, NaiError, TextureStorage, VertexLayout,
    Zlib, encode,
};
use tempfile::tempdir;

#[test]
fn test_load_config_and_encode() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nai.toml");
    fs::write(
        &path,
        r#"
[layout]
vertices = "separated"
textures = "internal"
vertex_attributes = ["position", "normal", "uv", "colour_rgba"]
material_values = ["name", "two_sided", "base_colour", "metallic_factor", "roughness_factor", "emissive_colour"]

[compression]
kind = "zlib"
level = 9

[decode]
reject_trailing_data = true
"#,
    )
    .expect("Failed to write config");

    let config = CodecConfig::load(&path).unwrap();
    let header = config.header().unwrap();
    assert_eq!(
        header,
        scene::header(
            VertexLayout::Separated,
            TextureStorage::Internal,
            Compression::Zlib
        )
    );

    let doc = scene::document(
        VertexLayout::Separated,
        TextureStorage::Internal,
        Compression::Zlib,
    );
    let codec = config.codec();
    let bytes = codec.encode(&doc).unwrap();
    assert_eq!(codec.decode(&bytes).unwrap().document, doc);

    // Inflated payload with one byte past the last section
    let plain = Document {
        header: Header {
            compression: Compression::None,
            ..doc.header.clone()
        },
        ..doc.clone()
    };
    let mut payload = encode(&plain).unwrap()[36..].to_vec();
    payload.push(0);
    let mut bytes = doc.header.to_bytes().to_vec();
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend(Zlib::default().compress(&payload).unwrap());

    assert!(matches!(
        codec.decode(&bytes),
        Err(NaiError::TrailingData { len: 1, .. })
    ));
}

#[test]
fn test_missing_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = CodecConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read codec config"));
}

#[test]
fn test_saved_config_reloads() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nai.toml");
    let mut config = CodecConfig::default();
    config.layout.textures = TextureStorage::External;
    config.external.extension = "ktx2".to_string();
    fs::write(&path, config.to_toml_string().unwrap()).expect("Failed to write config");

    assert_eq!(CodecConfig::load(&path).unwrap(), config);
}
