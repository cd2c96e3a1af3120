//! NAI wire formats
//!
//! The container is a fixed 36-byte header followed by counted sections in
//! a fixed order: meshes, materials, textures, animations, skeletons. Each
//! section starts with a small POD prefix whose fields, together with the
//! header's layout choices and slot sets, determine the length of what
//! follows. Nothing in the stream records section offsets.

pub mod header;
pub mod material;
pub mod mesh;
pub mod opaque;
pub mod texture;

pub use header::*;
pub use material::*;
pub use mesh::*;
pub use opaque::*;
pub use texture::*;
