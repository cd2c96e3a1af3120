//! Error types for NAI decoding and encoding

use std::fmt;

/// Section of the stream a read was positioned in when it ran out of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Payload,
    Mesh(u16),
    Material(u16),
    Texture(u16),
    Animation(u16),
    Skeleton(u16),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Header => write!(f, "header"),
            Section::Payload => write!(f, "payload"),
            Section::Mesh(i) => write!(f, "mesh {}", i),
            Section::Material(i) => write!(f, "material {}", i),
            Section::Texture(i) => write!(f, "texture {}", i),
            Section::Animation(i) => write!(f, "animation {}", i),
            Section::Skeleton(i) => write!(f, "skeleton {}", i),
        }
    }
}

/// Errors that can occur when reading or writing an NAI stream
#[derive(Debug, thiserror::Error)]
pub enum NaiError {
    /// Structurally invalid stream: bad magic, unknown enumerant, non-zero
    /// reserved field, duplicate or out-of-order slot, dangling reference.
    #[error("{context}: {message}")]
    Format {
        context: &'static str,
        message: String,
    },

    #[error("unsupported NAI version {major}.{minor} (supported major version: {supported})")]
    UnsupportedVersion { major: u8, minor: u8, supported: u8 },

    #[error("unexpected end of data in {section} at offset {offset:#x} (need {need} bytes, have {have})")]
    Truncated {
        section: Section,
        offset: usize,
        need: usize,
        have: usize,
    },

    /// Only produced when strict decoding is requested; the default decoder
    /// reports trailing bytes through `Decoded::trailing`.
    #[error("{len} trailing bytes after the last section at offset {offset:#x}")]
    TrailingData { offset: usize, len: usize },

    #[error("compression error: {0}")]
    Compression(String),

    /// Caller-supplied document violates an encode-time invariant
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NaiError {
    pub(crate) fn format(context: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, NaiError>;
