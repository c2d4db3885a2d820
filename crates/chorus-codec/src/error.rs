//! Error types for the payload codec.

use std::fmt;
use std::io;

/// Errors that can occur while encoding or decoding payloads.
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The payload does not start with the expected `b"CHOR"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the payload.
        found: u8,
    },
    /// The payload could not be decoded (truncated or corrupt data).
    MalformedPayload {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A value type tag is not recognized.
    UnknownValueTag {
        /// The unrecognized tag.
        tag: u8,
    },
    /// A replicated-call type tag is not recognized.
    UnknownCallTag {
        /// The unrecognized tag.
        tag: u8,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"CHOR\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedPayload { detail } => write!(f, "malformed payload: {detail}"),
            Self::UnknownValueTag { tag } => write!(f, "unknown value tag {tag}"),
            Self::UnknownCallTag { tag } => write!(f, "unknown call tag {tag}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
