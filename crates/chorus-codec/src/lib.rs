//! Binary payload format for chorus object state and replicated calls.
//!
//! Serialized object payloads are self-describing: each carries the
//! registered type name of the object it encodes, so a payload can be
//! restored in any context that has the same types registered. Payloads
//! start with a magic/version header and are refused, never guessed at,
//! when the header does not match.
//!
//! # Architecture
//!
//! - [`codec`] holds the primitive readers/writers plus the value and
//!   call encodings
//! - [`ObjectState`] is the decoded form of a serialized object
//! - Replicated calls are encoded headerless; they travel inside
//!   transport frames, not durable payloads
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "CHOR"] [VERSION u8] [name] [params] [children] [internal state]
//! ```
//!
//! All integers are little-endian. Strings and byte arrays are
//! length-prefixed with a `u32`. Each child entry is the child's object
//! ID followed by its complete nested payload, header included.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod state;

pub use error::CodecError;
pub use state::{decode_state, encode_state, ObjectState};

/// Magic bytes at the start of every serialized object payload.
pub const MAGIC: [u8; 4] = *b"CHOR";

/// Current binary format version.
///
/// History:
/// - v1: initial format
pub const FORMAT_VERSION: u8 = 1;
