//! Binary wire protocol for streaming compacted meshes.
//!
//! One frame carries one compacted mesh. All integers are 4-byte signed,
//! little-endian; the leading total length makes frames self-delimiting so
//! a receiver reads 4 bytes, then exactly `total - 4` more.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────┬──────┬────────────────┬──────┬────────────────┬──────┬────────────────┐
//! │ total (i32)  │ Lv   │ Lv bytes       │ Lt   │ Lt bytes       │ Lc   │ Lc bytes       │
//! │ = 16+Lv+Lt+Lc│ i32  │ f32 xyz        │ i32  │ i32 indices    │ i32  │ f32 rgb        │
//! └──────────────┴──────┴────────────────┴──────┴────────────────┴──────┴────────────────┘
//! ```
//!
//! Frames are written back-to-back on the stream with no other delimiter.

mod decoder;
mod encoder;

pub use decoder::decode;
pub use encoder::encode;

use thiserror::Error;

/// Fixed per-frame overhead: the total length field plus three section
/// length fields, 4 bytes each.
pub const FRAME_OVERHEAD: usize = 16;

/// Byte width of one vertex, one triangle, or one color: three 4-byte
/// elements.
pub const ELEMENT_STRIDE: usize = 12;

/// Wire protocol errors.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("section of {len} bytes exceeds the 32-bit length field")]
    Oversize { len: usize },

    #[error("frame truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("total length field {declared} does not match frame size {actual}")]
    LengthMismatch { declared: i64, actual: usize },

    #[error("malformed frame: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, WireError>;

/// One encoded mesh frame, ready for transmission.
///
/// Immutable once built; ownership moves into the delivery queue and then
/// to the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct WireFrame {
    bytes: Vec<u8>,
}

impl WireFrame {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Frame contents, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// A frame is never smaller than `FRAME_OVERHEAD`, so this is always
    /// false for encoder output.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the frame, yielding the underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
