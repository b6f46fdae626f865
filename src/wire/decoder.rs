//! Frame decoder.
//!
//! Used by the receiver tool and by round-trip tests; the sender side never
//! decodes.

use super::{Result, WireError, ELEMENT_STRIDE};
use crate::core::types::CompactMesh;

/// Decode one complete wire frame back into a compacted mesh.
///
/// `bytes` must span exactly one frame, total length field included. The
/// declared total is validated against the actual byte count, each section
/// length against the remaining bytes, and triangle indices against the
/// decoded vertex count.
pub fn decode(bytes: &[u8]) -> Result<CompactMesh> {
    let mut cursor = Cursor::new(bytes);

    let total = cursor.read_i32()?;
    if total < 0 || total as usize != bytes.len() {
        return Err(WireError::LengthMismatch {
            declared: total as i64,
            actual: bytes.len(),
        });
    }

    let vertex_bytes = cursor.read_section()?;
    let triangle_bytes = cursor.read_section()?;
    let color_bytes = cursor.read_section()?;

    if cursor.remaining() != 0 {
        return Err(WireError::Malformed(format!(
            "{} trailing bytes after color section",
            cursor.remaining()
        )));
    }

    let vertices = read_f32_triples(vertex_bytes);
    let colors = read_f32_triples(color_bytes);
    if colors.len() != vertices.len() {
        return Err(WireError::Malformed(format!(
            "color count {} does not match vertex count {}",
            colors.len(),
            vertices.len()
        )));
    }

    let triangles = read_index_triples(triangle_bytes, vertices.len())?;

    Ok(CompactMesh::from_parts(vertices, triangles, colors))
}

fn read_f32_triples(bytes: &[u8]) -> Vec<[f32; 3]> {
    bytes
        .chunks_exact(ELEMENT_STRIDE)
        .map(|chunk| {
            [
                f32::from_le_bytes(chunk[0..4].try_into().expect("chunk is 12 bytes")),
                f32::from_le_bytes(chunk[4..8].try_into().expect("chunk is 12 bytes")),
                f32::from_le_bytes(chunk[8..12].try_into().expect("chunk is 12 bytes")),
            ]
        })
        .collect()
}

fn read_index_triples(bytes: &[u8], vertex_count: usize) -> Result<Vec<[u32; 3]>> {
    let mut triangles = Vec::with_capacity(bytes.len() / ELEMENT_STRIDE);
    for chunk in bytes.chunks_exact(ELEMENT_STRIDE) {
        let mut tri = [0u32; 3];
        for (k, field) in chunk.chunks_exact(4).enumerate() {
            let index = i32::from_le_bytes(field.try_into().expect("field is 4 bytes"));
            if index < 0 || index as usize >= vertex_count {
                return Err(WireError::Malformed(format!(
                    "triangle index {} out of bounds for {} vertices",
                    index, vertex_count
                )));
            }
            tri[k] = index as u32;
        }
        triangles.push(tri);
    }
    Ok(triangles)
}

/// Byte cursor over one frame.
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn read_i32(&mut self) -> Result<i32> {
        if self.remaining() < 4 {
            return Err(WireError::Truncated {
                needed: self.offset + 4,
                available: self.bytes.len(),
            });
        }
        let value = i32::from_le_bytes(
            self.bytes[self.offset..self.offset + 4]
                .try_into()
                .expect("slice is 4 bytes"),
        );
        self.offset += 4;
        Ok(value)
    }

    /// Read a length-prefixed section, validating the length field.
    fn read_section(&mut self) -> Result<&'a [u8]> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(WireError::Malformed(format!(
                "negative section length {}",
                len
            )));
        }
        let len = len as usize;
        if len % ELEMENT_STRIDE != 0 {
            return Err(WireError::Malformed(format!(
                "section length {} is not a multiple of {}",
                len, ELEMENT_STRIDE
            )));
        }
        if self.remaining() < len {
            return Err(WireError::Truncated {
                needed: self.offset + len,
                available: self.bytes.len(),
            });
        }
        let section = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(section)
    }
}
