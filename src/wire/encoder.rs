//! Frame encoder.

use super::{Result, WireError, WireFrame, ELEMENT_STRIDE, FRAME_OVERHEAD};
use crate::core::types::CompactMesh;

/// Encode a compacted mesh into a single contiguous wire frame.
///
/// Deterministic: identical meshes always produce identical frames. Fails
/// only when a section (or the whole frame) would not fit the 32-bit
/// signed length field.
pub fn encode(mesh: &CompactMesh) -> Result<WireFrame> {
    let lv = section_len(mesh.vertex_count())?;
    let lt = section_len(mesh.triangle_count())?;
    let lc = section_len(mesh.colors().len())?;

    let total = FRAME_OVERHEAD + lv + lt + lc;
    if total > i32::MAX as usize {
        return Err(WireError::Oversize { len: total });
    }

    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(&(total as i32).to_le_bytes());

    bytes.extend_from_slice(&(lv as i32).to_le_bytes());
    for vertex in mesh.vertices() {
        for coord in vertex {
            bytes.extend_from_slice(&coord.to_le_bytes());
        }
    }

    bytes.extend_from_slice(&(lt as i32).to_le_bytes());
    for tri in mesh.triangles() {
        for &index in tri {
            bytes.extend_from_slice(&(index as i32).to_le_bytes());
        }
    }

    bytes.extend_from_slice(&(lc as i32).to_le_bytes());
    for color in mesh.colors() {
        for channel in color {
            bytes.extend_from_slice(&channel.to_le_bytes());
        }
    }

    Ok(WireFrame::from_bytes(bytes))
}

/// Byte length of a section holding `count` three-element entries, bounded
/// by the representable range of the length field.
fn section_len(count: usize) -> Result<usize> {
    let len = count
        .checked_mul(ELEMENT_STRIDE)
        .ok_or(WireError::Oversize { len: usize::MAX })?;
    if len > i32::MAX as usize {
        return Err(WireError::Oversize { len });
    }
    Ok(len)
}
