//! Mesh and frame types.
//!
//! `RawMesh` is what the reconstruction engine hands back; it may carry
//! vertices that no triangle references. `CompactMesh` is the deduplicated
//! form produced by `mesh::compact` (or `wire::decode`) and is the only
//! shape the wire encoder accepts.

/// Triangle mesh as extracted from the reconstruction engine.
///
/// Invariants: `colors.len() == vertices.len()`; every triangle index is in
/// `[0, vertices.len())`. The mesh is created once per extraction cycle and
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMesh {
    /// Vertex positions (xyz).
    pub vertices: Vec<[f32; 3]>,
    /// Vertex indices, three per triangle.
    pub triangles: Vec<[u32; 3]>,
    /// Per-vertex RGB colors, aligned with `vertices`.
    pub colors: Vec<[f32; 3]>,
}

impl RawMesh {
    /// Create an empty mesh.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if the mesh has no vertices and no triangles.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }
}

/// Triangle mesh containing only triangle-referenced vertices.
///
/// Produced by `mesh::compact` or `wire::decode`; there is no public
/// constructor. Vertices keep the ascending order of their original
/// indices, and triangle connectivity is preserved exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactMesh {
    vertices: Vec<[f32; 3]>,
    triangles: Vec<[u32; 3]>,
    colors: Vec<[f32; 3]>,
}

impl CompactMesh {
    pub(crate) fn from_parts(
        vertices: Vec<[f32; 3]>,
        triangles: Vec<[u32; 3]>,
        colors: Vec<[f32; 3]>,
    ) -> Self {
        debug_assert_eq!(vertices.len(), colors.len());
        Self {
            vertices,
            triangles,
            colors,
        }
    }

    /// Vertex positions (xyz).
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Vertex indices, three per triangle.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Per-vertex RGB colors, aligned with `vertices()`.
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if the mesh has no vertices and no triangles.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Convert back into the `RawMesh` shape.
    pub fn into_raw(self) -> RawMesh {
        RawMesh {
            vertices: self.vertices,
            triangles: self.triangles,
            colors: self.colors,
        }
    }
}

/// One RGB-D frame read from a dataset directory.
///
/// Image bytes are kept opaque; decoding them is the reconstruction
/// engine's concern.
#[derive(Debug, Clone)]
pub struct RgbdFrame {
    /// Zero-based frame index within its dataset.
    pub index: usize,
    /// Raw depth image file contents.
    pub depth: Vec<u8>,
    /// Raw color image file contents.
    pub color: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_raw_mesh() {
        let mesh = RawMesh::empty();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_compact_mesh_into_raw() {
        let compact = CompactMesh::from_parts(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
            vec![[1.0, 0.0, 0.0]; 3],
        );

        let raw = compact.into_raw();
        assert_eq!(raw.vertex_count(), 3);
        assert_eq!(raw.triangles, vec![[0, 1, 2]]);
    }
}
