//! Mesh compaction.
//!
//! Volumetric mesh extraction over-allocates its vertex buffer, so the raw
//! mesh carries vertices no triangle references. Compaction keeps only the
//! referenced vertices (in ascending original-index order), gathers colors
//! by the same permutation, and remaps every triangle index to its rank in
//! the referenced set.
//!
//! This is index deduplication, not geometric deduplication: vertices with
//! identical positions are never merged. Compaction is idempotent.

use crate::core::types::{CompactMesh, RawMesh};

/// Compact a raw mesh down to its triangle-referenced vertices.
///
/// A mesh with no triangles compacts to an empty mesh even when the vertex
/// buffer is non-empty. Triangle count and winding are preserved exactly;
/// only vertex indices change.
pub fn compact(mesh: &RawMesh) -> CompactMesh {
    let mut referenced: Vec<u32> = Vec::with_capacity(mesh.triangles.len() * 3);
    for tri in &mesh.triangles {
        referenced.extend_from_slice(tri);
    }
    referenced.sort_unstable();
    referenced.dedup();

    let vertices: Vec<[f32; 3]> = referenced
        .iter()
        .map(|&i| mesh.vertices[i as usize])
        .collect();
    let colors: Vec<[f32; 3]> = referenced
        .iter()
        .map(|&i| mesh.colors[i as usize])
        .collect();

    let triangles: Vec<[u32; 3]> = mesh
        .triangles
        .iter()
        .map(|tri| [rank(&referenced, tri[0]), rank(&referenced, tri[1]), rank(&referenced, tri[2])])
        .collect();

    CompactMesh::from_parts(vertices, triangles, colors)
}

/// Position of `index` within the sorted referenced set.
///
/// Every triangle index is present in `referenced` by construction.
fn rank(referenced: &[u32], index: u32) -> u32 {
    referenced
        .binary_search(&index)
        .expect("triangle index absent from referenced set") as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mesh() -> RawMesh {
        RawMesh {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [9.0, 9.0, 9.0],
                [0.0, 0.0, 1.0],
            ],
            triangles: vec![[0, 1, 2], [0, 2, 4]],
            colors: vec![[1.0, 0.0, 0.0]; 5],
        }
    }

    #[test]
    fn test_compact_drops_unreferenced_vertex() {
        let compacted = compact(&sample_mesh());

        assert_eq!(
            compacted.vertices(),
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ]
        );
        assert_eq!(compacted.triangles(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(compacted.colors().len(), 4);
    }

    #[test]
    fn test_compact_preserves_connectivity() {
        let mesh = sample_mesh();
        let compacted = compact(&mesh);

        assert_eq!(compacted.triangle_count(), mesh.triangle_count());
        for (orig, remapped) in mesh.triangles.iter().zip(compacted.triangles()) {
            for k in 0..3 {
                assert_eq!(
                    mesh.vertices[orig[k] as usize],
                    compacted.vertices()[remapped[k] as usize]
                );
                assert_eq!(
                    mesh.colors[orig[k] as usize],
                    compacted.colors()[remapped[k] as usize]
                );
            }
        }
    }

    #[test]
    fn test_compact_vertex_count_is_distinct_reference_count() {
        let mesh = RawMesh {
            vertices: vec![[0.0; 3]; 5],
            triangles: vec![[0, 1, 2]],
            colors: vec![[0.0; 3]; 5],
        };

        let compacted = compact(&mesh);
        assert_eq!(compacted.vertex_count(), 3);
        assert_eq!(compacted.colors().len(), 3);
        assert_eq!(compacted.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_compact_is_idempotent() {
        let once = compact(&sample_mesh());
        let twice = compact(&once.clone().into_raw());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_compact_no_triangles_yields_empty_mesh() {
        let mesh = RawMesh {
            vertices: vec![[1.0, 2.0, 3.0]; 4],
            triangles: vec![],
            colors: vec![[0.5, 0.5, 0.5]; 4],
        };

        let compacted = compact(&mesh);
        assert!(compacted.is_empty());
        assert_eq!(compacted.colors().len(), 0);
    }

    #[test]
    fn test_compact_duplicate_positions_not_merged() {
        // Two vertices share a position but both are referenced; index
        // deduplication must keep both.
        let mesh = RawMesh {
            vertices: vec![[0.0; 3], [0.0; 3], [1.0, 0.0, 0.0]],
            triangles: vec![[0, 1, 2]],
            colors: vec![[0.0; 3]; 3],
        };

        let compacted = compact(&mesh);
        assert_eq!(compacted.vertex_count(), 3);
    }
}
