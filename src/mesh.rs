use crate::{cell_octree::OctreeNode, contour_octree::generate_mesh_from_octree};
use glam::DVec3;

pub type MeshVertexId = u32;
pub const NULL_MESH_VERTEX_ID: MeshVertexId = MeshVertexId::MAX;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: DVec3,
    pub normal: DVec3,
}

/// Indexed triangle mesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    /// Triangle list; every 3 consecutive indices form a triangle.
    pub indices: Vec<MeshVertexId>,
}

impl Mesh {
    /// Assigns vertex indices in the octree and contours it.
    pub fn from_octree(root: Option<&mut OctreeNode>) -> Self {
        generate_mesh_from_octree(root)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn normals(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.vertices.iter().map(|v| v.normal)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [MeshVertexId; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Repair normals for vertices on sharp edges.
    ///
    /// This may add vertices to the mesh in order to allow multiple normals at
    /// the same position.
    pub fn repair_sharp_normals(&mut self, normal_similarity_threshold: f64) {
        let Self { vertices, indices } = self;
        for t in indices.chunks_exact_mut(3) {
            let mut tri = [t[0], t[1], t[2]];
            let v = tri.map(|i| vertices[i as usize]);

            let tri_normal = (v[1].position - v[0].position)
                .cross(v[2].position - v[0].position)
                .normalize_or_zero();
            if tri_normal == DVec3::ZERO {
                // Degenerate triangles have no opinion.
                continue;
            }

            // Force dissident normals to use the triangle's normal.
            for ti in 0..3 {
                if v[ti].normal.dot(tri_normal) < normal_similarity_threshold {
                    tri[ti] = vertices.len() as MeshVertexId;
                    vertices.push(MeshVertex {
                        position: v[ti].position,
                        normal: tri_normal,
                    });
                }
            }

            t.copy_from_slice(&tri);
        }
    }
}
