use crate::{
    cell_octree::{NodeKind, OctreeNode},
    mesh::{Mesh, MeshVertex, MeshVertexId},
    tables::*,
};

#[derive(Clone, Copy, Debug)]
struct Face<'a> {
    dir: usize,
    /// Negative side first.
    nodes: [&'a OctreeNode; 2],
}

#[derive(Clone, Copy, Debug)]
struct Edge<'a> {
    dir: usize,
    nodes: [&'a OctreeNode; 4],
}

/// Assigns a vertex index to every leaf and pseudo-leaf under `node`, pushing
/// its vertex onto `vertices`.
pub fn generate_vertex_indices(node: &mut OctreeNode, vertices: &mut Vec<MeshVertex>) {
    for child in node.children.iter_mut().flatten() {
        generate_vertex_indices(child, vertices);
    }

    if node.kind == NodeKind::Internal {
        return;
    }
    if let Some(info) = node.draw_info.as_mut() {
        info.vertex_index = vertices.len() as MeshVertexId;
        vertices.push(MeshVertex {
            position: info.position,
            normal: info.average_normal,
        });
    }
}

/// Emits a triangle list connecting the vertices of all cells that share a
/// sign-changing edge.
///
/// Vertex indices must already be assigned with [`generate_vertex_indices`].
pub fn contour_octree(root: &OctreeNode, indices: &mut Vec<MeshVertexId>) {
    // The general strategy for isosurface extraction via dual contouring is
    // to visit all bipolar edges on the interior of the root cell and
    // create two triangles for each edge to pass through. These triangles
    // connect vertices of the (up to 4 distinct) cells sharing the edge.
    //
    // Cells only produce faces and edges, and faces only produce faces and
    // edges, so the 3 stacks can be drained in order.
    let mut cell_stack = vec![root];
    let mut face_stack = Vec::new();
    let mut edge_stack = Vec::new();

    while let Some(cell) = cell_stack.pop() {
        contour_cell_proc(cell, &mut cell_stack, &mut face_stack, &mut edge_stack);
    }

    while let Some(face) = face_stack.pop() {
        contour_face_proc(face, &mut face_stack, &mut edge_stack);
    }

    while let Some(edge) = edge_stack.pop() {
        contour_edge_proc(edge, &mut edge_stack, indices);
    }
}

/// Assigns vertex indices and contours the tree rooted at `root`.
pub fn generate_mesh_from_octree(root: Option<&mut OctreeNode>) -> Mesh {
    let mut mesh = Mesh::default();
    if let Some(root) = root {
        generate_vertex_indices(root, &mut mesh.vertices);
        contour_octree(root, &mut mesh.indices);
    }
    mesh
}

/// The node that covers `octant` of `node`, which is `node` itself once it
/// can't be subdivided further.
fn sub_node(node: &OctreeNode, octant: usize) -> Option<&OctreeNode> {
    match node.kind {
        NodeKind::Internal => node.children[octant].as_deref(),
        NodeKind::Leaf | NodeKind::Pseudo => Some(node),
    }
}

// 8 cells, 12 faces, 6 edges
fn contour_cell_proc<'a>(
    cell: &'a OctreeNode,
    cells: &mut Vec<&'a OctreeNode>,
    faces: &mut Vec<Face<'a>>,
    edges: &mut Vec<Edge<'a>>,
) {
    if cell.kind != NodeKind::Internal {
        return;
    }

    cells.extend(cell.children());

    // What remains of the interior of the parent cell can be found entirely
    // in the face interiors and edge interiors of the children.
    for [c0, c1, dir] in CELL_PROC_FACE_MASK {
        if let [Some(n0), Some(n1)] = [c0, c1].map(|c| cell.children[c].as_deref()) {
            faces.push(Face {
                dir,
                nodes: [n0, n1],
            });
        }
    }

    for [c0, c1, c2, c3, dir] in CELL_PROC_EDGE_MASK {
        if let [Some(n0), Some(n1), Some(n2), Some(n3)] =
            [c0, c1, c2, c3].map(|c| cell.children[c].as_deref())
        {
            edges.push(Edge {
                dir,
                nodes: [n0, n1, n2, n3],
            });
        }
    }
}

// 4 faces and 4 edges
fn contour_face_proc<'a>(face: Face<'a>, faces: &mut Vec<Face<'a>>, edges: &mut Vec<Edge<'a>>) {
    if face.nodes.iter().all(|n| n.is_leaf_like()) {
        // No edges on the face interior.
        return;
    }

    // Split whichever sides can be split. A leaf-like side keeps
    // participating as is, which is how a coarse cell gets stitched to its
    // finer neighbors.
    for [c0, c1, dir] in FACE_PROC_FACE_MASK[face.dir] {
        if let (Some(n0), Some(n1)) = (sub_node(face.nodes[0], c0), sub_node(face.nodes[1], c1)) {
            faces.push(Face {
                dir,
                nodes: [n0, n1],
            });
        }
    }

    for [order, c0, c1, c2, c3, dir] in FACE_PROC_EDGE_MASK[face.dir] {
        // Which side of the face each of the 4 edge cells comes from.
        let order = FACE_PROC_EDGE_ORDERS[order];
        let octants = [c0, c1, c2, c3];
        let next = [0, 1, 2, 3].map(|i| sub_node(face.nodes[order[i]], octants[i]));
        if let [Some(n0), Some(n1), Some(n2), Some(n3)] = next {
            edges.push(Edge {
                dir,
                nodes: [n0, n1, n2, n3],
            });
        }
    }
}

// 2 edges
fn contour_edge_proc<'a>(
    edge: Edge<'a>,
    edges: &mut Vec<Edge<'a>>,
    indices: &mut Vec<MeshVertexId>,
) {
    if edge.nodes.iter().all(|n| n.is_leaf_like()) {
        contour_process_edge(&edge, indices);
        return;
    }

    // We must continue bisecting this edge.
    for [c0, c1, c2, c3, dir] in EDGE_PROC_EDGE_MASK[edge.dir] {
        let octants = [c0, c1, c2, c3];
        let next = [0, 1, 2, 3].map(|i| sub_node(edge.nodes[i], octants[i]));
        if let [Some(n0), Some(n1), Some(n2), Some(n3)] = next {
            edges.push(Edge {
                dir,
                nodes: [n0, n1, n2, n3],
            });
        }
    }
}

fn contour_process_edge(edge: &Edge, indices: &mut Vec<MeshVertexId>) {
    // Check if this leaf edge is bipolar. The smallest cell sees the edge
    // exactly, while larger cells only see an edge containing it.
    let mut min_size = i32::MAX;
    let mut min_index = 0;
    let mut flip = false;
    let mut sign_change = [false; 4];
    let mut vertex_ids = [0; 4];
    for (i, node) in edge.nodes.iter().enumerate() {
        let Some(info) = node.draw_info.as_ref() else {
            return;
        };
        let [c1, c2] = EDGE_VMAP[PROCESS_EDGE_MASK[edge.dir][i]];
        let m1 = (info.corner_signs >> c1) & 1;
        let m2 = (info.corner_signs >> c2) & 1;

        if node.size < min_size {
            min_size = node.size;
            min_index = i;
            flip = m1 == 1;
        }

        vertex_ids[i] = info.vertex_index;
        sign_change[i] = m1 != m2;
    }

    if !sign_change[min_index] {
        return;
    }

    let [v0, v1, v2, v3] = vertex_ids;
    if flip {
        indices.extend_from_slice(&[v0, v3, v1, v0, v2, v3]);
    } else {
        indices.extend_from_slice(&[v0, v1, v3, v0, v3, v2]);
    }
}
