use crate::{
    approximate_zero_crossing, cell_is_bipolar, corner_signs,
    mesh::{Mesh, MeshVertexId, NULL_MESH_VERTEX_ID},
    qef::{QefData, QefSolver},
    simplify::simplify_octree,
    surface_normal,
    tables::{CHILD_MIN_OFFSETS, EDGE_VMAP},
    Error, OctreeSettings, Sdf,
};
use glam::{DVec3, IVec3};
use ilattice::extent::Extent;
use log::{debug, log_enabled, Level};

/// Leaf cells stop accumulating Hermite samples after this many crossings.
pub const MAX_CROSSINGS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Has at least one child and no vertex.
    Internal,
    /// Unit cell sampled directly from the field.
    Leaf,
    /// Internal node whose subtree was collapsed into a single vertex.
    Pseudo,
}

/// Everything needed to emit a vertex for a leaf or pseudo-leaf
#[derive(Clone, Debug, PartialEq)]
pub struct DrawInfo {
    /// Bit `i` is set if corner [`CHILD_MIN_OFFSETS`]`[i]` is solid.
    pub corner_signs: u8,
    pub qef: QefData,
    pub position: DVec3,
    pub average_normal: DVec3,
    pub vertex_index: MeshVertexId,
}

#[derive(Clone, Debug)]
pub struct OctreeNode {
    pub kind: NodeKind,
    pub min: IVec3,
    /// Edge length in lattice units; always a power of two.
    pub size: i32,
    /// Octants, indexed like [`CHILD_MIN_OFFSETS`]. Empty unless `Internal`.
    pub children: [Option<Box<OctreeNode>>; 8],
    /// Present iff the node is a `Leaf` or `Pseudo`.
    pub draw_info: Option<DrawInfo>,
}

impl OctreeNode {
    fn new_internal(min: IVec3, size: i32) -> Self {
        Self {
            kind: NodeKind::Internal,
            min,
            size,
            children: Default::default(),
            draw_info: None,
        }
    }

    pub fn extent(&self) -> Extent<IVec3> {
        Extent::from_min_and_shape(self.min, IVec3::splat(self.size))
    }

    /// `Leaf` or `Pseudo`.
    pub fn is_leaf_like(&self) -> bool {
        self.kind != NodeKind::Internal
    }

    /// Whether `p` lies in the closed cube `[min, min + size]`.
    pub fn contains_point(&self, p: DVec3) -> bool {
        let extent = self.extent();
        let min = extent.minimum.as_dvec3();
        let max = extent.least_upper_bound().as_dvec3();
        p.cmpge(min).all() && p.cmple(max).all()
    }

    pub fn children(&self) -> impl Iterator<Item = &OctreeNode> {
        self.children.iter().flatten().map(|c| c.as_ref())
    }

    /// Calls `f` on this node and all of its descendants, parents first.
    pub fn visit(&self, f: &mut impl FnMut(&OctreeNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |n| count += n.is_leaf_like() as usize);
        count
    }
}

/// Builds the octree covering the cube at `min` with edge length `size`, then
/// simplifies it with the given error `threshold`.
///
/// Returns `None` if the surface doesn't cross any unit cell in the cube.
/// `size` must be a power of two and `threshold` must not be NaN (a NaN
/// threshold would collapse everything). [`Octree::build`] checks both.
pub fn build_octree<S: Sdf + ?Sized>(
    min: IVec3,
    size: i32,
    threshold: f64,
    sdf: &S,
) -> Option<Box<OctreeNode>> {
    debug_assert!(!threshold.is_nan(), "NaN simplification threshold");
    let root = construct_octree_nodes(min, size, sdf);
    simplify_octree(root, threshold)
}

/// Recursively subdivides the cube down to unit cells, keeping only the
/// branches that contain some part of the surface.
pub fn construct_octree_nodes<S: Sdf + ?Sized>(
    min: IVec3,
    size: i32,
    sdf: &S,
) -> Option<Box<OctreeNode>> {
    if size == 1 {
        return construct_leaf(min, sdf).map(Box::new);
    }

    let child_size = size / 2;
    let mut node = OctreeNode::new_internal(min, size);
    let mut any_children = false;
    for (slot, offset) in node.children.iter_mut().zip(CHILD_MIN_OFFSETS) {
        *slot = construct_octree_nodes(min + offset * child_size, child_size, sdf);
        any_children |= slot.is_some();
    }

    // Empty branch.
    any_children.then(|| Box::new(node))
}

/// Samples a unit cell and places its vertex, or returns `None` if the surface
/// doesn't pass through it.
fn construct_leaf<S: Sdf + ?Sized>(min: IVec3, sdf: &S) -> Option<OctreeNode> {
    let corner_positions = CHILD_MIN_OFFSETS.map(|o| (min + o).as_dvec3());
    let samples = corner_positions.map(|p| sdf.distance(p));
    let corners = corner_signs(&samples);
    if !cell_is_bipolar(corners) {
        return None;
    }

    let mut qef = QefSolver::new();
    let mut normal_sum = DVec3::ZERO;
    for [c1, c2] in EDGE_VMAP {
        if qef.count() as usize >= MAX_CROSSINGS {
            break;
        }
        let m1 = (corners >> c1) & 1;
        let m2 = (corners >> c2) & 1;
        if m1 == m2 {
            continue;
        }

        let p = approximate_zero_crossing(sdf, corner_positions[c1], corner_positions[c2]);
        let n = surface_normal(sdf, p);
        qef.add(p, n);
        normal_sum += n;
    }

    let mut node = OctreeNode {
        kind: NodeKind::Leaf,
        min,
        size: 1,
        children: Default::default(),
        draw_info: None,
    };

    // A bipolar cell always has at least one crossing.
    let solution = qef.solve();
    let position = if node.contains_point(solution.position) {
        solution.position
    } else {
        qef.mass_point()
    };

    node.draw_info = Some(DrawInfo {
        corner_signs: corners,
        qef: *qef.data(),
        position,
        average_normal: (normal_sum / qef.count() as f64).normalize_or_zero(),
        vertex_index: NULL_MESH_VERTEX_ID,
    });
    Some(node)
}

/// An adaptive octree of Hermite data extracted from a signed distance field
#[derive(Clone, Debug, Default)]
pub struct Octree {
    root: Option<Box<OctreeNode>>,
}

impl Octree {
    /// Builds and simplifies an octree over the domain in `settings`.
    pub fn build<S: Sdf + ?Sized>(sdf: &S, settings: &OctreeSettings) -> Result<Self, Error> {
        settings.validate()?;
        let mut me = Self::construct(sdf, settings.min, settings.size)?;
        me.simplify(settings.threshold);
        Ok(me)
    }

    /// Builds an octree without simplifying it.
    pub fn construct<S: Sdf + ?Sized>(sdf: &S, min: IVec3, size: i32) -> Result<Self, Error> {
        OctreeSettings::validate_size(size)?;
        let root = construct_octree_nodes(min, size, sdf);
        let me = Self { root };
        if log_enabled!(Level::Debug) {
            debug!(
                "constructed octree: {} nodes, {} leaves",
                me.node_count(),
                me.leaf_count()
            );
        }
        Ok(me)
    }

    pub fn from_root(root: Option<Box<OctreeNode>>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<&OctreeNode> {
        self.root.as_deref()
    }

    pub fn into_root(self) -> Option<Box<OctreeNode>> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node_count(&self) -> usize {
        self.root().map_or(0, OctreeNode::node_count)
    }

    /// Number of leaves and pseudo-leaves, i.e. mesh vertices.
    pub fn leaf_count(&self) -> usize {
        self.root().map_or(0, OctreeNode::leaf_count)
    }

    /// Collapses subtrees whose merged QEF error is at most `threshold`.
    pub fn simplify(&mut self, threshold: f64) {
        // Counting leaves walks the whole tree.
        let before = log_enabled!(Level::Debug).then(|| self.leaf_count());
        self.root = simplify_octree(self.root.take(), threshold);
        if let Some(before) = before {
            debug!(
                "simplified octree (threshold {threshold}): {before} -> {} leaves",
                self.leaf_count()
            );
        }
    }

    /// Assigns vertex indices and contours the octree into a triangle mesh.
    pub fn generate_mesh(&mut self) -> Mesh {
        let mesh = Mesh::from_octree(self.root.as_deref_mut());
        debug!(
            "generated mesh: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        mesh
    }
}
