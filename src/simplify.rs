//! Bottom-up octree simplification
//!
//! A branch whose children are all leaves (or pseudo-leaves) can be replaced
//! by one vertex fit to the union of the children's Hermite data. Since QEF
//! data is additive, the merge never needs the original samples.
use crate::{
    cell_octree::{DrawInfo, NodeKind, OctreeNode},
    mesh::NULL_MESH_VERTEX_ID,
    qef::QefSolver,
};
use glam::DVec3;
use log::trace;

/// Simplifies the subtree rooted at `node`, collapsing branches whose merged
/// QEF error is at most `threshold` into pseudo-leaves.
///
/// `threshold` must not be NaN, since no error compares greater than NaN.
pub fn simplify_octree(
    node: Option<Box<OctreeNode>>,
    threshold: f64,
) -> Option<Box<OctreeNode>> {
    debug_assert!(!threshold.is_nan(), "NaN simplification threshold");
    node.map(|mut node| {
        node.simplify(threshold);
        node
    })
}

impl OctreeNode {
    /// In-place version of [`simplify_octree`].
    pub fn simplify(&mut self, threshold: f64) {
        if self.kind != NodeKind::Internal {
            return;
        }

        let mut qef = QefSolver::new();
        let mut signs = [None; 8];
        let mut mid_sign = None;
        let mut collapsible = true;
        for (i, child) in self.children.iter_mut().enumerate() {
            let Some(child) = child else { continue };
            child.simplify(threshold);

            match &child.draw_info {
                Some(info) if child.kind != NodeKind::Internal => {
                    qef.add_data(&info.qef);
                    // NOTE: the opposite octant's bit, not the shared corner.
                    mid_sign = Some((info.corner_signs >> (7 - i)) & 1);
                    signs[i] = Some((info.corner_signs >> i) & 1);
                }
                _ => collapsible = false,
            }
        }

        let Some(mid_sign) = mid_sign else {
            // No leaf-like children, so nothing to merge.
            return;
        };
        if !collapsible {
            return;
        }

        let solution = qef.solve();
        if solution.error > threshold {
            return;
        }
        let position = if self.contains_point(solution.position) {
            solution.position
        } else {
            qef.mass_point()
        };

        let corner_signs = signs
            .iter()
            .enumerate()
            .fold(0u8, |mask, (i, sign)| mask | (sign.unwrap_or(mid_sign) << i));

        let normal_sum = self
            .children()
            .filter_map(|c| c.draw_info.as_ref())
            .fold(DVec3::ZERO, |sum, info| sum + info.average_normal);

        trace!(
            "collapsing node at {} (size {}), error {}",
            self.min,
            self.size,
            solution.error
        );

        self.children = Default::default();
        self.kind = NodeKind::Pseudo;
        self.draw_info = Some(DrawInfo {
            corner_signs,
            qef: *qef.data(),
            position,
            average_normal: normal_sum.normalize_or_zero(),
            vertex_index: NULL_MESH_VERTEX_ID,
        });
    }
}
