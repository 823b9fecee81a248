//! Lookup tables for the octree traversal.
//!
//! Corners and child octants share one numbering: bit 2 is +X, bit 1 is +Y and
//! bit 0 is +Z. Axes (`dir`) are 0 = X, 1 = Y, 2 = Z.

use glam::IVec3;

/// Offset of each corner (and each child octant's minimum, in units of the
/// child size) from the minimum of a cell.
pub const CHILD_MIN_OFFSETS: [IVec3; 8] = [
    IVec3::new(0, 0, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 1, 0),
    IVec3::new(0, 1, 1),
    IVec3::new(1, 0, 0),
    IVec3::new(1, 0, 1),
    IVec3::new(1, 1, 0),
    IVec3::new(1, 1, 1),
];

/// Endpoint corners of the 12 cell edges, grouped by axis.
pub const EDGE_VMAP: [[usize; 2]; 12] = [
    // X
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
    // Y
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    // Z
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
];

/// Pairs of child octants `[lo, hi, dir]` sharing a face interior to the
/// parent, where `lo` is on the negative side along `dir`.
pub const CELL_PROC_FACE_MASK: [[usize; 3]; 12] = [
    [0, 4, 0],
    [1, 5, 0],
    [2, 6, 0],
    [3, 7, 0],
    [0, 2, 1],
    [4, 6, 1],
    [1, 3, 1],
    [5, 7, 1],
    [0, 1, 2],
    [2, 3, 2],
    [4, 5, 2],
    [6, 7, 2],
];

/// Quartets of child octants `[c0, c1, c2, c3, dir]` around an edge interior
/// to the parent.
pub const CELL_PROC_EDGE_MASK: [[usize; 5]; 6] = [
    [0, 1, 2, 3, 0],
    [4, 5, 6, 7, 0],
    [0, 4, 1, 5, 1],
    [2, 6, 3, 7, 1],
    [0, 2, 4, 6, 2],
    [1, 3, 5, 7, 2],
];

/// For a face along `dir`, the 4 pairs of children `[c0, c1, dir]` that meet
/// across it. `c0` is taken from the negative side and `c1` from the positive
/// side.
pub const FACE_PROC_FACE_MASK: [[[usize; 3]; 4]; 3] = [
    [[4, 0, 0], [5, 1, 0], [6, 2, 0], [7, 3, 0]],
    [[2, 0, 1], [6, 4, 1], [3, 1, 1], [7, 5, 1]],
    [[1, 0, 2], [3, 2, 2], [5, 4, 2], [7, 6, 2]],
];

/// For a face along `dir`, the 4 edges lying in the face as
/// `[order, c0, c1, c2, c3, edge_dir]`. `order` indexes [`FACE_PROC_EDGE_ORDERS`]
/// to choose which side of the face each of the 4 cells comes from.
pub const FACE_PROC_EDGE_MASK: [[[usize; 6]; 4]; 3] = [
    [
        [1, 4, 0, 5, 1, 1],
        [1, 6, 2, 7, 3, 1],
        [0, 4, 6, 0, 2, 2],
        [0, 5, 7, 1, 3, 2],
    ],
    [
        [0, 2, 3, 0, 1, 0],
        [0, 6, 7, 4, 5, 0],
        [1, 2, 0, 6, 4, 2],
        [1, 3, 1, 7, 5, 2],
    ],
    [
        [1, 1, 0, 3, 2, 0],
        [1, 5, 4, 7, 6, 0],
        [0, 1, 5, 0, 4, 1],
        [0, 3, 7, 2, 6, 1],
    ],
];

pub const FACE_PROC_EDGE_ORDERS: [[usize; 4]; 2] = [[0, 0, 1, 1], [0, 1, 0, 1]];

/// For an edge along `dir`, the 2 halves as `[c0, c1, c2, c3, dir]`: the child
/// of each of the 4 surrounding cells that touches that half of the edge.
pub const EDGE_PROC_EDGE_MASK: [[[usize; 5]; 2]; 3] = [
    [[3, 2, 1, 0, 0], [7, 6, 5, 4, 0]],
    [[5, 1, 4, 0, 1], [7, 3, 6, 2, 1]],
    [[6, 4, 2, 0, 2], [7, 5, 3, 1, 2]],
];

/// For an edge along `dir`, which of each surrounding cell's 12 edges (see
/// [`EDGE_VMAP`]) is the shared one.
pub const PROCESS_EDGE_MASK: [[usize; 4]; 3] = [[3, 2, 1, 0], [7, 5, 6, 4], [11, 10, 9, 8]];
