//! Adaptive Octree Dual Contouring
//!
//! Converts a signed distance field into a triangle mesh with one vertex per
//! octree leaf. Leaves store Hermite data (edge crossings and surface normals)
//! as Quadric Error Functions, which lets sibling leaves be merged into
//! "pseudo-leaves" wherever a single vertex still fits the surface well. The
//! contouring pass then connects vertices across every sign-changing edge,
//! stitching cells of different sizes together without cracks.
//!
//! ```
//! use glam::IVec3;
//! use hermite_octree::{Octree, OctreeSettings, Sphere};
//!
//! let settings = OctreeSettings::new(IVec3::splat(-4), 8, 1e-6);
//! let mut octree = Octree::build(&Sphere::new(2.5), &settings).unwrap();
//! let mesh = octree.generate_mesh();
//! assert!(mesh.triangle_count() > 0);
//! ```
//!
//! # References
//!
//! - Tao Ju, Frank Losasso, Scott Schaefer, Joe Warren ["Dual Contouring of
//!   Hermite Data"](https://www.cs.rice.edu/~jwarren/papers/dualcontour.pdf)
//! - Nick Gildea, "Implementing Dual Contouring" (2014), for the octree
//!   simplification scheme and the cell/face/edge traversal tables
//!
//! # Known Limitations
//!
//! - edge crossings are located by sampling each edge at 9 points, so vertices
//!   are only accurate to within about 1/16 of a cell
//! - the output is not guaranteed to be 2-manifold where cells of different
//!   sizes meet
//! - construction is single-threaded

mod cell_octree;
mod contour_octree;
mod error;
mod mesh;
mod sdf;
mod settings;
mod simplify;

pub mod linalg;
pub mod qef;
pub mod sdf_primitives;
pub mod tables;

pub use cell_octree::*;
pub use contour_octree::{contour_octree, generate_mesh_from_octree, generate_vertex_indices};
pub use error::Error;
pub use mesh::*;
pub use sdf::*;
pub use settings::*;
pub use simplify::simplify_octree;
