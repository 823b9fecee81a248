//! Errors for invalid octree parameters
use thiserror::Error;

/// Errors returned when octree parameters are rejected
///
/// Geometry never produces an error: an SDF with no surface inside the domain
/// simply yields an empty octree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Octree edge length must be a positive power of two
    #[error("octree size must be a positive power of two (got {0})")]
    SizeNotPowerOfTwo(i32),

    /// Simplification threshold must be a non-negative number
    #[error("simplification threshold must be non-negative (got {0})")]
    InvalidThreshold(f64),

    /// A bounds hint had no volume
    #[error("bounds hint is empty")]
    EmptyBounds,

    /// A bounds hint was too close to the limits of `i32` to pad and enclose
    #[error("bounds hint is too large to enclose in an octree domain")]
    DomainOverflow,
}
