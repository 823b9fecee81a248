use crate::Error;
use glam::IVec3;
use ilattice::extent::Extent;

/// Domain and simplification parameters for [`Octree::build`](crate::Octree::build)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeSettings {
    /// Minimum corner of the root cube, in lattice units
    pub min: IVec3,
    /// Edge length of the root cube; must be a power of two
    pub size: i32,
    /// Maximum QEF error for collapsing a subtree into one vertex
    ///
    /// `0.0` keeps almost every leaf, though round-off may still let a few
    /// perfectly planar regions collapse.
    pub threshold: f64,
}

impl Default for OctreeSettings {
    fn default() -> Self {
        Self {
            min: IVec3::splat(-32),
            size: 64,
            threshold: 1e-6,
        }
    }
}

impl OctreeSettings {
    pub fn new(min: IVec3, size: i32, threshold: f64) -> Self {
        Self {
            min,
            size,
            threshold,
        }
    }

    /// Picks the smallest power-of-two cube that covers `bounds` with one cell
    /// of padding on every side, so that the surface doesn't touch the domain
    /// boundary (where it would be left open).
    pub fn enclosing(bounds: Extent<IVec3>, threshold: f64) -> Result<Self, Error> {
        if bounds.shape.cmple(IVec3::ZERO).any() {
            return Err(Error::EmptyBounds);
        }
        let m = bounds.minimum;
        let pad = |c: i32| c.checked_sub(1).ok_or(Error::DomainOverflow);
        let min = IVec3::new(pad(m.x)?, pad(m.y)?, pad(m.z)?);
        let size = bounds
            .shape
            .max_element()
            .checked_add(2)
            .and_then(|extent| (extent as u32).checked_next_power_of_two())
            .and_then(|size| i32::try_from(size).ok())
            .ok_or(Error::DomainOverflow)?;
        // The root cube's far corner must be representable too.
        if min.max_element().checked_add(size).is_none() {
            return Err(Error::DomainOverflow);
        }
        let me = Self::new(min, size, threshold);
        me.validate()?;
        Ok(me)
    }

    pub fn root_extent(&self) -> Extent<IVec3> {
        Extent::from_min_and_shape(self.min, IVec3::splat(self.size))
    }

    pub fn validate(&self) -> Result<(), Error> {
        Self::validate_size(self.size)?;
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    pub(crate) fn validate_size(size: i32) -> Result<(), Error> {
        if size <= 0 || (size as u32).count_ones() != 1 {
            return Err(Error::SizeNotPowerOfTwo(size));
        }
        Ok(())
    }
}
