use crate::sdf_primitives;
use glam::{DVec3, IVec3};
use ilattice::extent::Extent;

/// Central differencing step used to estimate surface normals.
pub const NORMAL_DELTA: f64 = 0.001;

/// Number of uniform intervals scanned when locating an edge crossing.
pub const ZERO_CROSSING_STEPS: u32 = 8;

/// A signed distance (or density) field
///
/// Negative values are solid, positive values are empty space and the
/// isosurface is the zero level set.
pub trait Sdf {
    fn distance(&self, p: DVec3) -> f64;

    /// Lattice-aligned box containing the solid region, if known.
    fn bounds(&self) -> Option<Extent<IVec3>> {
        None
    }
}

impl<F: Fn(DVec3) -> f64> Sdf for F {
    fn distance(&self, p: DVec3) -> f64 {
        self(p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Self {
        Self {
            center: DVec3::ZERO,
            radius,
        }
    }

    pub fn with_center(mut self, center: DVec3) -> Self {
        self.center = center;
        self
    }
}

impl Sdf for Sphere {
    fn distance(&self, p: DVec3) -> f64 {
        sdf_primitives::sphere(self.radius, p - self.center)
    }

    fn bounds(&self) -> Option<Extent<IVec3>> {
        Some(lattice_bounds(
            self.center - DVec3::splat(self.radius),
            self.center + DVec3::splat(self.radius),
        ))
    }
}

/// Axis-aligned box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub center: DVec3,
    pub half_size: DVec3,
}

impl Cuboid {
    pub fn new(half_size: DVec3) -> Self {
        Self {
            center: DVec3::ZERO,
            half_size,
        }
    }

    pub fn with_center(mut self, center: DVec3) -> Self {
        self.center = center;
        self
    }
}

impl Sdf for Cuboid {
    fn distance(&self, p: DVec3) -> f64 {
        sdf_primitives::cube(self.half_size, p - self.center)
    }

    fn bounds(&self) -> Option<Extent<IVec3>> {
        Some(lattice_bounds(
            self.center - self.half_size,
            self.center + self.half_size,
        ))
    }
}

/// Smallest lattice extent covering `[min, max]`.
fn lattice_bounds(min: DVec3, max: DVec3) -> Extent<IVec3> {
    Extent::from_min_and_lub(min.floor().as_ivec3(), max.ceil().as_ivec3())
}

/// Unnormalized gradient by central differences.
pub fn central_gradient<S: Sdf + ?Sized>(sdf: &S, p: DVec3, h: f64) -> DVec3 {
    let dx = DVec3::new(h, 0.0, 0.0);
    let dy = DVec3::new(0.0, h, 0.0);
    let dz = DVec3::new(0.0, 0.0, h);
    DVec3::new(
        sdf.distance(p + dx) - sdf.distance(p - dx),
        sdf.distance(p + dy) - sdf.distance(p - dy),
        sdf.distance(p + dz) - sdf.distance(p - dz),
    ) / (2.0 * h)
}

/// Unit surface normal at `p`, or zero where the field is flat.
pub fn surface_normal<S: Sdf + ?Sized>(sdf: &S, p: DVec3) -> DVec3 {
    central_gradient(sdf, p, NORMAL_DELTA).normalize_or_zero()
}

/// Estimates where the surface crosses the segment `p0..p1`.
///
/// Samples the segment at [`ZERO_CROSSING_STEPS`] + 1 evenly spaced points and
/// returns the one closest to the surface. This is only accurate to within
/// half a step; it is not a root finder.
pub fn approximate_zero_crossing<S: Sdf + ?Sized>(sdf: &S, p0: DVec3, p1: DVec3) -> DVec3 {
    let mut min_value = f64::INFINITY;
    let mut best_t = 0.0;
    for step in 0..=ZERO_CROSSING_STEPS {
        let t = step as f64 / ZERO_CROSSING_STEPS as f64;
        let density = sdf.distance(p0 + (p1 - p0) * t).abs();
        if density < min_value {
            min_value = density;
            best_t = t;
        }
    }
    p0 + (p1 - p0) * best_t
}

/// Packs the sign of each sample into a mask; bit `i` is set if sample `i` is
/// solid.
pub fn corner_signs(samples: &[f64; 8]) -> u8 {
    samples
        .iter()
        .enumerate()
        .fold(0, |mask, (i, &d)| mask | (u8::from(d < 0.0) << i))
}

/// True unless every corner is solid or every corner is empty.
pub fn cell_is_bipolar(corners: u8) -> bool {
    corners != 0 && corners != u8::MAX
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sphere_normal_points_outward() {
        let s = Sphere::new(2.0);
        let p = DVec3::new(1.0, 1.0, 1.0).normalize() * 2.0;
        let n = surface_normal(&s, p);
        assert!((n - p.normalize()).length() < 1e-6);
    }

    #[test]
    fn flat_field_has_zero_normal() {
        let field = |_: DVec3| 1.0_f64;
        assert_eq!(surface_normal(&field, DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn zero_crossing_snaps_to_sample() {
        let plane = |p: DVec3| p.x - 0.3;
        let p = approximate_zero_crossing(&plane, DVec3::ZERO, DVec3::X);
        // 0.25 is the nearest of the 1/8 steps.
        assert_abs_diff_eq!(p.x, 0.25);

        let plane = |p: DVec3| p.x - 1.0;
        let p = approximate_zero_crossing(&plane, DVec3::ZERO, DVec3::X);
        assert_abs_diff_eq!(p.x, 1.0);
    }

    #[test]
    fn corner_mask() {
        let samples = [-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -0.5];
        let mask = corner_signs(&samples);
        assert_eq!(mask, 0b1000_0001);
        assert!(cell_is_bipolar(mask));
        assert!(!cell_is_bipolar(corner_signs(&[1.0; 8])));
        assert!(!cell_is_bipolar(corner_signs(&[-1.0; 8])));
        // Zero counts as empty.
        assert_eq!(corner_signs(&[0.0; 8]), 0);
    }

    #[test]
    fn primitive_bounds() {
        let s = Sphere::new(2.5).with_center(DVec3::new(1.0, 0.0, 0.0));
        let b = s.bounds().unwrap();
        assert_eq!(b.minimum, IVec3::new(-2, -3, -3));
        assert_eq!(b.least_upper_bound(), IVec3::new(4, 3, 3));

        let c = Cuboid::new(DVec3::new(1.0, 2.0, 0.5));
        let b = c.bounds().unwrap();
        assert_eq!(b.minimum, IVec3::new(-1, -2, -1));
        assert_eq!(b.least_upper_bound(), IVec3::new(1, 2, 1));
    }

    #[test]
    fn cuboid_distance() {
        let c = Cuboid::new(DVec3::ONE).with_center(DVec3::new(5.0, 0.0, 0.0));
        assert_abs_diff_eq!(c.distance(DVec3::new(5.0, 0.0, 0.0)), -1.0);
        assert_abs_diff_eq!(c.distance(DVec3::new(7.0, 0.0, 0.0)), 1.0);
    }
}
