use crate::linalg::{solve_symmetric, SMat3};
use glam::DVec3;
use std::ops::{Add, AddAssign};

/// Relative tolerance for both the Jacobi sweeps and the pseudo-inverse.
pub const QEF_ERROR: f64 = 1e-6;

/// Maximum number of Jacobi sweeps per solve.
pub const QEF_SWEEPS: usize = 4;

/// Sufficient statistics of a Quadric Error Function
///
/// `x^T A^T A x - 2 x^T A^T b + b^T b`
///
/// Each row of `A` is a surface normal and each entry of `b` is that normal
/// dotted with its surface sample, so summing two `QefData` is the same as
/// accumulating both sets of samples into one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QefData {
    // Keep one triangle of the symmetric matrix.
    pub ata_00: f64,
    pub ata_01: f64,
    pub ata_02: f64,
    pub ata_11: f64,
    pub ata_12: f64,
    pub ata_22: f64,

    pub atb: DVec3,
    pub btb: f64,

    pub mass_point_sum: DVec3,
    pub count: u32,
}

impl QefData {
    pub fn ata(&self) -> SMat3 {
        SMat3::new(
            self.ata_00,
            self.ata_01,
            self.ata_02,
            self.ata_11,
            self.ata_12,
            self.ata_22,
        )
    }

    /// Mean of all accumulated sample positions.
    ///
    /// # Panics
    ///
    /// If no samples were accumulated.
    pub fn mass_point(&self) -> DVec3 {
        assert!(self.count > 0, "QEF has no samples");
        self.mass_point_sum / self.count as f64
    }
}

impl Add for QefData {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            ata_00: self.ata_00 + rhs.ata_00,
            ata_01: self.ata_01 + rhs.ata_01,
            ata_02: self.ata_02 + rhs.ata_02,
            ata_11: self.ata_11 + rhs.ata_11,
            ata_12: self.ata_12 + rhs.ata_12,
            ata_22: self.ata_22 + rhs.ata_22,
            atb: self.atb + rhs.atb,
            btb: self.btb + rhs.btb,
            mass_point_sum: self.mass_point_sum + rhs.mass_point_sum,
            count: self.count + rhs.count,
        }
    }
}

impl AddAssign for QefData {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Result of minimizing a QEF
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QefSolution {
    pub position: DVec3,
    /// QEF value at `position`.
    pub error: f64,
}

/// Accumulates Hermite samples and places a vertex that best fits them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QefSolver {
    data: QefData,
}

impl QefSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: QefData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &QefData {
        &self.data
    }

    pub fn count(&self) -> u32 {
        self.data.count
    }

    pub fn mass_point(&self) -> DVec3 {
        self.data.mass_point()
    }

    pub fn reset(&mut self) {
        self.data = QefData::default();
    }

    /// Adds the plane through `p` with normal `n`.
    ///
    /// `n` is normalized here. A zero normal contributes to the mass point only.
    pub fn add(&mut self, p: DVec3, n: DVec3) {
        let n = n.normalize_or_zero();
        let d = &mut self.data;

        d.ata_00 += n.x * n.x;
        d.ata_01 += n.x * n.y;
        d.ata_02 += n.x * n.z;
        d.ata_11 += n.y * n.y;
        d.ata_12 += n.y * n.z;
        d.ata_22 += n.z * n.z;

        let dot = n.dot(p);
        d.atb += dot * n;
        d.btb += dot * dot;

        d.mass_point_sum += p;
        d.count += 1;
    }

    /// Merges another accumulator's samples into this one.
    pub fn add_data(&mut self, other: &QefData) {
        self.data += *other;
    }

    /// Residual error `x^T A x - 2 b^T x + c` at `p`.
    ///
    /// Clamped at zero, since round-off can push the exact minimum of a
    /// consistent system slightly negative.
    ///
    /// # Panics
    ///
    /// If no samples were accumulated.
    pub fn error_at(&self, p: DVec3) -> f64 {
        assert!(self.data.count > 0, "QEF has no samples");
        let ax = self.data.ata().mul_vec3(p);
        (p.dot(ax) - 2.0 * p.dot(self.data.atb) + self.data.btb).max(0.0)
    }

    /// Finds the minimizer, biased towards the mass point along directions the
    /// samples don't constrain.
    ///
    /// # Panics
    ///
    /// If no samples were accumulated.
    pub fn solve(&self) -> QefSolution {
        let mass_point = self.mass_point();
        let ata = self.data.ata();

        // Solve relative to the mass point for stability.
        let atb = self.data.atb - ata.mul_vec3(mass_point);
        let (x, _residual) = solve_symmetric(&ata, atb, QEF_ERROR, QEF_SWEEPS, QEF_ERROR);

        let position = x + mass_point;
        QefSolution {
            position,
            error: self.error_at(position),
        }
    }
}
