//! Small fixed-size linear algebra for QEF minimization
//!
//! The symmetric eigen-decomposition uses cyclic Jacobi rotations: each sweep
//! zeroes the (0,1), (0,2) and (1,2) off-diagonal pairs in turn, accumulating
//! the rotations into an orthogonal matrix `V` such that `Vᵀ A V` is (nearly)
//! diagonal.
use glam::{DMat3, DVec3};

/// Symmetric 3x3 matrix, storing only the upper triangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SMat3 {
    pub m00: f64,
    pub m01: f64,
    pub m02: f64,
    pub m11: f64,
    pub m12: f64,
    pub m22: f64,
}

impl SMat3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    pub const fn new(m00: f64, m01: f64, m02: f64, m11: f64, m12: f64, m22: f64) -> Self {
        Self {
            m00,
            m01,
            m02,
            m11,
            m12,
            m22,
        }
    }

    pub fn diagonal(&self) -> DVec3 {
        DVec3::new(self.m00, self.m11, self.m22)
    }

    /// `A v`
    pub fn mul_vec3(&self, v: DVec3) -> DVec3 {
        DVec3::new(
            self.m00 * v.x + self.m01 * v.y + self.m02 * v.z,
            self.m01 * v.x + self.m11 * v.y + self.m12 * v.z,
            self.m02 * v.x + self.m12 * v.y + self.m22 * v.z,
        )
    }

    /// Expands into a dense matrix.
    pub fn to_mat3(&self) -> DMat3 {
        // Symmetric, so row/column order doesn't matter.
        DMat3::from_cols(
            DVec3::new(self.m00, self.m01, self.m02),
            DVec3::new(self.m01, self.m11, self.m12),
            DVec3::new(self.m02, self.m12, self.m22),
        )
    }

    /// Frobenius norm.
    pub fn fnorm(&self) -> f64 {
        (self.m00 * self.m00
            + self.m11 * self.m11
            + self.m22 * self.m22
            + 2.0 * (self.m01 * self.m01 + self.m02 * self.m02 + self.m12 * self.m12))
            .sqrt()
    }

    /// Norm of the off-diagonal entries.
    pub fn off(&self) -> f64 {
        (2.0 * (self.m01 * self.m01 + self.m02 * self.m02 + self.m12 * self.m12)).sqrt()
    }
}

/// Cosine and sine of the Jacobi rotation that zeroes `a_pq` in the 2x2
/// symmetric block `[[a_pp, a_pq], [a_pq, a_qq]]`.
fn schur2(a_pp: f64, a_pq: f64, a_qq: f64) -> (f64, f64) {
    if a_pq == 0.0 {
        return (1.0, 0.0);
    }
    let tau = (a_qq - a_pp) / (2.0 * a_pq);
    let stt = (1.0 + tau * tau).sqrt();
    let tan = 1.0 / if tau >= 0.0 { tau + stt } else { tau - stt };
    let c = 1.0 / (1.0 + tan * tan).sqrt();
    (c, tan * c)
}

// The `rotate*` functions apply `Gᵀ A G` to the symmetric matrix and `V G` to
// the accumulated rotation, where `G` is the Givens rotation in the given
// plane.

fn rotate01(vtav: &mut SMat3, v: &mut DMat3) {
    if vtav.m01 == 0.0 {
        return;
    }
    let (c, s) = schur2(vtav.m00, vtav.m01, vtav.m11);
    let (cc, ss, mix) = (c * c, s * s, 2.0 * c * s * vtav.m01);
    *vtav = SMat3::new(
        cc * vtav.m00 - mix + ss * vtav.m11,
        0.0,
        c * vtav.m02 - s * vtav.m12,
        ss * vtav.m00 + mix + cc * vtav.m11,
        s * vtav.m02 + c * vtav.m12,
        vtav.m22,
    );

    let (c0, c1) = (v.x_axis, v.y_axis);
    v.x_axis = c * c0 - s * c1;
    v.y_axis = s * c0 + c * c1;
}

fn rotate02(vtav: &mut SMat3, v: &mut DMat3) {
    if vtav.m02 == 0.0 {
        return;
    }
    let (c, s) = schur2(vtav.m00, vtav.m02, vtav.m22);
    let (cc, ss, mix) = (c * c, s * s, 2.0 * c * s * vtav.m02);
    *vtav = SMat3::new(
        cc * vtav.m00 - mix + ss * vtav.m22,
        c * vtav.m01 - s * vtav.m12,
        0.0,
        vtav.m11,
        s * vtav.m01 + c * vtav.m12,
        ss * vtav.m00 + mix + cc * vtav.m22,
    );

    let (c0, c2) = (v.x_axis, v.z_axis);
    v.x_axis = c * c0 - s * c2;
    v.z_axis = s * c0 + c * c2;
}

fn rotate12(vtav: &mut SMat3, v: &mut DMat3) {
    if vtav.m12 == 0.0 {
        return;
    }
    let (c, s) = schur2(vtav.m11, vtav.m12, vtav.m22);
    let (cc, ss, mix) = (c * c, s * s, 2.0 * c * s * vtav.m12);
    *vtav = SMat3::new(
        vtav.m00,
        c * vtav.m01 - s * vtav.m02,
        s * vtav.m01 + c * vtav.m02,
        cc * vtav.m11 - mix + ss * vtav.m22,
        0.0,
        ss * vtav.m11 + mix + cc * vtav.m22,
    );

    let (c1, c2) = (v.y_axis, v.z_axis);
    v.y_axis = c * c1 - s * c2;
    v.z_axis = s * c1 + c * c2;
}

/// Approximate eigen-decomposition `A = V D Vᵀ` of a symmetric matrix.
///
/// Returns `(D, V)`, where `D` is `Vᵀ A V` and has off-diagonal entries no
/// larger than `tol * ‖A‖_F` unless the sweep budget ran out first.
pub fn symmetric_svd(a: &SMat3, tol: f64, max_sweeps: usize) -> (SMat3, DMat3) {
    let mut vtav = *a;
    let mut v = DMat3::IDENTITY;
    let delta = tol * vtav.fnorm();
    for _ in 0..max_sweeps {
        if vtav.off() <= delta {
            break;
        }
        rotate01(&mut vtav, &mut v);
        rotate02(&mut vtav, &mut v);
        rotate12(&mut vtav, &mut v);
    }
    (vtav, v)
}

/// Reciprocal that treats values which are too small (or too large) as
/// singular.
fn pinv(x: f64, tol: f64) -> f64 {
    if x.abs() < tol || (1.0 / x).abs() < tol {
        0.0
    } else {
        1.0 / x
    }
}

/// `V D⁺ Vᵀ`, the pseudo-inverse of a matrix from its eigen-decomposition.
pub fn pseudo_inverse(d: &SMat3, v: &DMat3, tol: f64) -> DMat3 {
    let d_inv = DVec3::new(pinv(d.m00, tol), pinv(d.m11, tol), pinv(d.m22, tol));
    *v * DMat3::from_diagonal(d_inv) * v.transpose()
}

/// Solves `A x = b` in the least-squares sense for symmetric `A`.
///
/// Returns `x` along with the squared residual `|A x - b|²`.
pub fn solve_symmetric(
    a: &SMat3,
    b: DVec3,
    svd_tol: f64,
    svd_sweeps: usize,
    pinv_tol: f64,
) -> (DVec3, f64) {
    let (vtav, v) = symmetric_svd(a, svd_tol, svd_sweeps);
    let x = pseudo_inverse(&vtav, &v, pinv_tol) * b;
    let r = b - a.mul_vec3(x);
    (x, r.length_squared())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: DVec3, b: DVec3, eps: f64) {
        assert!((a - b).length() < eps, "expected {b:?}, got {a:?}");
    }

    #[test]
    fn diagonal_matrix_needs_no_rotation() {
        let a = SMat3::new(3.0, 0.0, 0.0, 2.0, 0.0, 1.0);
        let (d, v) = symmetric_svd(&a, 1e-6, 4);
        assert_eq!(d, a);
        assert_eq!(v, DMat3::IDENTITY);
    }

    #[test]
    fn eigen_decomposition_reconstructs_matrix() {
        let a = SMat3::new(4.0, 1.0, 0.5, 3.0, -0.25, 2.0);
        let (d, v) = symmetric_svd(&a, 1e-12, 8);
        assert!(d.off() < 1e-9);

        // V is orthogonal.
        let vtv = v.transpose() * v;
        for (col, expected) in [
            (vtv.x_axis, DVec3::X),
            (vtv.y_axis, DVec3::Y),
            (vtv.z_axis, DVec3::Z),
        ] {
            assert_vec_eq(col, expected, 1e-9);
        }

        let rebuilt = v * DMat3::from_diagonal(d.diagonal()) * v.transpose();
        let dense = a.to_mat3();
        for (r, e) in [
            (rebuilt.x_axis, dense.x_axis),
            (rebuilt.y_axis, dense.y_axis),
            (rebuilt.z_axis, dense.z_axis),
        ] {
            assert_vec_eq(r, e, 1e-9);
        }

        // Trace is invariant under rotation.
        assert_abs_diff_eq!(
            d.m00 + d.m11 + d.m22,
            a.m00 + a.m11 + a.m22,
            epsilon = 1e-9
        );
    }

    #[test]
    fn full_rank_solve() {
        let a = SMat3::new(2.0, 0.5, 0.0, 3.0, 0.25, 1.5);
        let expected = DVec3::new(1.0, -2.0, 0.5);
        let b = a.mul_vec3(expected);
        let (x, residual) = solve_symmetric(&a, b, 1e-6, 4, 1e-6);
        assert_vec_eq(x, expected, 1e-6);
        assert!(residual < 1e-10);
    }

    #[test]
    fn rank_deficient_solve_ignores_null_space() {
        // Only the X axis is constrained.
        let a = SMat3::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let (x, residual) = solve_symmetric(&a, DVec3::new(0.75, 0.0, 0.0), 1e-6, 4, 1e-6);
        assert_vec_eq(x, DVec3::new(0.75, 0.0, 0.0), 1e-12);
        assert_abs_diff_eq!(residual, 0.0);
    }

    #[test]
    fn pinv_clamps_tiny_values() {
        assert_eq!(pinv(1e-9, 1e-6), 0.0);
        assert_eq!(pinv(1e9, 1e-6), 0.0);
        assert_abs_diff_eq!(pinv(4.0, 1e-6), 0.25);
    }
}
