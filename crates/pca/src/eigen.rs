//! Eigendecomposition of 2x2 and 3x3 real symmetric matrices.
//!
//! Both sizes are solved in closed form: the 2x2 case from the
//! trace/determinant quadratic, the 3x3 case from the trigonometric solution
//! of the characteristic cubic. When two 3x3 eigenvalues are too close for
//! the closed-form eigenvectors to be trusted, a fixed number of cyclic
//! Jacobi sweeps is used instead. Nothing iterates to convergence, so there is
//! no failure mode besides non-finite input.
//!
//! Conventions:
//! - eigenvalues are sorted in descending order;
//! - each eigenvector is flipped so that its largest-magnitude component
//!   (the first one on ties) is positive;
//! - when eigenvalues are equal under [`FitTolerance::nearly_equal`], the
//!   same test the fit selection uses for isotropy, the eigenspace basis is
//!   built from coordinate axes (see [`canonical_pair`]), so a diagonal
//!   matrix always yields the axes in axis order. Eigenvalues that are only
//!   close keep their computed eigenvectors.

use std::f64::consts::PI;

use nalgebra::{Matrix2, Matrix3, SMatrix, SVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FitTolerance;
use crate::covariance::Covariance;
use crate::error::{FitError, Stage};

const JACOBI_SWEEPS: usize = 16;

/// Eigenvalues (descending) with the matching unit eigenvectors as columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenDecomposition<const D: usize> {
    pub values: SVector<f64, D>,
    pub vectors: SMatrix<f64, D, D>,
}

impl<const D: usize> EigenDecomposition<D> {
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn vector(&self, i: usize) -> SVector<f64, D> {
        self.vectors.column(i).into_owned()
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().chain(self.vectors.iter()).all(|v| v.is_finite())
    }

    /// Rounding can push the eigenvalues of a PSD matrix slightly below zero.
    fn clamped(mut self) -> Self {
        for v in self.values.iter_mut() {
            *v = v.max(0.0);
        }
        self
    }
}

/// Fixed-size symmetric eigensolver.
pub trait SymmetricEigenSolver<const D: usize> {
    /// Eigenpairs in descending order. `tolerance.isotropy` decides which
    /// eigenvalues form a single eigenspace; `tolerance.eigen_gap` only
    /// selects the 3x3 solution path.
    fn closed_form_eigen(&self, tolerance: &FitTolerance) -> EigenDecomposition<D>;
}

impl SymmetricEigenSolver<2> for Matrix2<f64> {
    fn closed_form_eigen(&self, tolerance: &FitTolerance) -> EigenDecomposition<2> {
        symmetric_eigen_2(self, tolerance)
    }
}

impl SymmetricEigenSolver<3> for Matrix3<f64> {
    fn closed_form_eigen(&self, tolerance: &FitTolerance) -> EigenDecomposition<3> {
        symmetric_eigen_3(self, tolerance)
    }
}

/// Principal components of a covariance, with eigenvalues clamped to zero
/// from below.
pub fn decompose<const D: usize>(
    covariance: &Covariance<D>,
    tolerance: &FitTolerance,
) -> Result<EigenDecomposition<D>, FitError>
where
    SMatrix<f64, D, D>: SymmetricEigenSolver<D>,
{
    let eigen = covariance.tensor.closed_form_eigen(tolerance);
    if !eigen.is_finite() {
        return Err(FitError::NumericInstability { stage: Stage::Eigen });
    }
    Ok(eigen.clamped())
}

fn canonical_sign<const D: usize>(v: SVector<f64, D>) -> SVector<f64, D> {
    let mut pivot = 0;
    for i in 1..D {
        if v[i].abs() > v[pivot].abs() {
            pivot = i;
        }
    }
    if v[pivot] < 0.0 { -v } else { v }
}

/// Sort eigenpairs by descending eigenvalue. The sort is stable, so equal
/// eigenvalues keep their column order.
fn sorted<const D: usize>(
    values: SVector<f64, D>,
    vectors: SMatrix<f64, D, D>,
) -> EigenDecomposition<D> {
    let mut order: Vec<usize> = (0..D).collect();
    order.sort_by(|&i, &j| values[j].total_cmp(&values[i]));

    let mut out: EigenDecomposition<D> = EigenDecomposition {
        values: SVector::zeros(),
        vectors: SMatrix::zeros(),
    };
    for (k, &i) in order.iter().enumerate() {
        out.values[k] = values[i];
        out.vectors.set_column(k, &canonical_sign(vectors.column(i).into_owned()));
    }
    out
}

/// Closed-form eigendecomposition of a symmetric 2x2 matrix.
pub fn symmetric_eigen_2(m: &Matrix2<f64>, tolerance: &FitTolerance) -> EigenDecomposition<2> {
    let a = m[(0, 0)];
    let b = 0.5 * (m[(0, 1)] + m[(1, 0)]);
    let c = m[(1, 1)];

    if b == 0.0 {
        return sorted(Vector2::new(a, c), Matrix2::identity());
    }

    let half_trace = 0.5 * (a + c);
    let half_diff = 0.5 * (a - c);
    let radius = half_diff.hypot(b);
    let l1 = half_trace + radius;
    let l2 = half_trace - radius;

    if tolerance.nearly_equal(l1, l2) {
        return EigenDecomposition {
            values: Vector2::new(l1, l2),
            vectors: Matrix2::identity(),
        };
    }

    // Pick the form whose leading entry is bounded away from zero.
    let v = if a >= c {
        Vector2::new(half_diff + radius, b)
    } else {
        Vector2::new(b, radius - half_diff)
    };
    let e1 = v.normalize();
    let e2 = Vector2::new(-e1.y, e1.x);

    EigenDecomposition {
        values: Vector2::new(l1, l2),
        vectors: Matrix2::from_columns(&[canonical_sign(e1), canonical_sign(e2)]),
    }
}

/// Closed-form eigendecomposition of a symmetric 3x3 matrix, with a Jacobi
/// fallback for nearly repeated eigenvalues.
pub fn symmetric_eigen_3(m: &Matrix3<f64>, tolerance: &FitTolerance) -> EigenDecomposition<3> {
    let a = (m + m.transpose()) * 0.5;
    let off = a[(0, 1)].powi(2) + a[(0, 2)].powi(2) + a[(1, 2)].powi(2);

    let eigen = if off == 0.0 {
        sorted(a.diagonal(), Matrix3::identity())
    } else {
        trigonometric_eigen_3(&a, tolerance.eigen_gap).unwrap_or_else(|| {
            debug!("eigenvalues nearly repeated, using Jacobi sweeps");
            jacobi_eigen_3(&a)
        })
    };
    with_canonical_ties(eigen, tolerance)
}

/// Eigenvalues from the characteristic cubic, eigenvectors of the extreme
/// eigenvalues from cross products of rows of `A - λI`. Returns `None` when
/// the eigenvalues are too close to separate the eigenvectors reliably.
fn trigonometric_eigen_3(a: &Matrix3<f64>, eigen_gap: f64) -> Option<EigenDecomposition<3>> {
    let q = a.trace() / 3.0;
    let shifted = a - Matrix3::identity() * q;
    let p = (shifted.norm_squared() / 6.0).sqrt();
    if !(p > 0.0) {
        return None;
    }
    let r = ((shifted / p).determinant() / 2.0).clamp(-1.0, 1.0);
    let phi = r.acos() / 3.0;

    let l1 = q + 2.0 * p * phi.cos();
    let l3 = q + 2.0 * p * (phi + 2.0 * PI / 3.0).cos();
    let l2 = 3.0 * q - l1 - l3;

    let scale = l1.abs().max(l3.abs());
    if l1 - l2 <= eigen_gap * scale || l2 - l3 <= eigen_gap * scale {
        return None;
    }

    let e1 = null_vector(a, l1)?;
    let e3 = null_vector(a, l3)?;
    let e3 = (e3 - e1 * e1.dot(&e3)).try_normalize(f64::MIN_POSITIVE)?;
    let e2 = e3.cross(&e1);

    Some(EigenDecomposition {
        values: Vector3::new(l1, l2, l3),
        vectors: Matrix3::from_columns(&[
            canonical_sign(e1),
            canonical_sign(e2),
            canonical_sign(e3),
        ]),
    })
}

/// Unit vector spanning the kernel of `A - λI`, assuming it has rank 2.
fn null_vector(a: &Matrix3<f64>, lambda: f64) -> Option<Vector3<f64>> {
    let s = a - Matrix3::identity() * lambda;
    let r0: Vector3<f64> = s.row(0).transpose();
    let r1: Vector3<f64> = s.row(1).transpose();
    let r2: Vector3<f64> = s.row(2).transpose();

    [r0.cross(&r1), r0.cross(&r2), r1.cross(&r2)]
        .into_iter()
        .max_by(|x, y| x.norm_squared().total_cmp(&y.norm_squared()))
        .and_then(|v| v.try_normalize(f64::MIN_POSITIVE))
}

/// Cyclic Jacobi rotations over the three off-diagonal pairs, for a fixed
/// number of sweeps.
fn jacobi_eigen_3(m: &Matrix3<f64>) -> EigenDecomposition<3> {
    let mut a = *m;
    let mut v = Matrix3::identity();

    for _ in 0..JACOBI_SWEEPS {
        let off = a[(0, 1)].powi(2) + a[(0, 2)].powi(2) + a[(1, 2)].powi(2);
        if off <= f64::EPSILON * f64::EPSILON * a.norm_squared() {
            break;
        }
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            let apq = a[(p, q)];
            if apq == 0.0 {
                continue;
            }
            let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            let mut rot = Matrix3::identity();
            rot[(p, p)] = c;
            rot[(q, q)] = c;
            rot[(p, q)] = s;
            rot[(q, p)] = -s;

            a = rot.transpose() * a * rot;
            a[(p, q)] = 0.0;
            a[(q, p)] = 0.0;
            v *= rot;
        }
    }

    sorted(a.diagonal(), v)
}

/// Orthonormal basis of the plane perpendicular to `n`, built from the
/// coordinate axis least aligned with `n` (the first one on ties).
fn canonical_pair(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let axis = n.iamin();
    let e = Vector3::ith(axis, 1.0);
    let u = (e - n * n.dot(&e)).normalize();
    let w = n.cross(&u);
    (canonical_sign(u), canonical_sign(w))
}

fn with_canonical_ties(
    mut eigen: EigenDecomposition<3>,
    tolerance: &FitTolerance,
) -> EigenDecomposition<3> {
    let [l1, l2, l3] = [eigen.values[0], eigen.values[1], eigen.values[2]];
    let top = tolerance.nearly_equal(l1, l2);
    let bottom = tolerance.nearly_equal(l2, l3);

    if top && bottom {
        eigen.vectors = Matrix3::identity();
    } else if top {
        let (u, w) = canonical_pair(&eigen.vector(2));
        eigen.vectors.set_column(0, &u);
        eigen.vectors.set_column(1, &w);
    } else if bottom {
        let (u, w) = canonical_pair(&eigen.vector(0));
        eigen.vectors.set_column(1, &u);
        eigen.vectors.set_column(2, &w);
    }
    eigen
}
