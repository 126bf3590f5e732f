//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail instead of
//! panicking, so a test can collect every failure in one pass.

use cad_pca::nalgebra::{Point, SMatrix, SVector};
use cad_pca::{EigenDecomposition, FitResult, Line, Moments, Plane};

use crate::reference::ReferenceStats;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

/// Verdict from a measured deviation and its tolerance.
fn within(name: &str, what: &str, deviation: f64, tol: f64) -> OracleVerdict {
    if deviation <= tol {
        let detail = format!("{what} deviates by {deviation:.3e} (tol {tol:.1e})");
        OracleVerdict::pass_val(name, detail, deviation)
    } else {
        let detail = format!("{what} deviates by {deviation:.3e}, over tol {tol:.1e}");
        OracleVerdict::fail_val(name, detail, deviation)
    }
}

// ── Spectrum Oracles ────────────────────────────────────────────────────────

/// Eigenvalues must be non-negative and sorted in descending order.
pub fn check_descending_nonnegative<const D: usize>(values: &SVector<f64, D>) -> OracleVerdict {
    let name = "descending_nonnegative";
    if let Some(i) = (0..D).find(|&i| values[i] < 0.0) {
        let detail = format!("eigenvalue {i} is negative: {}", values[i]);
        return OracleVerdict::fail_val(name, detail, values[i]);
    }
    if let Some(i) = (1..D).find(|&i| values[i] > values[i - 1]) {
        let (above, below) = (values[i - 1], values[i]);
        return OracleVerdict::fail(
            name,
            format!("eigenvalue {i} ({below}) exceeds eigenvalue {} ({above})", i - 1),
        );
    }
    OracleVerdict::pass(name, format!("{D} eigenvalues descending and non-negative"))
}

/// Eigenvector columns must be mutually orthonormal.
pub fn check_orthonormal_basis<const D: usize>(
    vectors: &SMatrix<f64, D, D>,
    tol: f64,
) -> OracleVerdict {
    let gram = vectors.transpose() * vectors;
    let deviation = (gram - SMatrix::<f64, D, D>::identity()).amax();
    within("orthonormal_basis", "V^T V from identity", deviation, tol)
}

/// Each eigenpair must satisfy `A v = λ v` up to `tol` relative to `|A|`.
pub fn check_eigenpairs<const D: usize>(
    matrix: &SMatrix<f64, D, D>,
    eigen: &EigenDecomposition<D>,
    tol: f64,
) -> OracleVerdict {
    let scale = matrix.norm().max(f64::MIN_POSITIVE);
    let worst = (0..D)
        .map(|i| {
            let v = eigen.vector(i);
            (matrix * v - v * eigen.value(i)).norm() / scale
        })
        .fold(0.0, f64::max);
    within("eigenpairs", "largest relative residual", worst, tol)
}

// ── Fit Oracles ─────────────────────────────────────────────────────────────

/// Quality must lie in `[0, 1]`, and be exactly 0 for isotropic fits.
pub fn check_quality_range<G, const D: usize>(fit: &FitResult<G, D>) -> OracleVerdict {
    let name = "quality_range";
    let q = fit.quality;
    if !(0.0..=1.0).contains(&q) {
        return OracleVerdict::fail_val(name, format!("quality {q} outside [0, 1]"), q);
    }
    if fit.isotropic && q != 0.0 {
        return OracleVerdict::fail_val(name, format!("isotropic fit has quality {q}"), q);
    }
    OracleVerdict::pass_val(name, format!("quality {q}"), q)
}

/// Quality must survive a rigid motion or uniform scaling of the input.
pub fn check_quality_preserved(before: f64, after: f64, tol: f64) -> OracleVerdict {
    within("quality_preserved", "quality", (before - after).abs(), tol)
}

/// The fitted centroid must match an expected point.
pub fn check_centroid<const D: usize>(
    actual: &Point<f64, D>,
    expected: &Point<f64, D>,
    tol: f64,
) -> OracleVerdict {
    within("centroid", "centroid", (actual - expected).norm(), tol)
}

/// Fit statistics must agree with an independent reference: centroid
/// absolutely, weight and eigenvalues relative to the largest eigenvalue.
pub fn check_against_reference<G, const D: usize>(
    fit: &FitResult<G, D>,
    reference: &ReferenceStats<D>,
    tol: f64,
) -> OracleVerdict {
    let name = "reference";
    let centroid = (fit.centroid - reference.centroid).norm();
    let weight = (fit.total_weight - reference.total_weight).abs() / reference.total_weight;
    let scale = reference.eigenvalues.amax().max(f64::MIN_POSITIVE);
    let spectrum = (fit.eigenvalues - reference.eigenvalues).amax() / scale;
    let worst = centroid.max(weight).max(spectrum);
    let summary = format!("centroid {centroid:.2e}, weight {weight:.2e}, spectrum {spectrum:.2e}");
    if worst <= tol {
        OracleVerdict::pass_val(name, summary, worst)
    } else {
        OracleVerdict::fail_val(name, format!("{summary} over tol {tol:.1e}"), worst)
    }
}

/// Closed-form moments must agree with reference moments, relative to the
/// largest entry of each.
pub fn check_moments_match<const D: usize>(
    actual: &Moments<D>,
    expected: &Moments<D>,
    tol: f64,
) -> OracleVerdict {
    let rel = |a: f64, e: f64, scale: f64| (a - e).abs() / scale.max(f64::MIN_POSITIVE);
    let weight = rel(actual.weight, expected.weight, expected.weight.abs());
    let first_scale = expected.first.amax().max(expected.weight);
    let first = rel((actual.first - expected.first).amax(), 0.0, first_scale);
    let second = rel((actual.second - expected.second).amax(), 0.0, expected.second.amax());
    within("moments_match", "moments", weight.max(first).max(second), tol)
}

// ── Geometry Oracles ────────────────────────────────────────────────────────

/// Two lines coincide: parallel directions, and each anchor lies on the
/// other line.
pub fn check_same_line<const D: usize>(
    actual: &Line<D>,
    expected: &Line<D>,
    tol: f64,
) -> OracleVerdict {
    let cos = actual.direction.dot(&expected.direction.into_inner()).abs();
    let offset = expected.distance_to(&actual.point).max(actual.distance_to(&expected.point));
    within("same_line", "line", (1.0 - cos).max(offset), tol)
}

/// Two planes coincide: parallel normals, and each anchor lies in the other
/// plane.
pub fn check_same_plane(actual: &Plane, expected: &Plane, tol: f64) -> OracleVerdict {
    let cos = actual.normal.dot(&expected.normal.into_inner()).abs();
    let offset = expected
        .signed_distance(&actual.point)
        .abs()
        .max(actual.signed_distance(&expected.point).abs());
    within("same_plane", "plane", (1.0 - cos).max(offset), tol)
}

/// Run several oracles and collect every failure.
pub fn failures(verdicts: impl IntoIterator<Item = OracleVerdict>) -> Vec<OracleVerdict> {
    verdicts.into_iter().filter(|v| !v.passed).collect()
}
