//! Assertion helpers that run a fit, apply oracles, and report every
//! failing check with context.

use cad_pca::nalgebra::{Isometry2, Isometry3};
use cad_pca::{FitDimension, FitKind, FitResult, Fitted3d, Fitter, Line, Primitive2d, Primitive3d};

use crate::helpers::{
    transform_all_2d, transform_all_3d, transform_line_2d, transform_line_3d, transform_plane,
    HarnessError,
};
use crate::oracle::{
    check_against_reference, check_descending_nonnegative, check_quality_preserved,
    check_quality_range, check_same_line, check_same_plane, failures, OracleVerdict,
};
use crate::reference::{reference_stats_2d, reference_stats_3d};

/// Turn a batch of verdicts into a single result.
pub fn assert_verdicts(
    verdicts: impl IntoIterator<Item = OracleVerdict>,
    ctx: &str,
) -> Result<(), HarnessError> {
    let failed = failures(verdicts);
    if failed.is_empty() {
        return Ok(());
    }
    let detail = failed
        .iter()
        .map(|v| format!("{}: {}", v.oracle_name, v.detail))
        .collect::<Vec<_>>()
        .join("; ");
    Err(HarnessError::AssertionFailed {
        detail: format!("[{ctx}] {detail}"),
    })
}

/// Fit a 2D line and compare its statistics with the quadrature reference.
pub fn assert_matches_reference_2d(
    fitter: &Fitter,
    prims: &[Primitive2d],
    dimension: FitDimension,
    tol: f64,
    ctx: &str,
) -> Result<FitResult<Line<2>, 2>, HarnessError> {
    let reference = reference_stats_2d(prims, dimension).ok_or_else(|| HarnessError::NoReference {
        what: format!("{ctx} at {dimension}"),
    })?;
    let fit = fitter.fit_line_2d(prims, dimension)?;
    assert_verdicts(
        [
            check_against_reference(&fit, &reference, tol),
            check_quality_range(&fit),
            check_descending_nonnegative(&fit.eigenvalues),
        ],
        ctx,
    )?;
    Ok(fit)
}

/// Fit a 3D line or plane and compare its statistics with the quadrature
/// reference.
pub fn assert_matches_reference_3d(
    fitter: &Fitter,
    prims: &[Primitive3d],
    dimension: FitDimension,
    kind: FitKind,
    tol: f64,
    ctx: &str,
) -> Result<FitResult<Fitted3d, 3>, HarnessError> {
    let reference = reference_stats_3d(prims, dimension).ok_or_else(|| HarnessError::NoReference {
        what: format!("{ctx} at {dimension}"),
    })?;
    let fit = fitter.fit_3d(prims, dimension, kind)?;
    assert_verdicts(
        [
            check_against_reference(&fit, &reference, tol),
            check_quality_range(&fit),
            check_descending_nonnegative(&fit.eigenvalues),
        ],
        ctx,
    )?;
    Ok(fit)
}

/// Fitting the image of `prims` under `iso` must give the image of the fit,
/// with the same quality. Isotropic fits only compare quality, since their
/// fallback direction is fixed rather than carried along.
pub fn assert_rigid_motion_2d(
    fitter: &Fitter,
    prims: &[Primitive2d],
    dimension: FitDimension,
    iso: &Isometry2<f64>,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let moved = transform_all_2d(prims, iso).ok_or_else(|| HarnessError::NoReference {
        what: format!("{ctx}: rotated rectangle"),
    })?;
    let before = fitter.fit_line_2d(prims, dimension)?;
    let after = fitter.fit_line_2d(&moved, dimension)?;

    let mut verdicts = vec![check_quality_preserved(before.quality, after.quality, tol)];
    if !before.isotropic && !after.isotropic {
        verdicts.push(check_same_line(&after.shape, &transform_line_2d(&before.shape, iso), tol));
    }
    assert_verdicts(verdicts, ctx)
}

/// 3D counterpart of [`assert_rigid_motion_2d`] for either fit kind.
pub fn assert_rigid_motion_3d(
    fitter: &Fitter,
    prims: &[Primitive3d],
    dimension: FitDimension,
    kind: FitKind,
    iso: &Isometry3<f64>,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let moved = transform_all_3d(prims, iso).ok_or_else(|| HarnessError::NoReference {
        what: format!("{ctx}: rotated cuboid"),
    })?;
    let before = fitter.fit_3d(prims, dimension, kind)?;
    let after = fitter.fit_3d(&moved, dimension, kind)?;

    let mut verdicts = vec![check_quality_preserved(before.quality, after.quality, tol)];
    if !before.isotropic && !after.isotropic {
        match (&before.shape, &after.shape) {
            (Fitted3d::Line(b), Fitted3d::Line(a)) => {
                verdicts.push(check_same_line(a, &transform_line_3d(b, iso), tol));
            }
            (Fitted3d::Plane(b), Fitted3d::Plane(a)) => {
                verdicts.push(check_same_plane(a, &transform_plane(b, iso), tol));
            }
            _ => {
                return Err(HarnessError::AssertionFailed {
                    detail: format!("[{ctx}] fit kind changed under motion"),
                });
            }
        }
    }
    assert_verdicts(verdicts, ctx)
}
