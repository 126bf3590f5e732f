//! Closed-form moments and fits against the quadrature reference.

use cad_pca::{moment_of, FitDimension, FitKind, FitTolerance, Fitter, Primitive2d, Primitive3d};
use pca_harness::assertions::{assert_matches_reference_2d, assert_matches_reference_3d};
use pca_harness::oracle::check_moments_match;
use pca_harness::reference::{reference_moments_2d, reference_moments_3d};
use pca_harness::HarnessError;

const TOL: f64 = 1e-10;

const DIMENSIONS: [FitDimension; 4] = [
    FitDimension::Points,
    FitDimension::Curves,
    FitDimension::Surfaces,
    FitDimension::Volumes,
];

fn sample_2d() -> Vec<Primitive2d> {
    vec![
        Primitive2d::point(3.0, -1.0),
        Primitive2d::segment([-2.0, 1.0], [4.0, 3.5]),
        Primitive2d::triangle([0.5, 0.0], [3.0, 1.0], [-1.0, 2.5]),
        Primitive2d::rectangle([1.0, -2.0], [2.5, 4.0]),
    ]
}

fn sample_3d() -> Vec<Primitive3d> {
    vec![
        Primitive3d::point(1.0, 2.0, 3.0),
        Primitive3d::segment([0.0, -1.0, 2.0], [3.0, 1.0, -2.0]),
        Primitive3d::triangle([1.0, 0.0, 0.5], [0.0, 2.0, -1.0], [-1.5, 0.5, 2.0]),
        Primitive3d::cuboid([-1.0, 0.0, 2.0], [0.5, 3.0, 2.5]),
        Primitive3d::tetrahedron(
            [0.0, 0.0, 0.0],
            [2.0, 0.1, 0.0],
            [0.3, 1.5, 0.2],
            [0.1, 0.4, 1.8],
        ),
    ]
}

// ── Per-primitive moments ───────────────────────────────────────────────

#[test]
fn closed_form_moments_match_quadrature_2d() {
    let tol = FitTolerance::default();
    let mut checked = 0;
    for p in sample_2d() {
        for dim in DIMENSIONS {
            let Some(expected) = reference_moments_2d(&p, dim) else {
                continue;
            };
            let actual = moment_of(&p, dim, &tol).unwrap();
            let verdict = check_moments_match(&actual, &expected, TOL);
            assert!(verdict.passed, "{:?} at {dim}: {}", p.kind(), verdict.detail);
            checked += 1;
        }
    }
    // 1 + 2 + 3 + 3 supported cells.
    assert_eq!(checked, 9);
}

#[test]
fn closed_form_moments_match_quadrature_3d() {
    let tol = FitTolerance::default();
    let mut checked = 0;
    for p in sample_3d() {
        for dim in DIMENSIONS {
            let Some(expected) = reference_moments_3d(&p, dim) else {
                let unsupported = moment_of(&p, dim, &tol).is_err();
                assert!(unsupported, "{:?} at {dim} should be unsupported", p.kind());
                continue;
            };
            let actual = moment_of(&p, dim, &tol).unwrap();
            let verdict = check_moments_match(&actual, &expected, TOL);
            assert!(verdict.passed, "{:?} at {dim}: {}", p.kind(), verdict.detail);
            checked += 1;
        }
    }
    // 1 + 2 + 3 + 4 + 4 supported cells.
    assert_eq!(checked, 14);
}

// ── Whole fits ──────────────────────────────────────────────────────────

#[test]
fn mixed_points_fit_matches_reference_2d() {
    let fitter = Fitter::default();
    let prims = sample_2d();
    assert_matches_reference_2d(&fitter, &prims, FitDimension::Points, TOL, "mixed 2d points")
        .unwrap();
}

#[test]
fn mixed_curves_fit_matches_reference_2d() {
    let fitter = Fitter::default();
    let prims: Vec<_> = sample_2d().into_iter().skip(1).collect();
    assert_matches_reference_2d(&fitter, &prims, FitDimension::Curves, TOL, "mixed 2d curves")
        .unwrap();
}

#[test]
fn surfaces_fit_matches_reference_2d() {
    let fitter = Fitter::default();
    let prims: Vec<_> = sample_2d().into_iter().skip(2).collect();
    let fit =
        assert_matches_reference_2d(&fitter, &prims, FitDimension::Surfaces, TOL, "2d surfaces")
            .unwrap();
    assert!(fit.quality > 0.0 && fit.quality < 1.0);
}

#[test]
fn every_dimension_matches_reference_3d() {
    let fitter = Fitter::default();
    let all = sample_3d();
    let cases = [
        (FitDimension::Points, &all[..]),
        (FitDimension::Curves, &all[1..]),
        (FitDimension::Surfaces, &all[2..]),
        (FitDimension::Volumes, &all[3..]),
    ];
    for (dim, prims) in cases {
        for kind in [FitKind::Line, FitKind::Plane] {
            let ctx = format!("{kind:?} at {dim}");
            assert_matches_reference_3d(&fitter, prims, dim, kind, TOL, &ctx).unwrap();
        }
    }
}

#[test]
fn unsupported_cells_have_no_reference() {
    let fitter = Fitter::default();
    let err = assert_matches_reference_3d(
        &fitter,
        &[Primitive3d::ball([0.0; 3], 1.0)],
        FitDimension::Volumes,
        FitKind::Line,
        TOL,
        "ball",
    )
    .unwrap_err();
    assert!(matches!(err, HarnessError::NoReference { .. }));
}

#[test]
fn fit_errors_surface_through_the_harness() {
    let mut config = cad_pca::FitConfig::default();
    config.tolerance.min_measure = 10.0;
    let fitter = Fitter::new(config);
    let prims = [Primitive2d::segment([0.0, 0.0], [1.0, 1.0])];
    let err = assert_matches_reference_2d(&fitter, &prims, FitDimension::Curves, TOL, "short")
        .unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Fit(cad_pca::FitError::DegeneratePrimitive { index: 0, .. })
    ));
}
