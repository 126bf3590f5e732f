//! Selection of the fitted line or plane from the principal components.

use nalgebra::{Point, SVector, Unit, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FitTolerance;
use crate::covariance::Covariance;
use crate::eigen::EigenDecomposition;

/// An infinite line through `point` along a unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line<const D: usize> {
    pub point: Point<f64, D>,
    pub direction: Unit<SVector<f64, D>>,
}

impl<const D: usize> Line<D> {
    pub fn new(point: Point<f64, D>, direction: Unit<SVector<f64, D>>) -> Self {
        Self { point, direction }
    }

    pub fn distance_to(&self, p: &Point<f64, D>) -> f64 {
        let d = self.direction.into_inner();
        let v = p - self.point;
        (v - d * v.dot(&d)).norm()
    }

    /// Directions parallel or antiparallel within `angular_tol` radians.
    pub fn is_parallel_to(&self, other: &Self, angular_tol: f64) -> bool {
        let cos = self.direction.dot(&other.direction.into_inner()).abs().min(1.0);
        cos.acos() < angular_tol
    }
}

/// A plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Point<f64, 3>,
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    pub fn new(point: Point<f64, 3>, normal: Unit<Vector3<f64>>) -> Self {
        Self { point, normal }
    }

    pub fn signed_distance(&self, p: &Point<f64, 3>) -> f64 {
        (p - self.point).dot(&*self.normal)
    }

    pub fn contains(&self, p: &Point<f64, 3>, tol: f64) -> bool {
        self.signed_distance(p).abs() < tol
    }
}

/// The shape requested from a 3D fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitKind {
    Line,
    Plane,
}

/// A fitted 3D shape of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fitted3d {
    Line(Line<3>),
    Plane(Plane),
}

impl Fitted3d {
    pub fn kind(&self) -> FitKind {
        match self {
            Fitted3d::Line(_) => FitKind::Line,
            Fitted3d::Plane(_) => FitKind::Plane,
        }
    }
}

/// Outcome of a least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult<G, const D: usize> {
    /// The fitted line or plane, anchored at the centroid.
    pub shape: G,
    /// In `[0, 1]`: 1 when all mass lies on the shape, 0 when no direction
    /// is preferred.
    pub quality: f64,
    pub centroid: Point<f64, D>,
    /// Covariance eigenvalues, descending.
    pub eigenvalues: SVector<f64, D>,
    pub total_weight: f64,
    /// No unique best fit exists; `shape` uses the fallback direction.
    pub isotropic: bool,
}

impl<G, const D: usize> FitResult<G, D> {
    /// Replace the shape, keeping every statistic.
    pub fn map_shape<H>(self, f: impl FnOnce(G) -> H) -> FitResult<H, D> {
        FitResult {
            shape: f(self.shape),
            quality: self.quality,
            centroid: self.centroid,
            eigenvalues: self.eigenvalues,
            total_weight: self.total_weight,
            isotropic: self.isotropic,
        }
    }
}

/// Direction used for an isotropic line fit: the first coordinate axis.
pub fn fallback_direction<const D: usize>() -> Unit<SVector<f64, D>> {
    let mut v = SVector::<f64, D>::zeros();
    v[0] = 1.0;
    Unit::new_unchecked(v)
}

/// Normal used for an isotropic plane fit: +Z.
pub fn fallback_normal() -> Unit<Vector3<f64>> {
    Vector3::z_axis()
}

fn quality_ratio(numerator: f64, denominator: f64) -> f64 {
    (1.0 - numerator / denominator).clamp(0.0, 1.0)
}

/// Line along the direction of greatest variance.
///
/// Quality is `1 - λ2/λ1`. When `λ2 ≈ λ1` the line takes the
/// [`fallback_direction`] and quality is 0.
pub fn select_line<const D: usize>(
    covariance: &Covariance<D>,
    eigen: &EigenDecomposition<D>,
    tolerance: &FitTolerance,
) -> FitResult<Line<D>, D> {
    let l1 = eigen.value(0);
    let l2 = eigen.value(1);

    let (direction, quality, isotropic) = if tolerance.nearly_equal(l1, l2) {
        debug!(l1, l2, "isotropic line fit, using fallback direction");
        (fallback_direction(), 0.0, true)
    } else {
        (Unit::new_normalize(eigen.vector(0)), quality_ratio(l2, l1), false)
    };

    FitResult {
        shape: Line::new(covariance.centroid, direction),
        quality,
        centroid: covariance.centroid,
        eigenvalues: eigen.values,
        total_weight: covariance.total_weight,
        isotropic,
    }
}

/// Plane normal to the direction of least variance.
///
/// Quality is `1 - λ3/λ2`: it reaches 1 exactly when all mass lies in the
/// plane and 0 exactly when the normal is not unique (`λ3 ≈ λ2`), in which
/// case the plane takes the [`fallback_normal`].
pub fn select_plane(
    covariance: &Covariance<3>,
    eigen: &EigenDecomposition<3>,
    tolerance: &FitTolerance,
) -> FitResult<Plane, 3> {
    let l2 = eigen.value(1);
    let l3 = eigen.value(2);

    let (normal, quality, isotropic) = if tolerance.nearly_equal(l2, l3) {
        debug!(l2, l3, "isotropic plane fit, using fallback normal");
        (fallback_normal(), 0.0, true)
    } else {
        (Unit::new_normalize(eigen.vector(2)), quality_ratio(l3, l2), false)
    };

    FitResult {
        shape: Plane::new(covariance.centroid, normal),
        quality,
        centroid: covariance.centroid,
        eigenvalues: eigen.values,
        total_weight: covariance.total_weight,
        isotropic,
    }
}
