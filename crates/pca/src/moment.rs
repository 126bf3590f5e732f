//! Mass and moments of individual primitives about the coordinate origin.
//!
//! Simplices (segments, triangles, tetrahedra) share one construction: the
//! canonical second moment of the unit reference simplex is carried onto the
//! actual simplex by the affine map whose columns are its vertices, then
//! scaled by the simplex measure. Boxes and balls use closed-form integrals.
//! Lower fit dimensions decompose a primitive into its faces, edges or
//! vertices and sum their contributions.

use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use nalgebra::{Matrix2, Matrix3, Matrix3x4, Matrix4, Point, SMatrix, SVector};
use serde::{Deserialize, Serialize};

use crate::config::FitTolerance;
use crate::error::PrimitiveError;
use crate::primitive::{
    Ball, FitDimension, IsoBox, Primitive2d, Primitive3d, PrimitiveKind, Segment, Tetrahedron,
    Triangle, WeightedPoint,
};

/// Mass, first moment and second moment of a mass distribution, all taken
/// about the coordinate origin.
///
/// The same value describes a single primitive's contribution and a running
/// sum over many primitives: addition is the merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments<const D: usize> {
    /// Total mass: multiplicity, length, area or volume.
    pub weight: f64,
    /// Integral of position over the mass.
    pub first: SVector<f64, D>,
    /// Integral of `x * x^T` over the mass.
    pub second: SMatrix<f64, D, D>,
}

impl<const D: usize> Moments<D> {
    pub fn zero() -> Self {
        Self {
            weight: 0.0,
            first: SVector::zeros(),
            second: SMatrix::zeros(),
        }
    }

    /// Combine two partial sums, e.g. from separate partitions of the input.
    pub fn merge(self, other: Self) -> Self {
        self + other
    }

    pub fn is_finite(&self) -> bool {
        self.weight.is_finite()
            && self.first.iter().all(|v| v.is_finite())
            && self.second.iter().all(|v| v.is_finite())
    }

    fn of_mass(weight: f64, first: SVector<f64, D>, second: SMatrix<f64, D, D>) -> Self {
        Self { weight, first, second }
    }
}

impl<const D: usize> Default for Moments<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> Add for Moments<D> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            weight: self.weight + rhs.weight,
            first: self.first + rhs.first,
            second: self.second + rhs.second,
        }
    }
}

impl<const D: usize> AddAssign for Moments<D> {
    fn add_assign(&mut self, rhs: Self) {
        self.weight += rhs.weight;
        self.first += rhs.first;
        self.second += rhs.second;
    }
}

impl<const D: usize> Sum for Moments<D> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

/// Anything that can report its mass distribution at a given fit dimension.
pub trait MomentSource<const D: usize> {
    fn kind(&self) -> PrimitiveKind;

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<D>, PrimitiveError>;
}

/// Weight and raw moments of one primitive about the origin.
pub fn moment_of<const D: usize, P: MomentSource<D> + ?Sized>(
    primitive: &P,
    dimension: FitDimension,
    tolerance: &FitTolerance,
) -> Result<Moments<D>, PrimitiveError> {
    primitive.moments(dimension, tolerance)
}

// ── Canonical moments ───────────────────────────────────────────────────

/// Second moment of the unit-length reference segment in barycentric
/// coordinates: `E[t_i t_j]` for uniform `t` on the 1-simplex.
fn canonical_segment() -> Matrix2<f64> {
    Matrix2::new(1.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0, 1.0 / 3.0)
}

/// Same for the unit-area reference triangle.
fn canonical_triangle() -> Matrix3<f64> {
    (Matrix3::identity() + Matrix3::repeat(1.0)) / 12.0
}

/// Same for the unit-volume reference tetrahedron.
fn canonical_tetrahedron() -> Matrix4<f64> {
    (Matrix4::identity() + Matrix4::repeat(1.0)) / 20.0
}

// ── Closed forms ────────────────────────────────────────────────────────

fn all_finite<const D: usize>(points: &[Point<f64, D>]) -> bool {
    points.iter().all(|p| p.coords.iter().all(|c| c.is_finite()))
}

/// Validate a measure, reporting NaN when any coordinate is not finite.
fn admitted<const D: usize>(
    kind: PrimitiveKind,
    measure: f64,
    points: &[Point<f64, D>],
    tolerance: &FitTolerance,
) -> Result<f64, PrimitiveError> {
    let measure = if all_finite(points) { measure } else { f64::NAN };
    if tolerance.admits_measure(measure) {
        Ok(measure)
    } else {
        Err(PrimitiveError::Degenerate { kind, measure })
    }
}

fn unsupported<const D: usize>(
    kind: PrimitiveKind,
    dimension: FitDimension,
) -> Result<Moments<D>, PrimitiveError> {
    Err(PrimitiveError::UnsupportedDimension { kind, dimension })
}

/// A point mass. The weight must be positive; `min_measure` does not apply.
pub fn point_moments<const D: usize>(
    point: &WeightedPoint<D>,
) -> Result<Moments<D>, PrimitiveError> {
    let weight = if all_finite(&[point.point]) { point.weight } else { f64::NAN };
    if !(weight > 0.0 && weight.is_finite()) {
        return Err(PrimitiveError::Degenerate {
            kind: PrimitiveKind::Point,
            measure: weight,
        });
    }
    let v = point.point.coords;
    Ok(Moments::of_mass(weight, v * weight, v * v.transpose() * weight))
}

fn vertex_moments<const D: usize>(
    vertices: &[Point<f64, D>],
) -> Result<Moments<D>, PrimitiveError> {
    vertices.iter().map(|&p| point_moments(&WeightedPoint::from(p))).sum()
}

/// A uniform segment, weighted by its length.
pub fn segment_moments<const D: usize>(
    segment: &Segment<D>,
    tolerance: &FitTolerance,
) -> Result<Moments<D>, PrimitiveError> {
    let length = admitted(
        PrimitiveKind::Segment,
        segment.length(),
        &[segment.start, segment.end],
        tolerance,
    )?;
    let t = SMatrix::<f64, D, 2>::from_columns(&[segment.start.coords, segment.end.coords]);
    let first = (segment.start.coords + segment.end.coords) * (0.5 * length);
    let second = t * canonical_segment() * t.transpose() * length;
    Ok(Moments::of_mass(length, first, second))
}

/// A uniform triangle, weighted by its area.
pub fn triangle_moments<const D: usize>(
    triangle: &Triangle<D>,
    tolerance: &FitTolerance,
) -> Result<Moments<D>, PrimitiveError> {
    let area = admitted(PrimitiveKind::Triangle, triangle.area(), &triangle.vertices, tolerance)?;
    let [a, b, c] = triangle.vertices;
    let t = SMatrix::<f64, D, 3>::from_columns(&[a.coords, b.coords, c.coords]);
    let first = (a.coords + b.coords + c.coords) * (area / 3.0);
    let second = t * canonical_triangle() * t.transpose() * area;
    Ok(Moments::of_mass(area, first, second))
}

/// A uniform solid tetrahedron, weighted by its volume.
pub fn tetrahedron_moments(
    tetrahedron: &Tetrahedron,
    tolerance: &FitTolerance,
) -> Result<Moments<3>, PrimitiveError> {
    let volume = admitted(
        PrimitiveKind::Tetrahedron,
        tetrahedron.volume(),
        &tetrahedron.vertices,
        tolerance,
    )?;
    let [a, b, c, d] = tetrahedron.vertices;
    let t = Matrix3x4::from_columns(&[a.coords, b.coords, c.coords, d.coords]);
    let first = (a.coords + b.coords + c.coords + d.coords) * (volume / 4.0);
    let second = t * canonical_tetrahedron() * t.transpose() * volume;
    Ok(Moments::of_mass(volume, first, second))
}

/// Uniform mass over an axis-aligned box with the given center and half
/// extents. A zero half extent flattens the box into a face.
fn iso_box_closed_form<const D: usize>(
    center: SVector<f64, D>,
    half: SVector<f64, D>,
    measure: f64,
) -> Moments<D> {
    let spread = SMatrix::from_diagonal(&(half.component_mul(&half) / 3.0));
    Moments::of_mass(measure, center * measure, (center * center.transpose() + spread) * measure)
}

/// A uniform axis-aligned box, weighted by its full-dimensional measure.
pub fn iso_box_moments<const D: usize>(
    iso_box: &IsoBox<D>,
    tolerance: &FitTolerance,
) -> Result<Moments<D>, PrimitiveError> {
    let measure = admitted(
        PrimitiveKind::IsoBox,
        iso_box.measure(),
        &[iso_box.min, iso_box.max],
        tolerance,
    )?;
    Ok(iso_box_closed_form(iso_box.center().coords, iso_box.half_extents(), measure))
}

/// The six faces of a cuboid, each a uniform axis-aligned rectangle.
fn cuboid_surface_moments(
    cuboid: &IsoBox<3>,
    tolerance: &FitTolerance,
) -> Result<Moments<3>, PrimitiveError> {
    let center = cuboid.center().coords;
    let half = cuboid.half_extents();
    let mut total = Moments::zero();
    for axis in 0..3 {
        let mut face_half = half;
        face_half[axis] = 0.0;
        let area = (0..3)
            .filter(|&j| j != axis)
            .map(|j| 2.0 * half[j].max(0.0))
            .product::<f64>();
        let area = admitted(PrimitiveKind::IsoBox, area, &[cuboid.min, cuboid.max], tolerance)?;
        for side in [cuboid.min[axis], cuboid.max[axis]] {
            let mut face_center = center;
            face_center[axis] = side;
            total += iso_box_closed_form(face_center, face_half, area);
        }
    }
    Ok(total)
}

/// Uniform mass on a round shape whose second moment about its center is
/// `spread * r^2 * I` per unit mass.
fn radial_closed_form<const D: usize>(ball: &Ball<D>, measure: f64, spread: f64) -> Moments<D> {
    let c = ball.center.coords;
    let radial = SMatrix::identity() * (spread * ball.radius * ball.radius);
    let second = (c * c.transpose() + radial) * measure;
    Moments::of_mass(measure, c * measure, second)
}

/// Negative radii collapse to zero so the measure check rejects them; NaN
/// passes through.
fn clamped_radius<const D: usize>(ball: &Ball<D>) -> f64 {
    if ball.radius < 0.0 { 0.0 } else { ball.radius }
}

// ── Per-kind dispatch ───────────────────────────────────────────────────

impl<const D: usize> MomentSource<D> for WeightedPoint<D> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Point
    }

    fn moments(
        &self,
        dimension: FitDimension,
        _tolerance: &FitTolerance,
    ) -> Result<Moments<D>, PrimitiveError> {
        match dimension {
            FitDimension::Points => point_moments(self),
            _ => unsupported(PrimitiveKind::Point, dimension),
        }
    }
}

impl<const D: usize> MomentSource<D> for Segment<D> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Segment
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<D>, PrimitiveError> {
        match dimension {
            FitDimension::Points => vertex_moments(&[self.start, self.end]),
            FitDimension::Curves => segment_moments(self, tolerance),
            _ => unsupported(PrimitiveKind::Segment, dimension),
        }
    }
}

impl<const D: usize> MomentSource<D> for Triangle<D> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Triangle
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<D>, PrimitiveError> {
        match dimension {
            FitDimension::Points => vertex_moments(&self.vertices),
            FitDimension::Curves => {
                self.edges().iter().map(|e| segment_moments(e, tolerance)).sum()
            }
            FitDimension::Surfaces => triangle_moments(self, tolerance),
            FitDimension::Volumes => unsupported(PrimitiveKind::Triangle, dimension),
        }
    }
}

impl MomentSource<2> for IsoBox<2> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::IsoBox
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<2>, PrimitiveError> {
        match dimension {
            FitDimension::Points => vertex_moments(&self.corners()),
            FitDimension::Curves => {
                self.edges().iter().map(|e| segment_moments(e, tolerance)).sum()
            }
            FitDimension::Surfaces => iso_box_moments(self, tolerance),
            FitDimension::Volumes => unsupported(PrimitiveKind::IsoBox, dimension),
        }
    }
}

impl MomentSource<3> for IsoBox<3> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::IsoBox
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<3>, PrimitiveError> {
        match dimension {
            FitDimension::Points => vertex_moments(&self.corners()),
            FitDimension::Curves => {
                self.edges().iter().map(|e| segment_moments(e, tolerance)).sum()
            }
            FitDimension::Surfaces => cuboid_surface_moments(self, tolerance),
            FitDimension::Volumes => iso_box_moments(self, tolerance),
        }
    }
}

impl MomentSource<3> for Tetrahedron {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Tetrahedron
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<3>, PrimitiveError> {
        match dimension {
            FitDimension::Points => vertex_moments(&self.vertices),
            FitDimension::Curves => {
                self.edges().iter().map(|e| segment_moments(e, tolerance)).sum()
            }
            FitDimension::Surfaces => {
                self.faces().iter().map(|f| triangle_moments(f, tolerance)).sum()
            }
            FitDimension::Volumes => tetrahedron_moments(self, tolerance),
        }
    }
}

impl MomentSource<2> for Ball<2> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Ball
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<2>, PrimitiveError> {
        let r = clamped_radius(self);
        match dimension {
            FitDimension::Curves => {
                let length = 2.0 * PI * r;
                let length = admitted(PrimitiveKind::Ball, length, &[self.center], tolerance)?;
                Ok(radial_closed_form(self, length, 0.5))
            }
            FitDimension::Surfaces => {
                let area = admitted(PrimitiveKind::Ball, PI * r * r, &[self.center], tolerance)?;
                Ok(radial_closed_form(self, area, 0.25))
            }
            _ => unsupported(PrimitiveKind::Ball, dimension),
        }
    }
}

impl MomentSource<3> for Ball<3> {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Ball
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<3>, PrimitiveError> {
        let r = clamped_radius(self);
        match dimension {
            FitDimension::Surfaces => {
                let area = 4.0 * PI * r * r;
                let area = admitted(PrimitiveKind::Ball, area, &[self.center], tolerance)?;
                Ok(radial_closed_form(self, area, 1.0 / 3.0))
            }
            FitDimension::Volumes => {
                let volume = 4.0 / 3.0 * PI * r * r * r;
                let volume = admitted(PrimitiveKind::Ball, volume, &[self.center], tolerance)?;
                Ok(radial_closed_form(self, volume, 0.2))
            }
            _ => unsupported(PrimitiveKind::Ball, dimension),
        }
    }
}

impl MomentSource<2> for Primitive2d {
    fn kind(&self) -> PrimitiveKind {
        Primitive2d::kind(self)
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<2>, PrimitiveError> {
        match self {
            Primitive2d::Point(p) => p.moments(dimension, tolerance),
            Primitive2d::Segment(s) => s.moments(dimension, tolerance),
            Primitive2d::Triangle(t) => t.moments(dimension, tolerance),
            Primitive2d::Rectangle(b) => b.moments(dimension, tolerance),
            Primitive2d::Disk(b) => b.moments(dimension, tolerance),
        }
    }
}

impl MomentSource<3> for Primitive3d {
    fn kind(&self) -> PrimitiveKind {
        Primitive3d::kind(self)
    }

    fn moments(
        &self,
        dimension: FitDimension,
        tolerance: &FitTolerance,
    ) -> Result<Moments<3>, PrimitiveError> {
        match self {
            Primitive3d::Point(p) => p.moments(dimension, tolerance),
            Primitive3d::Segment(s) => s.moments(dimension, tolerance),
            Primitive3d::Triangle(t) => t.moments(dimension, tolerance),
            Primitive3d::Cuboid(b) => b.moments(dimension, tolerance),
            Primitive3d::Tetrahedron(t) => t.moments(dimension, tolerance),
            Primitive3d::Ball(b) => b.moments(dimension, tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector2, Vector3};

    fn tol() -> FitTolerance {
        FitTolerance::default()
    }

    #[test]
    fn test_point_moment_is_outer_product() {
        let p = WeightedPoint::new(Point::<f64, 2>::new(2.0, 3.0), 2.0);
        let m = point_moments(&p).unwrap();
        assert_eq!(m.weight, 2.0);
        assert_relative_eq!(m.first, Vector2::new(4.0, 6.0));
        assert_relative_eq!(m.second, Matrix2::new(8.0, 12.0, 12.0, 18.0));
    }

    #[test]
    fn test_zero_weight_point_is_degenerate() {
        let p = WeightedPoint::new(Point::<f64, 3>::origin(), 0.0);
        assert!(matches!(
            point_moments(&p),
            Err(PrimitiveError::Degenerate { kind: PrimitiveKind::Point, .. })
        ));
    }

    #[test]
    fn test_unit_segment_on_x_axis() {
        let s = Segment::new(Point::<f64, 2>::new(1.0, 0.0), Point::<f64, 2>::new(0.0, 0.0));
        let m = segment_moments(&s, &tol()).unwrap();
        assert_relative_eq!(m.weight, 1.0);
        assert_relative_eq!(m.first, Vector2::new(0.5, 0.0));
        assert_relative_eq!(m.second, Matrix2::new(1.0 / 3.0, 0.0, 0.0, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn test_long_segment_scales_with_length_cubed() {
        // Integral of x^2 over [0, L] is L^3 / 3.
        let s = Segment::new(Point::<f64, 3>::origin(), Point::<f64, 3>::new(0.0, 0.0, 4.0));
        let m = segment_moments(&s, &tol()).unwrap();
        assert_relative_eq!(m.second[(2, 2)], 64.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.second[(0, 0)], 0.0);
    }

    #[test]
    fn test_zero_length_segment_is_degenerate() {
        let p = Point::<f64, 2>::new(1.0, 1.0);
        let err = segment_moments(&Segment::new(p, p), &tol()).unwrap_err();
        assert_eq!(
            err,
            PrimitiveError::Degenerate {
                kind: PrimitiveKind::Segment,
                measure: 0.0
            }
        );
    }

    #[test]
    fn test_nan_coordinate_is_degenerate() {
        let s = Segment::new(Point::<f64, 2>::new(f64::NAN, 0.0), Point::<f64, 2>::new(1.0, 0.0));
        assert!(segment_moments(&s, &tol()).is_err());
    }

    #[test]
    fn test_unit_right_triangle_moments() {
        let t = Triangle::new(
            Point::<f64, 2>::new(0.0, 0.0),
            Point::<f64, 2>::new(1.0, 0.0),
            Point::<f64, 2>::new(0.0, 1.0),
        );
        let m = triangle_moments(&t, &tol()).unwrap();
        assert_relative_eq!(m.weight, 0.5);
        assert_relative_eq!(m.first, Vector2::new(1.0 / 6.0, 1.0 / 6.0), epsilon = 1e-15);
        // Integral of x^2 is 1/12, of xy is 1/24.
        let expected = Matrix2::new(1.0 / 12.0, 1.0 / 24.0, 1.0 / 24.0, 1.0 / 12.0);
        assert_relative_eq!(m.second, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_unit_tetrahedron_moments() {
        let t = Tetrahedron::new(
            Point::<f64, 3>::origin(),
            Point::<f64, 3>::new(1.0, 0.0, 0.0),
            Point::<f64, 3>::new(0.0, 1.0, 0.0),
            Point::<f64, 3>::new(0.0, 0.0, 1.0),
        );
        let m = tetrahedron_moments(&t, &tol()).unwrap();
        assert_relative_eq!(m.weight, 1.0 / 6.0, epsilon = 1e-15);
        assert_relative_eq!(m.first, Vector3::repeat(1.0 / 24.0), epsilon = 1e-15);
        assert_relative_eq!(m.second[(0, 0)], 1.0 / 60.0, epsilon = 1e-15);
        assert_relative_eq!(m.second[(0, 1)], 1.0 / 120.0, epsilon = 1e-15);
    }

    #[test]
    fn test_unit_cube_volume_moments() {
        let cube = IsoBox::new(Point::<f64, 3>::origin(), Point::<f64, 3>::new(1.0, 1.0, 1.0));
        let m = iso_box_moments(&cube, &tol()).unwrap();
        assert_relative_eq!(m.weight, 1.0);
        let expected = Matrix3::repeat(0.25) + Matrix3::identity() * (1.0 / 12.0);
        assert_relative_eq!(m.second, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_flat_cuboid_is_degenerate_as_volume() {
        let flat = IsoBox::new(Point::<f64, 3>::origin(), Point::<f64, 3>::new(1.0, 1.0, 0.0));
        assert!(matches!(
            flat.moments(FitDimension::Volumes, &tol()),
            Err(PrimitiveError::Degenerate { kind: PrimitiveKind::IsoBox, .. })
        ));
    }

    #[test]
    fn test_cube_lower_dimension_weights() {
        let cube = IsoBox::new(
            Point::<f64, 3>::new(-1.0, -1.0, -1.0),
            Point::<f64, 3>::new(1.0, 1.0, 1.0),
        );
        let surfaces = cube.moments(FitDimension::Surfaces, &tol()).unwrap();
        let curves = cube.moments(FitDimension::Curves, &tol()).unwrap();
        let points = cube.moments(FitDimension::Points, &tol()).unwrap();
        assert_relative_eq!(surfaces.weight, 24.0);
        assert_relative_eq!(curves.weight, 24.0);
        assert_relative_eq!(points.weight, 8.0);
        for m in [surfaces, curves, points] {
            assert_relative_eq!(m.first, Vector3::zeros(), epsilon = 1e-12);
        }
        // Corners all sit at squared distance 1 along each axis.
        assert_relative_eq!(points.second, Matrix3::identity() * 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cube_surface_matches_triangulated_faces() {
        let cube = IsoBox::new(Point::<f64, 3>::origin(), Point::<f64, 3>::new(1.0, 2.0, 3.0));
        let closed_form = cube.moments(FitDimension::Surfaces, &tol()).unwrap();

        let c = cube.corners();
        // Quads listed by corner index, bit i selects max along axis i.
        let quads = [
            [0, 2, 6, 4],
            [1, 3, 7, 5],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 1, 3, 2],
            [4, 5, 7, 6],
        ];
        let mut triangulated = Moments::zero();
        for [a, b, cc, d] in quads {
            triangulated += triangle_moments(&Triangle::new(c[a], c[b], c[cc]), &tol()).unwrap();
            triangulated += triangle_moments(&Triangle::new(c[a], c[cc], c[d]), &tol()).unwrap();
        }
        assert_relative_eq!(closed_form.weight, triangulated.weight, epsilon = 1e-12);
        assert_relative_eq!(closed_form.first, triangulated.first, epsilon = 1e-12);
        assert_relative_eq!(closed_form.second, triangulated.second, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_curves_are_its_edges() {
        let t = Triangle::new(
            Point::<f64, 3>::new(0.0, 0.0, 0.0),
            Point::<f64, 3>::new(3.0, 0.0, 0.0),
            Point::<f64, 3>::new(0.0, 4.0, 0.0),
        );
        let m = t.moments(FitDimension::Curves, &tol()).unwrap();
        assert_relative_eq!(m.weight, 12.0, epsilon = 1e-12);
        assert!(t.moments(FitDimension::Volumes, &tol()).is_err());
    }

    #[test]
    fn test_disk_and_circle_about_center() {
        let disk = Ball::new(Point::<f64, 2>::origin(), 1.0);
        let area = disk.moments(FitDimension::Surfaces, &tol()).unwrap();
        assert_relative_eq!(area.weight, PI);
        assert_relative_eq!(area.second, Matrix2::identity() * (PI / 4.0), epsilon = 1e-15);

        let circle = disk.moments(FitDimension::Curves, &tol()).unwrap();
        assert_relative_eq!(circle.weight, 2.0 * PI);
        assert_relative_eq!(circle.second, Matrix2::identity() * PI, epsilon = 1e-15);
    }

    #[test]
    fn test_ball_and_sphere_about_center() {
        let ball = Ball::new(Point::<f64, 3>::origin(), 1.0);
        let solid = ball.moments(FitDimension::Volumes, &tol()).unwrap();
        assert_relative_eq!(solid.second, Matrix3::identity() * (4.0 * PI / 15.0), epsilon = 1e-15);
        let shell = ball.moments(FitDimension::Surfaces, &tol()).unwrap();
        assert_relative_eq!(shell.second, Matrix3::identity() * (4.0 * PI / 3.0), epsilon = 1e-15);
        assert!(ball.moments(FitDimension::Points, &tol()).is_err());
    }

    #[test]
    fn test_negative_radius_is_degenerate() {
        let disk = Ball::new(Point::<f64, 2>::origin(), -1.0);
        assert!(matches!(
            disk.moments(FitDimension::Surfaces, &tol()),
            Err(PrimitiveError::Degenerate { kind: PrimitiveKind::Ball, measure }) if measure == 0.0
        ));
    }

    #[test]
    fn test_point_only_has_mass_at_points() {
        let p = Primitive3d::point(1.0, 2.0, 3.0);
        assert!(p.moments(FitDimension::Points, &tol()).is_ok());
        assert_eq!(
            p.moments(FitDimension::Curves, &tol()).unwrap_err(),
            PrimitiveError::UnsupportedDimension {
                kind: PrimitiveKind::Point,
                dimension: FitDimension::Curves
            }
        );
    }

    #[test]
    fn test_moments_merge_is_addition() {
        let a = Primitive2d::segment([0.0, 0.0], [1.0, 0.0])
            .moments(FitDimension::Curves, &tol())
            .unwrap();
        let b = Primitive2d::point(3.0, 4.0).moments(FitDimension::Points, &tol()).unwrap();
        let merged = a.merge(b);
        assert_relative_eq!(merged.weight, 2.0);
        assert_relative_eq!(merged.first, Vector2::new(3.5, 4.0));
        assert_eq!(merged, [a, b].into_iter().sum());
    }
}
