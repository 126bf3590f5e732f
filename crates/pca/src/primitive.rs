//! Geometric primitives accepted by the fitting engine.
//!
//! Shapes are generic over the ambient dimension `D` wherever their
//! definition does not depend on it. [`Primitive2d`] and [`Primitive3d`] are
//! the tagged variants a fit consumes.

use std::fmt;

use nalgebra::{Point, SVector};
use serde::{Deserialize, Serialize};

/// Which part of a primitive carries mass during a fit.
///
/// A triangle fitted at [`FitDimension::Curves`] contributes its three edges,
/// at [`FitDimension::Points`] its three vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FitDimension {
    /// Vertices only, each with unit mass (or the point's own weight).
    Points,
    /// One-dimensional boundary or the primitive itself, weighted by length.
    Curves,
    /// Two-dimensional boundary or the primitive itself, weighted by area.
    Surfaces,
    /// The solid itself, weighted by volume.
    Volumes,
}

impl FitDimension {
    pub fn rank(self) -> u8 {
        match self {
            Self::Points => 0,
            Self::Curves => 1,
            Self::Surfaces => 2,
            Self::Volumes => 3,
        }
    }
}

impl fmt::Display for FitDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dimension {}", self.rank())
    }
}

/// The kind of a primitive, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Point,
    Segment,
    Triangle,
    IsoBox,
    Tetrahedron,
    Ball,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Point => "point",
            Self::Segment => "segment",
            Self::Triangle => "triangle",
            Self::IsoBox => "iso box",
            Self::Tetrahedron => "tetrahedron",
            Self::Ball => "ball",
        };
        f.write_str(name)
    }
}

/// A point with a multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint<const D: usize> {
    pub point: Point<f64, D>,
    pub weight: f64,
}

impl<const D: usize> WeightedPoint<D> {
    pub fn new(point: Point<f64, D>, weight: f64) -> Self {
        Self { point, weight }
    }
}

impl<const D: usize> From<Point<f64, D>> for WeightedPoint<D> {
    fn from(point: Point<f64, D>) -> Self {
        Self { point, weight: 1.0 }
    }
}

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment<const D: usize> {
    pub start: Point<f64, D>,
    pub end: Point<f64, D>,
}

impl<const D: usize> Segment<D> {
    pub fn new(start: Point<f64, D>, end: Point<f64, D>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point<f64, D> {
        nalgebra::center(&self.start, &self.end)
    }
}

/// A triangle, flat in 2D or embedded in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle<const D: usize> {
    pub vertices: [Point<f64, D>; 3],
}

impl<const D: usize> Triangle<D> {
    pub fn new(a: Point<f64, D>, b: Point<f64, D>, c: Point<f64, D>) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// Area from the Gram determinant of the two edge vectors, which works
    /// the same way in any ambient dimension.
    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        let u = b - a;
        let v = c - a;
        let gram = u.norm_squared() * v.norm_squared() - u.dot(&v).powi(2);
        0.5 * gram.max(0.0).sqrt()
    }

    pub fn edges(&self) -> [Segment<D>; 3] {
        let [a, b, c] = self.vertices;
        [Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)]
    }
}

/// An axis-aligned box: a rectangle in 2D, a cuboid in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoBox<const D: usize> {
    pub min: Point<f64, D>,
    pub max: Point<f64, D>,
}

impl<const D: usize> IsoBox<D> {
    /// Build from two opposite corners in any order.
    pub fn new(a: Point<f64, D>, b: Point<f64, D>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    pub fn center(&self) -> Point<f64, D> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn half_extents(&self) -> SVector<f64, D> {
        (self.max - self.min) * 0.5
    }

    /// Product of the side lengths. Inverted or NaN extents count as zero.
    pub fn measure(&self) -> f64 {
        (self.max - self.min).iter().map(|e| e.max(0.0)).product()
    }

    /// The `2^D` corners; bit `i` of the index selects `max` along axis `i`.
    pub fn corners(&self) -> Vec<Point<f64, D>> {
        (0..1usize << D).map(|mask| self.corner(mask)).collect()
    }

    /// The `D * 2^(D-1)` axis-parallel edges.
    pub fn edges(&self) -> Vec<Segment<D>> {
        let mut edges = Vec::with_capacity(D << D.saturating_sub(1));
        for mask in 0..1usize << D {
            for axis in 0..D {
                if mask & (1 << axis) == 0 {
                    edges.push(Segment::new(self.corner(mask), self.corner(mask | (1 << axis))));
                }
            }
        }
        edges
    }

    fn corner(&self, mask: usize) -> Point<f64, D> {
        let mut p = self.min;
        for axis in 0..D {
            if mask & (1 << axis) != 0 {
                p[axis] = self.max[axis];
            }
        }
        p
    }
}

/// A solid tetrahedron in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tetrahedron {
    pub vertices: [Point<f64, 3>; 4],
}

impl Tetrahedron {
    pub fn new(a: Point<f64, 3>, b: Point<f64, 3>, c: Point<f64, 3>, d: Point<f64, 3>) -> Self {
        Self { vertices: [a, b, c, d] }
    }

    pub fn volume(&self) -> f64 {
        let [a, b, c, d] = self.vertices;
        (b - a).dot(&(c - a).cross(&(d - a))).abs() / 6.0
    }

    pub fn edges(&self) -> [Segment<3>; 6] {
        let [a, b, c, d] = self.vertices;
        [
            Segment::new(a, b),
            Segment::new(a, c),
            Segment::new(a, d),
            Segment::new(b, c),
            Segment::new(b, d),
            Segment::new(c, d),
        ]
    }

    pub fn faces(&self) -> [Triangle<3>; 4] {
        let [a, b, c, d] = self.vertices;
        [
            Triangle::new(b, c, d),
            Triangle::new(a, c, d),
            Triangle::new(a, b, d),
            Triangle::new(a, b, c),
        ]
    }
}

/// A disk (2D) or a ball (3D). At one dimension lower it is the bounding
/// circle or sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball<const D: usize> {
    pub center: Point<f64, D>,
    pub radius: f64,
}

impl<const D: usize> Ball<D> {
    pub fn new(center: Point<f64, D>, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// A primitive in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive2d {
    Point(WeightedPoint<2>),
    Segment(Segment<2>),
    Triangle(Triangle<2>),
    Rectangle(IsoBox<2>),
    Disk(Ball<2>),
}

/// A primitive in space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive3d {
    Point(WeightedPoint<3>),
    Segment(Segment<3>),
    Triangle(Triangle<3>),
    Cuboid(IsoBox<3>),
    Tetrahedron(Tetrahedron),
    Ball(Ball<3>),
}

impl Primitive2d {
    pub fn point(x: f64, y: f64) -> Self {
        Self::Point(Point::<f64, 2>::new(x, y).into())
    }

    pub fn segment(a: [f64; 2], b: [f64; 2]) -> Self {
        Self::Segment(Segment::new(a.into(), b.into()))
    }

    pub fn triangle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Self {
        Self::Triangle(Triangle::new(a.into(), b.into(), c.into()))
    }

    pub fn rectangle(a: [f64; 2], b: [f64; 2]) -> Self {
        Self::Rectangle(IsoBox::new(a.into(), b.into()))
    }

    pub fn disk(center: [f64; 2], radius: f64) -> Self {
        Self::Disk(Ball::new(center.into(), radius))
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Point(_) => PrimitiveKind::Point,
            Self::Segment(_) => PrimitiveKind::Segment,
            Self::Triangle(_) => PrimitiveKind::Triangle,
            Self::Rectangle(_) => PrimitiveKind::IsoBox,
            Self::Disk(_) => PrimitiveKind::Ball,
        }
    }

    /// The highest dimension at which this primitive has mass.
    pub fn intrinsic_dimension(&self) -> FitDimension {
        match self {
            Self::Point(_) => FitDimension::Points,
            Self::Segment(_) => FitDimension::Curves,
            Self::Triangle(_) | Self::Rectangle(_) | Self::Disk(_) => FitDimension::Surfaces,
        }
    }
}

impl Primitive3d {
    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Self::Point(Point::<f64, 3>::new(x, y, z).into())
    }

    pub fn segment(a: [f64; 3], b: [f64; 3]) -> Self {
        Self::Segment(Segment::new(a.into(), b.into()))
    }

    pub fn triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Self {
        Self::Triangle(Triangle::new(a.into(), b.into(), c.into()))
    }

    pub fn cuboid(a: [f64; 3], b: [f64; 3]) -> Self {
        Self::Cuboid(IsoBox::new(a.into(), b.into()))
    }

    pub fn tetrahedron(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> Self {
        Self::Tetrahedron(Tetrahedron::new(a.into(), b.into(), c.into(), d.into()))
    }

    pub fn ball(center: [f64; 3], radius: f64) -> Self {
        Self::Ball(Ball::new(center.into(), radius))
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Point(_) => PrimitiveKind::Point,
            Self::Segment(_) => PrimitiveKind::Segment,
            Self::Triangle(_) => PrimitiveKind::Triangle,
            Self::Cuboid(_) => PrimitiveKind::IsoBox,
            Self::Tetrahedron(_) => PrimitiveKind::Tetrahedron,
            Self::Ball(_) => PrimitiveKind::Ball,
        }
    }

    /// The highest dimension at which this primitive has mass.
    pub fn intrinsic_dimension(&self) -> FitDimension {
        match self {
            Self::Point(_) => FitDimension::Points,
            Self::Segment(_) => FitDimension::Curves,
            Self::Triangle(_) => FitDimension::Surfaces,
            Self::Cuboid(_) | Self::Tetrahedron(_) | Self::Ball(_) => FitDimension::Volumes,
        }
    }
}
