//! Error type and primitive transforms shared by the harness.

use cad_pca::nalgebra::{Isometry2, Isometry3, Point, Unit};
use cad_pca::{
    Ball, FitError, IsoBox, Line, Plane, Primitive2d, Primitive3d, Segment, Tetrahedron, Triangle,
    WeightedPoint,
};

/// Errors raised by harness assertions.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("fit failed: {0}")]
    Fit(#[from] FitError),

    #[error("no reference available for {what}")]
    NoReference { what: String },
}

// ── Rigid motions ───────────────────────────────────────────────────────────

/// Apply `iso` to every coordinate of a 2D primitive.
///
/// Rectangles stay axis-aligned only under pure translations, so a rotated
/// rectangle has no image and `None` is returned.
pub fn transform_primitive_2d(p: &Primitive2d, iso: &Isometry2<f64>) -> Option<Primitive2d> {
    let t = |q: &Point<f64, 2>| iso.transform_point(q);
    Some(match p {
        Primitive2d::Point(wp) => Primitive2d::Point(WeightedPoint::new(t(&wp.point), wp.weight)),
        Primitive2d::Segment(s) => Primitive2d::Segment(Segment::new(t(&s.start), t(&s.end))),
        Primitive2d::Triangle(tri) => {
            let [a, b, c] = tri.vertices;
            Primitive2d::Triangle(Triangle::new(t(&a), t(&b), t(&c)))
        }
        Primitive2d::Rectangle(b) => {
            if iso.rotation.angle() != 0.0 {
                return None;
            }
            Primitive2d::Rectangle(IsoBox::new(t(&b.min), t(&b.max)))
        }
        Primitive2d::Disk(d) => Primitive2d::Disk(Ball::new(t(&d.center), d.radius)),
    })
}

/// Apply `iso` to every coordinate of a 3D primitive. Rotated cuboids have
/// no axis-aligned image and yield `None`.
pub fn transform_primitive_3d(p: &Primitive3d, iso: &Isometry3<f64>) -> Option<Primitive3d> {
    let t = |q: &Point<f64, 3>| iso.transform_point(q);
    Some(match p {
        Primitive3d::Point(wp) => Primitive3d::Point(WeightedPoint::new(t(&wp.point), wp.weight)),
        Primitive3d::Segment(s) => Primitive3d::Segment(Segment::new(t(&s.start), t(&s.end))),
        Primitive3d::Triangle(tri) => {
            let [a, b, c] = tri.vertices;
            Primitive3d::Triangle(Triangle::new(t(&a), t(&b), t(&c)))
        }
        Primitive3d::Cuboid(b) => {
            if iso.rotation.angle() != 0.0 {
                return None;
            }
            Primitive3d::Cuboid(IsoBox::new(t(&b.min), t(&b.max)))
        }
        Primitive3d::Tetrahedron(tet) => {
            let [a, b, c, d] = tet.vertices;
            Primitive3d::Tetrahedron(Tetrahedron::new(t(&a), t(&b), t(&c), t(&d)))
        }
        Primitive3d::Ball(ball) => Primitive3d::Ball(Ball::new(t(&ball.center), ball.radius)),
    })
}

/// Transform a whole primitive set, or `None` if any primitive has no image.
pub fn transform_all_3d(prims: &[Primitive3d], iso: &Isometry3<f64>) -> Option<Vec<Primitive3d>> {
    prims.iter().map(|p| transform_primitive_3d(p, iso)).collect()
}

pub fn transform_all_2d(prims: &[Primitive2d], iso: &Isometry2<f64>) -> Option<Vec<Primitive2d>> {
    prims.iter().map(|p| transform_primitive_2d(p, iso)).collect()
}

pub fn transform_line_2d(line: &Line<2>, iso: &Isometry2<f64>) -> Line<2> {
    Line::new(
        iso.transform_point(&line.point),
        Unit::new_normalize(iso.rotation * line.direction.into_inner()),
    )
}

pub fn transform_line_3d(line: &Line<3>, iso: &Isometry3<f64>) -> Line<3> {
    Line::new(
        iso.transform_point(&line.point),
        Unit::new_normalize(iso.rotation * line.direction.into_inner()),
    )
}

pub fn transform_plane(plane: &Plane, iso: &Isometry3<f64>) -> Plane {
    Plane::new(
        iso.transform_point(&plane.point),
        Unit::new_normalize(iso.rotation * plane.normal.into_inner()),
    )
}

// ── Uniform scaling ─────────────────────────────────────────────────────────

/// Scale every coordinate about the origin by `factor` (expected positive).
/// Point multiplicities are left unchanged.
pub fn scale_primitive_3d(p: &Primitive3d, factor: f64) -> Primitive3d {
    let s = |q: &Point<f64, 3>| Point::from(q.coords * factor);
    match p {
        Primitive3d::Point(wp) => Primitive3d::Point(WeightedPoint::new(s(&wp.point), wp.weight)),
        Primitive3d::Segment(seg) => Primitive3d::Segment(Segment::new(s(&seg.start), s(&seg.end))),
        Primitive3d::Triangle(tri) => {
            let [a, b, c] = tri.vertices;
            Primitive3d::Triangle(Triangle::new(s(&a), s(&b), s(&c)))
        }
        Primitive3d::Cuboid(b) => Primitive3d::Cuboid(IsoBox::new(s(&b.min), s(&b.max))),
        Primitive3d::Tetrahedron(tet) => {
            let [a, b, c, d] = tet.vertices;
            Primitive3d::Tetrahedron(Tetrahedron::new(s(&a), s(&b), s(&c), s(&d)))
        }
        Primitive3d::Ball(ball) => {
            Primitive3d::Ball(Ball::new(s(&ball.center), ball.radius * factor))
        }
    }
}
