//! Independent reference moments by exact low-order quadrature.
//!
//! Second moments are integrals of quadratic polynomials, so each rule below
//! is exact for them: two-point Gauss on segments, the edge-midpoint rule on
//! triangles, the degree-2 four-point rule on tetrahedra and tensor-product
//! Gauss on boxes. Measures are computed by routes different from the
//! engine's (Kahan's stable Heron formula for triangle area, the triple
//! product for tetrahedron volume), and the fit-dimension decompositions are
//! rebuilt from vertices here: cuboid faces are split into two triangles and
//! box edges are found as corner pairs differing along one axis.
//!
//! Disks and balls have no reference and yield `None`.

use cad_pca::nalgebra::{Point, SMatrix, SVector, Vector2, Vector3};
use cad_pca::{FitDimension, IsoBox, Moments, Primitive2d, Primitive3d};

/// Centroid, covariance and total weight computed directly from summed
/// moments, with eigenvalues from nalgebra's iterative solver.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceStats<const D: usize> {
    pub centroid: Point<f64, D>,
    pub covariance: SMatrix<f64, D, D>,
    pub eigenvalues: SVector<f64, D>,
    pub total_weight: f64,
}

// ── Quadrature rules ────────────────────────────────────────────────────────

fn node<const D: usize>(m: &mut Moments<D>, x: SVector<f64, D>, w: f64) {
    m.weight += w;
    m.first += x * w;
    m.second += x * x.transpose() * w;
}

/// Point masses at the given nodes.
fn rule<const D: usize>(nodes: &[(SVector<f64, D>, f64)]) -> Moments<D> {
    let mut m = Moments::zero();
    for &(x, w) in nodes {
        node(&mut m, x, w);
    }
    m
}

fn point_mass<const D: usize>(p: &Point<f64, D>, w: f64) -> Moments<D> {
    rule(&[(p.coords, w)])
}

fn gauss_segment<const D: usize>(a: &Point<f64, D>, b: &Point<f64, D>) -> Moments<D> {
    let length = (b - a).norm();
    let s = 0.5 / 3f64.sqrt();
    let mid = a.coords.lerp(&b.coords, 0.5);
    let d = b - a;
    rule(&[(mid - d * s, length / 2.0), (mid + d * s, length / 2.0)])
}

/// Kahan's numerically stable form of Heron's formula.
fn heron_area(a: f64, b: f64, c: f64) -> f64 {
    let mut s = [a, b, c];
    s.sort_by(|x, y| y.total_cmp(x));
    let [a, b, c] = s;
    let q = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    0.25 * q.max(0.0).sqrt()
}

fn midpoint_triangle<const D: usize>(
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
) -> Moments<D> {
    let area = heron_area((b - a).norm(), (c - b).norm(), (a - c).norm());
    let (a, b, c) = (a.coords, b.coords, c.coords);
    rule(&[
        ((a + b) / 2.0, area / 3.0),
        ((b + c) / 2.0, area / 3.0),
        ((c + a) / 2.0, area / 3.0),
    ])
}

fn four_point_tetrahedron(v: &[Point<f64, 3>; 4]) -> Moments<3> {
    let [a, b, c, d] = *v;
    let volume = (b - a).cross(&(c - a)).dot(&(d - a)).abs() / 6.0;
    let alpha: f64 = 0.585_410_196_624_968_5;
    let beta: f64 = 0.138_196_601_125_010_5;
    let nodes: Vec<_> = (0..4)
        .map(|k| {
            let mut x = Vector3::zeros();
            for (i, p) in v.iter().enumerate() {
                x += p.coords * if i == k { alpha } else { beta };
            }
            (x, volume / 4.0)
        })
        .collect();
    rule(&nodes)
}

/// Tensor-product two-point Gauss over a box.
fn gauss_box<const D: usize>(min: SVector<f64, D>, max: SVector<f64, D>) -> Moments<D> {
    let center = (min + max) / 2.0;
    let half = (max - min) / 2.0;
    let measure: f64 = (max - min).iter().product();
    let count = 1usize << D;
    let s = 1.0 / 3f64.sqrt();
    let nodes: Vec<_> = (0..count)
        .map(|mask| {
            let mut x = center;
            for axis in 0..D {
                let sign = if mask & (1 << axis) == 0 { -1.0 } else { 1.0 };
                x[axis] += sign * s * half[axis];
            }
            (x, measure / count as f64)
        })
        .collect();
    rule(&nodes)
}

// ── Decompositions ──────────────────────────────────────────────────────────

fn box_corners<const D: usize>(b: &IsoBox<D>) -> Vec<Point<f64, D>> {
    (0..1usize << D)
        .map(|mask| {
            let mut p = b.min;
            for axis in 0..D {
                if mask & (1 << axis) != 0 {
                    p[axis] = b.max[axis];
                }
            }
            p
        })
        .collect()
}

fn box_edges<const D: usize>(b: &IsoBox<D>) -> Vec<(Point<f64, D>, Point<f64, D>)> {
    let corners = box_corners(b);
    let mut edges = Vec::new();
    for i in 0..corners.len() {
        for j in i + 1..corners.len() {
            if (i ^ j).count_ones() == 1 {
                edges.push((corners[i], corners[j]));
            }
        }
    }
    edges
}

fn cuboid_faces(b: &IsoBox<3>) -> Moments<3> {
    let c = box_corners(b);
    let quads = [
        [0, 2, 6, 4],
        [1, 3, 7, 5],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 1, 3, 2],
        [4, 5, 7, 6],
    ];
    let mut total = Moments::zero();
    for [p, q, r, s] in quads {
        total += midpoint_triangle(&c[p], &c[q], &c[r]);
        total += midpoint_triangle(&c[p], &c[r], &c[s]);
    }
    total
}

fn sum<const D: usize>(parts: impl IntoIterator<Item = Moments<D>>) -> Moments<D> {
    parts.into_iter().fold(Moments::zero(), |a, b| a + b)
}

fn unit_masses<const D: usize>(points: &[Point<f64, D>]) -> Moments<D> {
    sum(points.iter().map(|v| point_mass(v, 1.0)))
}

fn edge_sum<const D: usize>(edges: &[(Point<f64, D>, Point<f64, D>)]) -> Moments<D> {
    sum(edges.iter().map(|(a, b)| gauss_segment(a, b)))
}

/// Reference moments of a 2D primitive, or `None` when the primitive has
/// no mass at `dimension` or no reference rule.
pub fn reference_moments_2d(p: &Primitive2d, dimension: FitDimension) -> Option<Moments<2>> {
    use FitDimension::*;
    match (p, dimension) {
        (Primitive2d::Point(wp), Points) => Some(point_mass(&wp.point, wp.weight)),
        (Primitive2d::Segment(s), Points) => Some(unit_masses(&[s.start, s.end])),
        (Primitive2d::Segment(s), Curves) => Some(gauss_segment(&s.start, &s.end)),
        (Primitive2d::Triangle(t), Points) => Some(unit_masses(&t.vertices)),
        (Primitive2d::Triangle(t), Curves) => {
            let [a, b, c] = t.vertices;
            Some(gauss_segment(&a, &b) + gauss_segment(&b, &c) + gauss_segment(&c, &a))
        }
        (Primitive2d::Triangle(t), Surfaces) => {
            let [a, b, c] = t.vertices;
            Some(midpoint_triangle(&a, &b, &c))
        }
        (Primitive2d::Rectangle(b), Points) => Some(unit_masses(&box_corners(b))),
        (Primitive2d::Rectangle(b), Curves) => Some(edge_sum(&box_edges(b))),
        (Primitive2d::Rectangle(b), Surfaces) => Some(gauss_box(b.min.coords, b.max.coords)),
        _ => None,
    }
}

/// Reference moments of a 3D primitive, or `None` when the primitive has
/// no mass at `dimension` or no reference rule.
pub fn reference_moments_3d(p: &Primitive3d, dimension: FitDimension) -> Option<Moments<3>> {
    use FitDimension::*;
    match (p, dimension) {
        (Primitive3d::Point(wp), Points) => Some(point_mass(&wp.point, wp.weight)),
        (Primitive3d::Segment(s), Points) => Some(unit_masses(&[s.start, s.end])),
        (Primitive3d::Segment(s), Curves) => Some(gauss_segment(&s.start, &s.end)),
        (Primitive3d::Triangle(t), Points) => Some(unit_masses(&t.vertices)),
        (Primitive3d::Triangle(t), Curves) => {
            let [a, b, c] = t.vertices;
            Some(gauss_segment(&a, &b) + gauss_segment(&b, &c) + gauss_segment(&c, &a))
        }
        (Primitive3d::Triangle(t), Surfaces) => {
            let [a, b, c] = t.vertices;
            Some(midpoint_triangle(&a, &b, &c))
        }
        (Primitive3d::Cuboid(b), Points) => Some(unit_masses(&box_corners(b))),
        (Primitive3d::Cuboid(b), Curves) => Some(edge_sum(&box_edges(b))),
        (Primitive3d::Cuboid(b), Surfaces) => Some(cuboid_faces(b)),
        (Primitive3d::Cuboid(b), Volumes) => Some(gauss_box(b.min.coords, b.max.coords)),
        (Primitive3d::Tetrahedron(t), Points) => Some(unit_masses(&t.vertices)),
        (Primitive3d::Tetrahedron(t), Curves) => {
            let [a, b, c, d] = t.vertices;
            Some(edge_sum(&[(a, b), (a, c), (a, d), (b, c), (b, d), (c, d)]))
        }
        (Primitive3d::Tetrahedron(t), Surfaces) => {
            let [a, b, c, d] = t.vertices;
            let faces = [(b, c, d), (a, c, d), (a, b, d), (a, b, c)];
            Some(sum(faces.iter().map(|(p, q, r)| midpoint_triangle(p, q, r))))
        }
        (Primitive3d::Tetrahedron(t), Volumes) => Some(four_point_tetrahedron(&t.vertices)),
        _ => None,
    }
}

// ── Statistics ──────────────────────────────────────────────────────────────

fn centered<const D: usize>(m: &Moments<D>) -> (Point<f64, D>, SMatrix<f64, D, D>) {
    let c = m.first / m.weight;
    let mut cov = m.second - c * c.transpose() * m.weight;
    cov = (cov + cov.transpose()) / 2.0;
    (Point::from(c), cov)
}

fn descending<const D: usize>(mut v: SVector<f64, D>) -> SVector<f64, D> {
    v.as_mut_slice().sort_by(|a, b| b.total_cmp(a));
    v
}

pub fn reference_stats_2d(
    prims: &[Primitive2d],
    dimension: FitDimension,
) -> Option<ReferenceStats<2>> {
    let total = prims
        .iter()
        .map(|p| reference_moments_2d(p, dimension))
        .sum::<Option<Moments<2>>>()?;
    if !(total.weight > 0.0) {
        return None;
    }
    let (centroid, covariance) = centered(&total);
    let eigenvalues: Vector2<f64> = descending(covariance.symmetric_eigenvalues());
    Some(ReferenceStats {
        centroid,
        covariance,
        eigenvalues,
        total_weight: total.weight,
    })
}

pub fn reference_stats_3d(
    prims: &[Primitive3d],
    dimension: FitDimension,
) -> Option<ReferenceStats<3>> {
    let total = prims
        .iter()
        .map(|p| reference_moments_3d(p, dimension))
        .sum::<Option<Moments<3>>>()?;
    if !(total.weight > 0.0) {
        return None;
    }
    let (centroid, covariance) = centered(&total);
    let eigenvalues: Vector3<f64> = descending(covariance.symmetric_eigenvalues());
    Some(ReferenceStats {
        centroid,
        covariance,
        eigenvalues,
        total_weight: total.weight,
    })
}
