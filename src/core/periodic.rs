//! Periodic unit-cube geometry.
//!
//! All helpers assume a period of 1 along every axis. Rounding for the minimum
//! image uses `f64::round` (half away from zero) and then folds the `+0.5`
//! endpoint onto `-0.5`, so every component lands in `[-0.5, 0.5)`.

use nalgebra::{Matrix3, Point3, Vector3};

/// Relative determinant threshold below which a tetrahedron counts as flat.
const DEGENERATE_VOLUME_EPS: f64 = 1e-12;

/// Map any real coordinate into `[0, 1)`.
#[inline]
pub fn wrap(v: f64) -> f64 {
    let r = v - v.floor();
    // Tiny negative inputs round up to exactly 1.0.
    if r >= 1.0 {
        0.0
    } else {
        r
    }
}

/// Wrap every coordinate of a point into the unit cube.
#[inline]
pub fn wrap_point(p: Point3<f64>) -> Point3<f64> {
    Point3::new(wrap(p.x), wrap(p.y), wrap(p.z))
}

/// Reduce one displacement component to its representative in `[-0.5, 0.5)`.
#[inline]
pub fn minimum_image(d: f64) -> f64 {
    let r = d - d.round();
    if r >= 0.5 {
        r - 1.0
    } else {
        r
    }
}

/// Component-wise minimum image of a displacement vector.
#[inline]
pub fn minimum_image_vec(d: Vector3<f64>) -> Vector3<f64> {
    d.map(minimum_image)
}

/// Shortest periodic displacement from `a` to `b`.
#[inline]
pub fn displacement(a: &Point3<f64>, b: &Point3<f64>) -> Vector3<f64> {
    minimum_image_vec(b - a)
}

/// Place `p` at its periodic image closest to `reference`.
#[inline]
pub fn unwrap_around(reference: &Point3<f64>, p: &Point3<f64>) -> Point3<f64> {
    reference + displacement(reference, p)
}

/// Circumcenter of a tetrahedron.
///
/// Solves `M x = rhs` with rows `b-a, c-a, d-a` and `rhs_k = |row_k|^2 / 2`, then
/// returns `a + x`. A flat or near-flat tetrahedron yields the vertex centroid
/// instead, so the result is always finite for finite input.
pub fn circumcenter(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Point3<f64> {
    try_circumcenter(a, b, c, d).unwrap_or_else(|| centroid(a, b, c, d))
}

/// Circumcenter of a tetrahedron, or `None` if it is (nearly) flat.
pub fn try_circumcenter(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<Point3<f64>> {
    let u = b - a;
    let v = c - a;
    let w = d - a;

    let scale = u.norm() * v.norm() * w.norm();
    let m = Matrix3::from_rows(&[u.transpose(), v.transpose(), w.transpose()]);
    if !(scale > 0.0 && m.determinant().abs() > DEGENERATE_VOLUME_EPS * scale) {
        return None;
    }
    let rhs = Vector3::new(u.norm_squared(), v.norm_squared(), w.norm_squared()) * 0.5;
    let x = m.lu().solve(&rhs)?;
    if x.iter().all(|c| c.is_finite()) {
        Some(a + x)
    } else {
        None
    }
}

/// Unweighted centroid of four points.
#[inline]
pub fn centroid(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Point3<f64> {
    Point3::from((a.coords + b.coords + c.coords + d.coords) * 0.25)
}
