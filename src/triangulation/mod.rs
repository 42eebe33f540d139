//! Periodic tetrahedralization service.
//!
//! The steering step only depends on [`PeriodicTriangulator`];
//! [`ToroidalDelaunay`] is the backend bundled with the crate.

use nalgebra::Point3;

use crate::error::Result;

pub mod toroidal;

pub use toroidal::ToroidalDelaunay;

/// Four vertex references into the triangulated point set.
///
/// A reference `r` may be `>= N` when it names a periodic replica; the base
/// point is always `r % N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetrahedron {
    /// Raw vertex references as reported by the backend.
    pub vertices: [usize; 4],
}

impl Tetrahedron {
    /// Tetrahedron over four vertex references.
    pub fn new(vertices: [usize; 4]) -> Self {
        Self { vertices }
    }

    /// Vertex references reduced to base point indices.
    ///
    /// With `n == 0` there is nothing to reduce into and the references are
    /// returned unchanged.
    #[inline]
    pub fn base_vertices(&self, n: usize) -> [usize; 4] {
        self.vertices.map(|v| v.checked_rem(n).unwrap_or(v))
    }
}

/// A source of tetrahedralizations of points in a periodic cube.
pub trait PeriodicTriangulator {
    /// Tetrahedralize `points`, all inside `[0, period)^3`.
    ///
    /// Returned tetrahedra are canonical modulo the periodic domain: a cell
    /// and its translate by a whole period are reported once. No ordering is
    /// guaranteed.
    ///
    /// Errors:
    /// - `Error::Triangulation` when the point set cannot be tetrahedralized.
    fn triangulate(&mut self, period: f64, points: &[Point3<f64>]) -> Result<Vec<Tetrahedron>>;
}

impl<T: PeriodicTriangulator + ?Sized> PeriodicTriangulator for Box<T> {
    fn triangulate(&mut self, period: f64, points: &[Point3<f64>]) -> Result<Vec<Tetrahedron>> {
        (**self).triangulate(period, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_vertices_reduce_replicas() {
        let t = Tetrahedron::new([3, 13, 27, 9]);
        assert_eq!(t.base_vertices(10), [3, 3, 7, 9]);
    }

    #[test]
    fn empty_point_set_leaves_references_alone() {
        let t = Tetrahedron::new([3, 13, 27, 9]);
        assert_eq!(t.base_vertices(0), t.vertices);
    }

    #[test]
    fn boxed_backends_forward() {
        struct Fixed;
        impl PeriodicTriangulator for Fixed {
            fn triangulate(&mut self, _: f64, _: &[Point3<f64>]) -> Result<Vec<Tetrahedron>> {
                Ok(vec![Tetrahedron::new([0, 1, 2, 3])])
            }
        }
        let mut boxed: Box<dyn PeriodicTriangulator> = Box::new(Fixed);
        let tets = boxed.triangulate(1.0, &[]).unwrap_or_default();
        assert_eq!(tets.len(), 1);
    }
}
