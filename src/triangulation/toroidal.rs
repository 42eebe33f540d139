//! Periodic Delaunay tetrahedralization backed by the `delaunay` crate.
//!
//! The builder's image-point construction copies every point into the 27
//! neighbouring images, triangulates the expanded set and keeps the quotient
//! cells of the fundamental domain. Every quotient cell is reported once, and
//! its vertex references are already base indices.

use std::collections::HashMap;

use delaunay::core::builder::DelaunayTriangulationBuilder;
use delaunay::core::vertex::{Vertex, VertexBuilder};
use delaunay::geometry::kernel::RobustKernel;
use delaunay::geometry::point::Point;
use delaunay::geometry::traits::coordinate::Coordinate;
use log::trace;
use nalgebra::Point3;

use super::{PeriodicTriangulator, Tetrahedron};
use crate::core::particle::DIM;
use crate::error::{Error, Result};

/// Fewest points the image-point construction accepts (`2 * DIM + 1`).
pub const MIN_POINTS: usize = 2 * DIM + 1;

/// True periodic tetrahedralization of the cube `[0, period)^3`.
///
/// Holds no state between calls; the robust predicate kernel is created per
/// request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToroidalDelaunay;

impl ToroidalDelaunay {
    /// New backend.
    pub fn new() -> Self {
        Self
    }
}

fn to_vertices(points: &[Point3<f64>]) -> Result<Vec<Vertex<f64, (), DIM>>> {
    points
        .iter()
        .map(|p| {
            VertexBuilder::default()
                .point(Point::new([p.x, p.y, p.z]))
                .build()
                .map_err(|e| Error::Triangulation(format!("vertex construction: {e}")))
        })
        .collect()
}

impl PeriodicTriangulator for ToroidalDelaunay {
    fn triangulate(&mut self, period: f64, points: &[Point3<f64>]) -> Result<Vec<Tetrahedron>> {
        let n = points.len();
        if n < MIN_POINTS {
            return Err(Error::Triangulation(format!(
                "need at least {MIN_POINTS} points, got {n}"
            )));
        }
        if !period.is_finite() || period <= 0.0 {
            return Err(Error::Triangulation("period must be finite and > 0".into()));
        }
        if !points.iter().all(|p| p.iter().all(|c| c.is_finite())) {
            return Err(Error::MathError("point coordinates must be finite".into()));
        }

        let vertices = to_vertices(points)?;
        // Quotient vertices keep the uuid of the input vertex they came from.
        let index: HashMap<_, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.uuid(), i))
            .collect();

        let kernel = RobustKernel::<f64>::new();
        let dt = DelaunayTriangulationBuilder::new(&vertices)
            .toroidal_periodic([period; DIM])
            .build_with_kernel::<_, ()>(&kernel)
            .map_err(|e| Error::Triangulation(e.to_string()))?;

        let tds = dt.tds();
        let mut out = Vec::with_capacity(tds.number_of_cells());
        for key in tds.cell_keys() {
            let Some(cell) = tds.get_cell(key) else {
                continue;
            };
            let keys = cell.vertices();
            if keys.len() != DIM + 1 {
                return Err(Error::Triangulation(format!(
                    "cell with {} vertices in a 3-d triangulation",
                    keys.len()
                )));
            }
            let mut refs = [0usize; DIM + 1];
            for (slot, vk) in refs.iter_mut().zip(keys.iter()) {
                *slot = tds
                    .get_vertex_by_key(*vk)
                    .and_then(|v| index.get(&v.uuid()))
                    .copied()
                    .ok_or_else(|| {
                        Error::Triangulation("cell references an unknown vertex".into())
                    })?;
            }
            refs.sort_unstable();
            out.push(Tetrahedron::new(refs));
        }

        if out.is_empty() {
            return Err(Error::Triangulation("no cells in the periodic quotient".into()));
        }
        // Storage order inside the crate is not part of its contract.
        out.sort_unstable_by_key(|t| t.vertices);
        trace!("tetrahedralized {n} points into {} periodic cells", out.len());
        Ok(out)
    }
}
