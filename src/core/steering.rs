//! Voronoi steering: nudge each particle along the long axis of its Voronoi cell.
//!
//! The Voronoi vertices around a particle are the circumcenters of its incident
//! Delaunay tetrahedra. Their principal component is the cell's dominant axis.

use log::{debug, trace};
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

use crate::core::particle::Particle;
use crate::core::periodic::{circumcenter, unwrap_around};
use crate::triangulation::{PeriodicTriangulator, Tetrahedron};

/// Minimum population, and minimum samples per particle, for steering.
pub const MIN_SAMPLES: usize = 4;

/// Convergence threshold for the symmetric eigen solver.
const EIGEN_EPS: f64 = 1e-12;

/// Iteration cap for the symmetric eigen solver; exceeding it skips the particle.
const EIGEN_MAX_ITER: usize = 64;

/// What the steering step did on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringOutcome {
    /// Steering strength or cadence is zero.
    Disabled,
    /// The frame counter is not on the steering cadence.
    NotScheduled,
    /// Fewer particles than a tetrahedron needs.
    TooFewParticles,
    /// The triangulation failed or was empty; no velocity changed.
    Aborted,
    /// Steering ran and changed `steered` particles.
    Applied { steered: usize },
}

/// Per-particle Voronoi vertex samples for one steering pass.
///
/// Each tetrahedron contributes one circumcenter to each of its four particles,
/// computed after unwrapping the other three vertices around that particle.
pub fn incident_circumcenters(
    positions: &[Point3<f64>],
    tetrahedra: &[Tetrahedron],
) -> Vec<Vec<Point3<f64>>> {
    let n = positions.len();
    let mut samples: Vec<Vec<Point3<f64>>> = vec![Vec::new(); n];
    if n == 0 {
        return samples;
    }
    for tet in tetrahedra {
        let verts = tet.base_vertices(n);
        for &center in &verts {
            let origin = positions[center];
            let [a, b, c, d] = verts.map(|v| unwrap_around(&origin, &positions[v]));
            samples[center].push(circumcenter(&a, &b, &c, &d));
        }
    }
    samples
}

/// Unit eigenvector of the largest eigenvalue of the sample covariance.
///
/// `None` with fewer than [`MIN_SAMPLES`] samples or when the eigen solver does
/// not converge.
pub fn principal_axis(samples: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let count = samples.len();
    if count < MIN_SAMPLES {
        return None;
    }
    let mean = samples
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords)
        / count as f64;
    let mut cov = Matrix3::zeros();
    for p in samples {
        let d = p.coords - mean;
        cov += d * d.transpose();
    }
    cov /= (count - 1).max(1) as f64;

    let eig = SymmetricEigen::try_new(cov, EIGEN_EPS, EIGEN_MAX_ITER)?;
    let mut best = 0;
    for k in 1..3 {
        if eig.eigenvalues[k] > eig.eigenvalues[best] {
            best = k;
        }
    }
    let axis: Vector3<f64> = eig.eigenvectors.column(best).into_owned();
    let norm = axis.norm();
    if !norm.is_finite() || norm == 0.0 {
        return None;
    }
    Some(axis / norm)
}

/// Flip `axis` to point along `velocity`.
///
/// A resting particle gets the sign that makes the largest-magnitude component
/// of the axis positive (lowest index on ties), so the result is deterministic.
pub fn orient_axis(axis: Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
    if velocity.norm_squared() > 0.0 {
        return if axis.dot(velocity) >= 0.0 { axis } else { -axis };
    }
    let mut lead = 0;
    for k in 1..3 {
        if axis[k].abs() > axis[lead].abs() {
            lead = k;
        }
    }
    if axis[lead] >= 0.0 {
        axis
    } else {
        -axis
    }
}

/// Run one steering pass over `particles`.
///
/// The triangulation is requested first; if it fails or comes back empty the
/// pass is abandoned without touching any velocity. Otherwise every particle
/// with enough samples and a convergent eigen solve receives
/// `strength * axis * dt`.
pub fn step<T>(
    particles: &mut [Particle],
    triangulator: &mut T,
    strength: f64,
    dt: f64,
) -> SteeringOutcome
where
    T: PeriodicTriangulator + ?Sized,
{
    if particles.len() < MIN_SAMPLES {
        return SteeringOutcome::TooFewParticles;
    }
    let positions: Vec<Point3<f64>> = particles.iter().map(|p| p.position).collect();

    let tetrahedra = match triangulator.triangulate(1.0, &positions) {
        Ok(t) => t,
        Err(e) => {
            debug!("steering skipped this frame: {e}");
            return SteeringOutcome::Aborted;
        }
    };
    if tetrahedra.is_empty() {
        debug!("steering skipped this frame: no tetrahedra");
        return SteeringOutcome::Aborted;
    }

    let samples = incident_circumcenters(&positions, &tetrahedra);
    let mut steered = 0;
    for (p, cell) in particles.iter_mut().zip(&samples) {
        let Some(axis) = principal_axis(cell) else {
            continue;
        };
        let axis = orient_axis(axis, &p.velocity);
        p.velocity += axis * (strength * dt);
        steered += 1;
    }
    trace!(
        "steered {steered}/{} particles from {} tetrahedra",
        particles.len(),
        tetrahedra.len()
    );
    SteeringOutcome::Applied { steered }
}
