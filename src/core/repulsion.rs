//! Soft-sphere repulsion, damping and periodic integration.

use nalgebra::Vector3;

use crate::config::SimParams;
use crate::core::particle::Particle;
use crate::core::periodic::{displacement, wrap_point};

/// Velocity impulse that particle `b` receives from its contact with `a`.
///
/// `a` receives the negation. Returns `None` when the spheres do not overlap
/// or sit exactly on top of each other (no direction to push along).
#[inline]
pub fn contact_impulse(
    a: &Particle,
    b: &Particle,
    repulsion_strength: f64,
    dt: f64,
) -> Option<Vector3<f64>> {
    let d = displacement(&a.position, &b.position);
    let dist2 = d.norm_squared();
    if dist2 <= 0.0 {
        return None;
    }
    let sum_r = a.radius() + b.radius();
    if dist2 >= sum_r * sum_r {
        return None;
    }
    let dist = dist2.sqrt();
    let overlap = sum_r - dist;
    if overlap <= 0.0 {
        return None;
    }
    let force = repulsion_strength * overlap;
    Some(d * (force * dt / dist))
}

/// Apply every pairwise contact impulse exactly once, in `(i, j)` order with `i < j`.
pub fn apply_repulsion(particles: &mut [Particle], repulsion_strength: f64, dt: f64) {
    let n = particles.len();
    for i in 0..n {
        let (head, tail) = particles.split_at_mut(i + 1);
        let pi = &mut head[i];
        for pj in tail.iter_mut() {
            if let Some(impulse) = contact_impulse(pi, pj, repulsion_strength, dt) {
                pi.velocity -= impulse;
                pj.velocity += impulse;
            }
        }
    }
}

/// Damp velocities and drift positions, wrapping back into the unit cube.
pub fn damp_and_drift(particles: &mut [Particle], damping_factor: f64, dt: f64) {
    for p in particles.iter_mut() {
        p.velocity *= damping_factor;
        p.position = wrap_point(p.position + p.velocity * dt);
    }
}

/// One repulsion-integration step. `dt == 0` leaves every particle untouched.
///
/// Inputs are not validated: `dt` must be non-negative and radii positive.
pub fn step(particles: &mut [Particle], params: &SimParams, dt: f64) {
    if dt == 0.0 || particles.is_empty() {
        return;
    }
    apply_repulsion(particles, params.repulsion_strength, dt);
    damp_and_drift(particles, params.damping_factor(dt), dt);
}
