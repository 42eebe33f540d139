//! Authoritative particle state plus the flat buffers handed to a renderer.

use log::info;
use nalgebra::Point3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::particle::{Particle, DIM};
use crate::error::{Error, Result};

/// Largest `f32` strictly below 1.
const UNIT_F32_MAX: f32 = 1.0 - f32::EPSILON / 2.0;

/// Narrow a unit-cube coordinate to `f32` without rounding up to 1.0.
#[inline]
fn unit_to_f32(x: f64) -> f32 {
    let y = x as f32;
    if y >= 1.0 {
        UNIT_F32_MAX
    } else {
        y
    }
}

/// Read-only view of the export buffers for one population generation.
///
/// The view borrows the store, so it cannot outlive the next `advance` or
/// `initialize` call.
#[derive(Debug, Clone, Copy)]
pub struct ExportView<'a> {
    /// Packed `[x0, y0, z0, x1, y1, z1, ...]`.
    pub positions: &'a [f32],
    /// One radius per particle.
    pub radii: &'a [f32],
    /// Population generation the buffers belong to.
    pub generation: u64,
}

impl ExportView<'_> {
    /// Number of particles described by the view.
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// Whether the view describes no particles.
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
}

/// Fixed-size particle population, indexed `0..N`.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    positions: Vec<f32>,
    radii: Vec<f32>,
    generation: u64,
}

impl ParticleStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the population with `count` resting particles of `default_radius`,
    /// placed uniformly in the unit cube by a generator seeded with `seed`.
    ///
    /// Everything is built off to the side, so on error the previous population
    /// and buffers are left untouched.
    ///
    /// Errors:
    /// - `Error::InvalidParam` for a non-positive or non-finite radius, or a count
    ///   that does not fit the id space.
    /// - `Error::Allocation` if the new buffers cannot be reserved.
    pub fn initialize(&mut self, count: usize, default_radius: f64, seed: u64) -> Result<()> {
        if !default_radius.is_finite() || default_radius <= 0.0 {
            return Err(Error::InvalidParam(
                "default_radius must be finite and > 0".into(),
            ));
        }
        if u32::try_from(count).is_err() {
            return Err(Error::InvalidParam(format!(
                "particle count {count} exceeds the id space"
            )));
        }

        let mut particles: Vec<Particle> = Vec::new();
        particles.try_reserve_exact(count)?;
        let mut positions: Vec<f32> = Vec::new();
        positions.try_reserve_exact(count * DIM)?;
        let mut radii: Vec<f32> = Vec::new();
        radii.try_reserve_exact(count)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for id in 0..(count as u32) {
            let x = rng.random_range(0.0..1.0);
            let y = rng.random_range(0.0..1.0);
            let z = rng.random_range(0.0..1.0);
            particles.push(Particle::new(id, Point3::new(x, y, z), default_radius)?);
        }
        positions.resize(count * DIM, 0.0);
        radii.resize(count, 0.0);

        self.particles = particles;
        self.positions = positions;
        self.radii = radii;
        self.generation = self.generation.wrapping_add(1);
        self.refresh_buffers();

        info!(
            "initialized {} particles (radius {}, seed {}, generation {})",
            count, default_radius, seed, self.generation
        );
        Ok(())
    }

    /// Current population size.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the population is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Incremented on every successful `initialize`.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All particles, index-aligned with the export buffers.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Positions as full-precision points.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Packed positions, three floats per particle; `None` for an empty population.
    pub fn position_buffer(&self) -> Option<&[f32]> {
        if self.positions.is_empty() {
            None
        } else {
            Some(&self.positions)
        }
    }

    /// Radii, one float per particle; `None` for an empty population.
    pub fn radius_buffer(&self) -> Option<&[f32]> {
        if self.radii.is_empty() {
            None
        } else {
            Some(&self.radii)
        }
    }

    /// Both export buffers tagged with the current generation.
    pub fn export_view(&self) -> Option<ExportView<'_>> {
        if self.particles.is_empty() {
            return None;
        }
        Some(ExportView {
            positions: &self.positions,
            radii: &self.radii,
            generation: self.generation,
        })
    }

    /// Copy particle state into the export buffers.
    pub(crate) fn refresh_buffers(&mut self) {
        for ((p, pos), r) in self
            .particles
            .iter()
            .zip(self.positions.chunks_exact_mut(DIM))
            .zip(self.radii.iter_mut())
        {
            pos[0] = unit_to_f32(p.position.x);
            pos[1] = unit_to_f32(p.position.y);
            pos[2] = unit_to_f32(p.position.z);
            *r = p.radius() as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_fills_population() -> Result<()> {
        let mut store = ParticleStore::new();
        store.initialize(16, 0.02, 9)?;
        assert_eq!(store.len(), 16);
        assert_eq!(store.generation(), 1);
        for (i, p) in store.particles().iter().enumerate() {
            assert_eq!(p.id as usize, i);
            assert_eq!(p.radius(), 0.02);
            assert!(p.velocity.iter().all(|&v| v == 0.0));
            assert!(p.position.iter().all(|&c| (0.0..1.0).contains(&c)));
        }
        assert_eq!(store.position_buffer().map(<[f32]>::len), Some(48));
        assert_eq!(store.radius_buffer().map(<[f32]>::len), Some(16));
        Ok(())
    }

    #[test]
    fn same_seed_same_population() -> Result<()> {
        let mut a = ParticleStore::new();
        let mut b = ParticleStore::new();
        a.initialize(32, 0.01, 42)?;
        b.initialize(32, 0.01, 42)?;
        assert_eq!(a.particles(), b.particles());
        b.initialize(32, 0.01, 43)?;
        assert_ne!(a.particles(), b.particles());
        Ok(())
    }

    #[test]
    fn buffers_mirror_particles() -> Result<()> {
        let mut store = ParticleStore::new();
        store.initialize(5, 0.05, 1)?;
        let view = store.export_view().ok_or_else(|| Error::InvalidParam("empty".into()))?;
        assert_eq!(view.len(), 5);
        for (i, p) in store.particles().iter().enumerate() {
            assert_eq!(view.positions[3 * i], p.position.x as f32);
            assert_eq!(view.positions[3 * i + 1], p.position.y as f32);
            assert_eq!(view.positions[3 * i + 2], p.position.z as f32);
            assert_eq!(view.radii[i], 0.05_f32);
        }
        Ok(())
    }

    #[test]
    fn empty_population_exports_nothing() -> Result<()> {
        let mut store = ParticleStore::new();
        assert!(store.position_buffer().is_none());
        store.initialize(4, 0.1, 0)?;
        store.initialize(0, 0.1, 0)?;
        assert!(store.is_empty());
        assert!(store.position_buffer().is_none());
        assert!(store.radius_buffer().is_none());
        assert!(store.export_view().is_none());
        assert_eq!(store.generation(), 2);
        Ok(())
    }

    #[test]
    fn failed_initialize_keeps_previous_population() -> Result<()> {
        let mut store = ParticleStore::new();
        store.initialize(8, 0.1, 5)?;
        let before = store.particles().to_vec();
        assert!(store.initialize(8, -1.0, 5).is_err());
        assert_eq!(store.particles(), &before[..]);
        assert_eq!(store.generation(), 1);
        Ok(())
    }

    #[test]
    fn narrowing_never_reaches_one() {
        assert!(unit_to_f32(0.999_999_999_9) < 1.0);
        assert_eq!(unit_to_f32(0.5), 0.5);
    }
}
