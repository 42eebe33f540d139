use log::warn;
use nalgebra::Vector3;

use crate::config::SimParams;
use crate::core::particle::Particle;
use crate::core::repulsion;
use crate::core::steering::{self, SteeringOutcome};
use crate::core::store::{ExportView, ParticleStore};
use crate::error::Result;
use crate::triangulation::{PeriodicTriangulator, ToroidalDelaunay};

/// Summary of one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// What the steering step did this frame.
    pub steering: SteeringOutcome,
}

/// Soft spheres in the periodic unit cube with optional Voronoi steering.
///
/// Each frame runs steering (on its cadence), then repulsion and integration,
/// then refreshes the export buffers. Calls must be serialized by the caller;
/// nothing here is shared between threads.
#[derive(Debug)]
pub struct Simulation<T = ToroidalDelaunay> {
    params: SimParams,
    store: ParticleStore,
    frame: u64,
    triangulator: T,
}

impl Simulation<ToroidalDelaunay> {
    /// Create an empty simulation using the bundled tetrahedralization backend.
    pub fn new(params: SimParams) -> Result<Self> {
        Self::with_triangulator(params, ToroidalDelaunay::new())
    }
}

impl Default for Simulation<ToroidalDelaunay> {
    fn default() -> Self {
        Self {
            params: SimParams::default(),
            store: ParticleStore::new(),
            frame: 0,
            triangulator: ToroidalDelaunay::new(),
        }
    }
}

impl<T: PeriodicTriangulator> Simulation<T> {
    /// Create an empty simulation with a custom tetrahedralization service.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `params` fails validation.
    pub fn with_triangulator(params: SimParams, triangulator: T) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            store: ParticleStore::new(),
            frame: 0,
            triangulator,
        })
    }

    /// Replace the population and reset the frame counter.
    ///
    /// On error the previous population stays in place.
    pub fn initialize(&mut self, count: usize, default_radius: f64, seed: u64) -> Result<()> {
        self.store.initialize(count, default_radius, seed)?;
        self.frame = 0;
        Ok(())
    }

    /// Advance by `dt` seconds. `dt == 0` and an empty population are no-ops.
    ///
    /// `dt` must be non-negative; this is not checked.
    pub fn advance(&mut self, dt: f64) -> StepReport {
        if dt == 0.0 || self.store.is_empty() {
            return StepReport {
                steering: SteeringOutcome::NotScheduled,
            };
        }

        let steering = self.steer(dt);
        repulsion::step(self.store.particles_mut(), &self.params, dt);
        self.store.refresh_buffers();

        StepReport { steering }
    }

    fn steer(&mut self, dt: f64) -> SteeringOutcome {
        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);

        if !self.params.steering_enabled() {
            return SteeringOutcome::Disabled;
        }
        if frame % u64::from(self.params.steering_cadence) != 0 {
            return SteeringOutcome::NotScheduled;
        }
        steering::step(
            self.store.particles_mut(),
            &mut self.triangulator,
            self.params.steering_strength,
            dt,
        )
    }

    /// Current parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Replace the parameters after validating them.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `params` fails validation; the old values stay.
    pub fn set_params(&mut self, params: SimParams) -> Result<()> {
        if let Err(e) = params.validate() {
            warn!("rejected parameter update: {e}");
            return Err(e);
        }
        self.params = params;
        Ok(())
    }

    /// Frames stepped since the last `initialize`.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current population size.
    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    /// Particles in index order.
    pub fn particles(&self) -> &[Particle] {
        self.store.particles()
    }

    /// Packed `[x, y, z]` positions; `None` for an empty population.
    pub fn position_buffer(&self) -> Option<&[f32]> {
        self.store.position_buffer()
    }

    /// One radius per particle; `None` for an empty population.
    pub fn radius_buffer(&self) -> Option<&[f32]> {
        self.store.radius_buffer()
    }

    /// Both buffers with the population generation.
    pub fn export_view(&self) -> Option<ExportView<'_>> {
        self.store.export_view()
    }

    /// Total kinetic energy with unit mass.
    pub fn kinetic_energy(&self) -> f64 {
        self.store.particles().iter().map(Particle::kinetic_energy).sum()
    }

    /// Sum of velocities (unit mass).
    pub fn total_momentum(&self) -> Vector3<f64> {
        self.store
            .particles()
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.velocity)
    }

    /// Largest particle speed.
    pub fn max_speed(&self) -> f64 {
        self.store
            .particles()
            .iter()
            .map(|p| p.velocity.norm())
            .fold(0.0, f64::max)
    }

    /// The tetrahedralization service used by steering.
    pub fn triangulator(&self) -> &T {
        &self.triangulator
    }
}
