//! Simulation core: periodic geometry, particle state and the two per-frame steps.
//!
//! Frame order is steering (on its cadence), then repulsion and integration,
//! then an export-buffer refresh. See [`Simulation::advance`].

pub mod particle;
pub mod periodic;
pub mod repulsion;
pub mod sim;
pub mod steering;
pub mod store;

pub use particle::Particle;
pub use sim::{Simulation, StepReport};
pub use steering::SteeringOutcome;
pub use store::{ExportView, ParticleStore};
