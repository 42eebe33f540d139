//! Soft-sphere particles in a periodic unit cube, steered along the long axes
//! of their Voronoi cells.
//!
//! The crate owns particle state, advances it one frame at a time and exposes
//! flat `f32` buffers for a renderer:
//!
//! ```
//! use cherrycore::{SimParams, Simulation};
//!
//! let params = SimParams {
//!     steering_strength: 0.2,
//!     ..SimParams::default()
//! };
//! let mut sim = Simulation::new(params)?;
//! sim.initialize(64, 0.02, 7)?;
//! for _ in 0..10 {
//!     sim.advance(1.0 / 60.0);
//! }
//! let positions = sim.position_buffer().unwrap_or(&[]);
//! assert_eq!(positions.len(), 64 * 3);
//! # Ok::<(), cherrycore::error::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod triangulation;

pub use crate::config::SimParams;
pub use crate::core::{Simulation, SteeringOutcome, StepReport};
pub use crate::triangulation::{PeriodicTriangulator, Tetrahedron, ToroidalDelaunay};
