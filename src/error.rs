use std::collections::TryReserveError;

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core.
///
/// Only initialization, configuration and the triangulation collaborator report
/// errors. Geometric degeneracies inside a frame are recovered where they occur
/// and never reach the caller of `Simulation::advance`.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical issue inside a collaborator (e.g. a non-finite coordinate).
    #[error("numerical error: {0}")]
    MathError(String),

    /// The tetrahedralization service could not triangulate the point set.
    #[error("triangulation failed: {0}")]
    Triangulation(String),

    /// Buffers for a new population could not be reserved.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Malformed configuration document.
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}
