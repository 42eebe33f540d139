use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// Fixed spatial dimension (3D).
pub const DIM: usize = 3;

/// A soft sphere in the periodic unit cube.
///
/// Fields:
/// - `id`: creation-order index, for selection and debugging only
/// - `position`: always inside `[0, 1)^3` between frames
/// - `velocity`: units per second
/// - `radius`: soft-contact radius (> 0)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable particle identifier.
    pub id: u32,
    /// Position in the unit cube.
    pub position: Point3<f64>,
    /// Velocity.
    pub velocity: Vector3<f64>,
    /// Soft-contact radius (> 0).
    radius: f64,
}

impl Particle {
    /// Create a resting particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is non-positive or any coordinate is NaN/inf.
    pub fn new(id: u32, position: Point3<f64>, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !position.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        Ok(Self {
            id,
            position,
            velocity: Vector3::zeros(),
            radius,
        })
    }

    /// Soft-contact radius. Fixed for the lifetime of the particle.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Kinetic energy with unit mass: 1/2 |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocity.norm_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_rests() -> Result<()> {
        let p = Particle::new(3, Point3::new(0.1, 0.2, 0.3), 0.01)?;
        assert_eq!(p.id, 3);
        assert_eq!(p.position, Point3::new(0.1, 0.2, 0.3));
        assert_eq!(p.velocity, Vector3::zeros());
        assert_eq!(p.radius(), 0.01);
        assert_eq!(p.kinetic_energy(), 0.0);
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = Particle::new(0, Point3::origin(), 0.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
        assert!(Particle::new(0, Point3::origin(), f64::NAN).is_err());
    }

    #[test]
    fn non_finite_position_rejected() {
        let err = Particle::new(0, Point3::new(f64::INFINITY, 0.0, 0.0), 0.1).unwrap_err();
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn kinetic_energy_computed() -> Result<()> {
        let mut p = Particle::new(7, Point3::origin(), 1.0)?;
        p.velocity = Vector3::new(3.0, 4.0, 0.0);
        assert!((p.kinetic_energy() - 12.5).abs() < 1e-12);
        Ok(())
    }
}
