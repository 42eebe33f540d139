use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Simulation parameters.
///
/// These are owned by the simulation and only change through configuration;
/// the simulation itself never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Scale of the linear soft-contact force (force per unit overlap).
    pub repulsion_strength: f64,

    /// Velocity retention per frame at 60 fps (applied as `damping^(dt * 60)`).
    pub damping: f64,

    /// Acceleration applied along the dominant Voronoi axis. Zero disables steering.
    pub steering_strength: f64,

    /// Steering runs on frames where `frame % steering_cadence == 0`. Zero disables steering.
    pub steering_cadence: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            repulsion_strength: 1.0,
            damping: 0.98,
            steering_strength: 0.0,
            steering_cadence: 1,
        }
    }
}

impl SimParams {
    /// Parse parameters from a JSON document. Missing fields take their defaults.
    ///
    /// Errors:
    /// - `Error::Config` if the document is malformed.
    /// - `Error::InvalidParam` if a value fails [`SimParams::validate`].
    pub fn from_json_str(s: &str) -> Result<Self> {
        let params: SimParams = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is finite and in range.
    pub fn validate(&self) -> Result<()> {
        if !self.repulsion_strength.is_finite() || self.repulsion_strength < 0.0 {
            return Err(Error::InvalidParam(
                "repulsion_strength must be finite and >= 0".into(),
            ));
        }
        if !self.damping.is_finite() || !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::InvalidParam("damping must lie in [0, 1]".into()));
        }
        if !self.steering_strength.is_finite() || self.steering_strength < 0.0 {
            return Err(Error::InvalidParam(
                "steering_strength must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }

    /// Whether the Voronoi steering step can run at all.
    #[inline]
    pub fn steering_enabled(&self) -> bool {
        self.steering_strength > 0.0 && self.steering_cadence > 0
    }

    /// Frame-rate independent damping multiplier for a step of `dt` seconds.
    #[inline]
    pub fn damping_factor(&self, dt: f64) -> f64 {
        self.damping.powf(dt * 60.0)
    }
}
