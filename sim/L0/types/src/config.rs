//! Simulation timing configuration.
//!
//! The physics engine steps at `timestep`; the policy acts once every
//! `decimation` physics steps.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Timing configuration shared by a task and its sensors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Physics timestep (seconds).
    pub timestep: f64,
    /// Physics steps per policy step.
    pub decimation: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 0.005, // 200 Hz physics
            decimation: 4,   // 50 Hz control
        }
    }
}

impl SimulationConfig {
    /// Create a new simulation config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Set the decimation.
    #[must_use]
    pub fn decimation(mut self, decimation: usize) -> Self {
        self.decimation = decimation;
        self
    }

    /// Policy step duration (seconds).
    #[must_use]
    pub fn control_dt(&self) -> f64 {
        self.timestep * self.decimation as f64
    }

    /// Physics frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }

    /// Number of policy steps in an episode of `episode_length_s` seconds.
    #[must_use]
    pub fn max_episode_steps(&self, episode_length_s: f64) -> u64 {
        // Tolerance keeps exact multiples from rounding up a step.
        (episode_length_s / self.control_dt() - 1e-9).ceil() as u64
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_positive("timestep", self.timestep)?;

        if self.timestep > 1.0 {
            return Err(ValidationError::inconsistent(
                "timestep > 1 second is likely an error",
            ));
        }

        if self.decimation == 0 {
            return Err(ValidationError::inconsistent("decimation must be at least 1"));
        }

        Ok(())
    }
}
