//! Motor and gearbox specifications.
//!
//! Datasheet-level descriptions of an electric actuator, and the reflected
//! inertia ("armature") they present at the output joint.

use sim_types::ValidationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reflected inertia of a multi-stage reduction.
///
/// For stage `i` with rotor inertia `I_i` and cumulative gear ratio `G_i`
/// (the product of per-stage ratios up to and including stage `i`):
///
/// ```text
/// armature = Σ I_i · G_i²
/// ```
///
/// Linear in each rotor inertia and quadratic in each cumulative ratio.
/// Extra entries in the longer slice are ignored; [`MotorSpec::validate`]
/// rejects mismatched lengths.
///
/// # Example
///
/// ```
/// use sim_actuator::derive_armature;
///
/// assert_eq!(derive_armature(&[1.0, 0.0, 0.0], &[1.0, 5.0, 5.0]), 1.0);
/// assert_eq!(derive_armature(&[0.0, 1.0], &[2.0, 3.0]), 36.0);
/// ```
#[must_use]
pub fn derive_armature(rotor_inertias: &[f64], gear_ratios: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    rotor_inertias
        .iter()
        .zip(gear_ratios)
        .map(|(inertia, ratio)| {
            cumulative *= ratio;
            inertia * cumulative * cumulative
        })
        .sum()
}

/// Reflected inertia of a single-stage reduction: `I · G²`.
#[must_use]
pub fn reflected_inertia(rotor_inertia: f64, gear_ratio: f64) -> f64 {
    derive_armature(&[rotor_inertia], &[gear_ratio])
}

/// Rotor inertias and gear ratios of a compound reduction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorSpec {
    /// Rotor inertia per stage (kg·m²).
    pub rotor_inertias: Vec<f64>,
    /// Gear ratio per stage (dimensionless).
    pub gear_ratios: Vec<f64>,
}

impl MotorSpec {
    /// Create a motor spec.
    #[must_use]
    pub fn new(rotor_inertias: impl Into<Vec<f64>>, gear_ratios: impl Into<Vec<f64>>) -> Self {
        Self {
            rotor_inertias: rotor_inertias.into(),
            gear_ratios: gear_ratios.into(),
        }
    }

    /// Single rotor behind a single reduction.
    #[must_use]
    pub fn single_stage(rotor_inertia: f64, gear_ratio: f64) -> Self {
        Self::new(vec![rotor_inertia], vec![gear_ratio])
    }

    /// Reflected inertia at the output joint.
    #[must_use]
    pub fn armature(&self) -> f64 {
        derive_armature(&self.rotor_inertias, &self.gear_ratios)
    }

    /// Validate the specification.
    ///
    /// Inertias must be non-negative, ratios positive, both lists the same
    /// non-zero length, and the resulting armature positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rotor_inertias.is_empty() || self.rotor_inertias.len() != self.gear_ratios.len() {
            return Err(ValidationError::inconsistent(format!(
                "motor spec has {} rotor inertias and {} gear ratios",
                self.rotor_inertias.len(),
                self.gear_ratios.len()
            )));
        }
        for &inertia in &self.rotor_inertias {
            ValidationError::require_non_negative("rotor inertia", inertia)?;
        }
        for &ratio in &self.gear_ratios {
            ValidationError::require_positive("gear ratio", ratio)?;
        }
        ValidationError::require_positive("armature", self.armature())
    }
}

/// Output-side characteristics of an electric actuator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElectricActuator {
    /// Reflected inertia at the joint (kg·m²).
    pub reflected_inertia: f64,
    /// Maximum joint speed (rad/s).
    pub velocity_limit: f64,
    /// Maximum joint torque (N·m).
    pub effort_limit: f64,
}

impl ElectricActuator {
    /// Create an actuator from its reflected inertia and limits.
    #[must_use]
    pub fn new(reflected_inertia: f64, velocity_limit: f64, effort_limit: f64) -> Self {
        Self {
            reflected_inertia,
            velocity_limit,
            effort_limit,
        }
    }

    /// Create an actuator from a motor spec.
    #[must_use]
    pub fn from_motor(motor: &MotorSpec, velocity_limit: f64, effort_limit: f64) -> Self {
        Self::new(motor.armature(), velocity_limit, effort_limit)
    }

    /// Validate that every limit is positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_positive("reflected inertia", self.reflected_inertia)?;
        ValidationError::require_positive("velocity limit", self.velocity_limit)?;
        ValidationError::require_positive("effort limit", self.effort_limit)
    }
}
