//! PD gains from target closed-loop dynamics.
//!
//! A position-controlled joint with reflected inertia `J` behaves as a
//! mass-spring-damper. Choosing a natural frequency `f` (Hz) and damping
//! ratio `ζ` fixes the gains:
//!
//! ```text
//! ω         = 2π · f
//! stiffness = J · ω²
//! damping   = 2 · ζ · J · ω
//! ```

use std::f64::consts::PI;

use sim_types::ValidationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Proportional and derivative gains of a joint position controller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PdGains {
    /// Proportional gain (N·m/rad).
    pub stiffness: f64,
    /// Derivative gain (N·m·s/rad).
    pub damping: f64,
}

impl PdGains {
    /// Scale both gains by `k`.
    #[must_use]
    pub fn scaled(self, k: f64) -> Self {
        Self {
            stiffness: self.stiffness * k,
            damping: self.damping * k,
        }
    }
}

impl std::ops::Add for PdGains {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            stiffness: self.stiffness + rhs.stiffness,
            damping: self.damping + rhs.damping,
        }
    }
}

/// Convert a reflected inertia and target dynamics into PD gains.
///
/// # Example
///
/// ```
/// use sim_actuator::derive_gains;
///
/// let gains = derive_gains(1.0, 10.0, 2.0);
/// assert!((gains.stiffness - 3947.84).abs() < 0.01);
/// assert!((gains.damping - 251.33).abs() < 0.01);
/// ```
#[must_use]
pub fn derive_gains(armature: f64, natural_freq_hz: f64, damping_ratio: f64) -> PdGains {
    let omega = 2.0 * PI * natural_freq_hz;
    PdGains {
        stiffness: armature * omega * omega,
        damping: 2.0 * damping_ratio * armature * omega,
    }
}

/// Target closed-loop dynamics shared by a robot's actuator groups.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GainSchedule {
    /// Desired natural frequency (Hz).
    pub natural_freq_hz: f64,
    /// Desired damping ratio (dimensionless).
    pub damping_ratio: f64,
}

impl Default for GainSchedule {
    fn default() -> Self {
        Self {
            natural_freq_hz: 10.0,
            damping_ratio: 2.0, // overdamped
        }
    }
}

impl GainSchedule {
    /// Create a schedule.
    #[must_use]
    pub fn new(natural_freq_hz: f64, damping_ratio: f64) -> Self {
        Self {
            natural_freq_hz,
            damping_ratio,
        }
    }

    /// Natural frequency in rad/s.
    #[must_use]
    pub fn omega(&self) -> f64 {
        2.0 * PI * self.natural_freq_hz
    }

    /// Gains for an actuator with the given reflected inertia.
    #[must_use]
    pub fn gains_for(&self, armature: f64) -> PdGains {
        derive_gains(armature, self.natural_freq_hz, self.damping_ratio)
    }

    /// Validate the schedule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_positive("natural frequency", self.natural_freq_hz)?;
        ValidationError::require_positive("damping ratio", self.damping_ratio)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_armature_at_10hz() {
        let gains = derive_gains(1.0, 10.0, 2.0);
        assert_relative_eq!(gains.stiffness, 3947.841_760_435_743, epsilon = 1e-6);
        assert_relative_eq!(gains.damping, 251.327_412_287_183_45, epsilon = 1e-6);
    }

    #[test]
    fn test_gains_linear_in_armature() {
        let a = derive_gains(0.01, 10.0, 2.0);
        let b = derive_gains(0.02, 10.0, 2.0);
        assert_relative_eq!(b.stiffness, 2.0 * a.stiffness, max_relative = 1e-12);
        assert_relative_eq!(b.damping, 2.0 * a.damping, max_relative = 1e-12);
    }

    #[test]
    fn test_critical_damping() {
        // ζ = 1 gives damping² = 4·J·K.
        let j = 0.05;
        let gains = derive_gains(j, 5.0, 1.0);
        assert_relative_eq!(
            gains.damping * gains.damping,
            4.0 * j * gains.stiffness,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_schedule() {
        let schedule = GainSchedule::default();
        assert!(schedule.validate().is_ok());
        assert_eq!(schedule.gains_for(1.0), derive_gains(1.0, 10.0, 2.0));
        assert!(GainSchedule::new(0.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_gains_add_and_scale() {
        let g = PdGains {
            stiffness: 2.0,
            damping: 1.0,
        };
        assert_eq!(g + g, g.scaled(2.0));
    }
}
