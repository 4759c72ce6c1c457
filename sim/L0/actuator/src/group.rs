//! Actuator groups: joints driven by identical position actuators.

use sim_pattern::NamePattern;
use sim_types::ValidationError;

use crate::gains::{GainSchedule, PdGains};
use crate::motor::ElectricActuator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Joints sharing one actuator model, with derived control parameters.
///
/// All quantities are expressed at the joint: armature in kg·m², stiffness
/// in N·m/rad, damping in N·m·s/rad, effort in N·m.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorGroup {
    /// Joints driven by this group.
    pub targets: NamePattern,
    /// Position-loop proportional gain.
    pub stiffness: f64,
    /// Position-loop derivative gain.
    pub damping: f64,
    /// Maximum output torque.
    pub effort_limit: f64,
    /// Reflected rotor inertia added to the joint.
    pub armature: f64,
}

impl ActuatorGroup {
    /// Group whose gains are derived from one actuator per joint.
    #[must_use]
    pub fn from_actuator(
        targets: NamePattern,
        actuator: &ElectricActuator,
        schedule: &GainSchedule,
    ) -> Self {
        let PdGains { stiffness, damping } = schedule.gains_for(actuator.reflected_inertia);
        Self {
            targets,
            stiffness,
            damping,
            effort_limit: actuator.effort_limit,
            armature: actuator.reflected_inertia,
        }
    }

    /// Group for joints driven by several actuators through a parallel
    /// linkage (e.g. a two-motor ankle).
    ///
    /// Armature, stiffness, damping, and effort limit are summed over the
    /// contributing actuators. This is an approximation: the effective
    /// inertia of a linkage depends on its configuration, and summing
    /// assumes a nominal 1:1 transmission from each motor to the joint. It
    /// is only meaningful near that nominal configuration and carries no
    /// accuracy bound.
    #[must_use]
    pub fn parallel_linkage(
        targets: NamePattern,
        actuators: &[ElectricActuator],
        schedule: &GainSchedule,
    ) -> Self {
        let mut group = Self {
            targets,
            stiffness: 0.0,
            damping: 0.0,
            effort_limit: 0.0,
            armature: 0.0,
        };
        for actuator in actuators {
            let gains = schedule.gains_for(actuator.reflected_inertia);
            group.stiffness += gains.stiffness;
            group.damping += gains.damping;
            group.effort_limit += actuator.effort_limit;
            group.armature += actuator.reflected_inertia;
        }
        group
    }

    /// Group with explicitly specified parameters.
    #[must_use]
    pub fn explicit(
        targets: NamePattern,
        gains: PdGains,
        effort_limit: f64,
        armature: f64,
    ) -> Self {
        Self {
            targets,
            stiffness: gains.stiffness,
            damping: gains.damping,
            effort_limit,
            armature,
        }
    }

    /// Position-loop gains.
    #[must_use]
    pub fn gains(&self) -> PdGains {
        PdGains {
            stiffness: self.stiffness,
            damping: self.damping,
        }
    }

    /// Per-joint action scale `factor · effort_limit / stiffness` (rad).
    ///
    /// The joint offset at which the position loop saturates the motor,
    /// scaled by `factor`.
    #[must_use]
    pub fn action_scale(&self, factor: f64) -> f64 {
        factor * self.effort_limit / self.stiffness
    }

    /// Validate physical consistency.
    ///
    /// Effort, armature, and stiffness must be strictly positive; damping
    /// non-negative; every value finite; the target pattern non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.targets.is_empty() {
            return Err(ValidationError::inconsistent(
                "actuator group has no target joints",
            ));
        }
        ValidationError::require_positive("effort limit", self.effort_limit)?;
        ValidationError::require_positive("armature", self.armature)?;
        ValidationError::require_positive("stiffness", self.stiffness)?;
        ValidationError::require_non_negative("damping", self.damping)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn motor() -> ElectricActuator {
        ElectricActuator::new(0.01, 37.0, 25.0)
    }

    #[test]
    fn test_from_actuator() {
        let group = ActuatorGroup::from_actuator(
            NamePattern::new(".*_elbow_joint"),
            &motor(),
            &GainSchedule::default(),
        );
        assert_relative_eq!(group.armature, 0.01);
        assert_relative_eq!(group.stiffness, 0.01 * 3947.841_760_435_743, epsilon = 1e-9);
        assert_eq!(group.effort_limit, 25.0);
        assert!(group.validate().is_ok());
    }

    #[test]
    fn test_parallel_linkage_sums_contributors() {
        let schedule = GainSchedule::default();
        let single = ActuatorGroup::from_actuator(NamePattern::new("a"), &motor(), &schedule);
        let pair =
            ActuatorGroup::parallel_linkage(NamePattern::new("a"), &[motor(), motor()], &schedule);

        assert_relative_eq!(pair.armature, 2.0 * single.armature);
        assert_relative_eq!(pair.stiffness, 2.0 * single.stiffness);
        assert_relative_eq!(pair.damping, 2.0 * single.damping);
        assert_relative_eq!(pair.effort_limit, 2.0 * single.effort_limit);
        // Action scale is unchanged by doubling effort and stiffness.
        assert_relative_eq!(pair.action_scale(0.25), single.action_scale(0.25));
    }

    #[test]
    fn test_validation() {
        let schedule = GainSchedule::default();
        let mut group = ActuatorGroup::from_actuator(NamePattern::new("a"), &motor(), &schedule);
        group.effort_limit = 0.0;
        assert!(group.validate().is_err());

        let group = ActuatorGroup::from_actuator(NamePattern::default(), &motor(), &schedule);
        assert!(group.validate().is_err());

        let group = ActuatorGroup::parallel_linkage(NamePattern::new("a"), &[], &schedule);
        assert!(group.validate().is_err());

        let group = ActuatorGroup::explicit(
            NamePattern::new("a"),
            PdGains {
                stiffness: 20.0,
                damping: -1.0,
            },
            10.0,
            0.01,
        );
        assert!(group.validate().is_err());
    }
}
