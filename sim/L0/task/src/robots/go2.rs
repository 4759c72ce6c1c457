//! Unitree Go2 quadruped.

use nalgebra::Vector3;
use sim_actuator::{
    ActuatorGroup, Articulation, ElectricActuator, GainSchedule, reflected_inertia,
};
use sim_pattern::{NamePattern, ValueMap};

use super::ACTION_SCALE_FACTOR;
use crate::scene::{CollisionCfg, EntityCfg, InitialState};

/// Rotor inertia shared by every Go2 motor (kg·m²).
pub const ROTOR_INERTIA: f64 = 0.000_111_842;
/// Hip and thigh reduction.
pub const HIP_GEAR_RATIO: f64 = 6.0;
/// Calf reduction, including the belt stage.
pub const KNEE_GEAR_RATIO: f64 = HIP_GEAR_RATIO * 1.5;

/// Foot collision geoms.
pub const FOOT_GEOMS: &str = r"^(FL|FR|RL|RR)_foot_collision$";

/// Hip and thigh actuator.
#[must_use]
pub fn hip_actuator() -> ElectricActuator {
    ElectricActuator::new(reflected_inertia(ROTOR_INERTIA, HIP_GEAR_RATIO), 30.1, 23.7)
}

/// Calf actuator.
#[must_use]
pub fn knee_actuator() -> ElectricActuator {
    ElectricActuator::new(reflected_inertia(ROTOR_INERTIA, KNEE_GEAR_RATIO), 20.06, 45.43)
}

/// Actuator groups and joint limit softening.
#[must_use]
pub fn articulation() -> Articulation {
    let schedule = GainSchedule::default();
    Articulation::new(vec![
        ActuatorGroup::from_actuator(
            NamePattern::any_of([".*_hip_joint", ".*_thigh_joint"]),
            &hip_actuator(),
            &schedule,
        ),
        ActuatorGroup::from_actuator(NamePattern::new(".*_calf_joint"), &knee_actuator(), &schedule),
    ])
    .with_soft_limit_factor(0.9)
}

/// Standing pose.
#[must_use]
pub fn home_keyframe() -> InitialState {
    InitialState {
        pos: Vector3::new(0.0, 0.0, 0.278),
        joint_pos: ValueMap::new()
            .with(".*thigh_joint", 0.9)
            .with(".*calf_joint", -1.8)
            .with(".*R_hip_joint", 0.1)
            .with(".*L_hip_joint", -0.1),
        joint_vel: ValueMap::new().with(".*", 0.0),
    }
}

/// All collisions; feet get `condim = 3` and higher friction priority.
#[must_use]
pub fn full_collision() -> CollisionCfg {
    CollisionCfg::new(".*_collision")
        .with_condim(ValueMap::new().with(FOOT_GEOMS, 3).with(".*_collision", 1))
        .with_priority(ValueMap::new().with(FOOT_GEOMS, 1))
        .with_friction(ValueMap::new().with(FOOT_GEOMS, vec![0.6]))
}

/// Robot entity: home keyframe, full collisions, all actuators.
#[must_use]
pub fn robot_cfg() -> EntityCfg {
    EntityCfg {
        init_state: home_keyframe(),
        collisions: vec![full_collision()],
        articulation: articulation(),
    }
}

/// Per-joint action scale `0.25 · effort / stiffness`.
#[must_use]
pub fn action_scale() -> ValueMap<f64> {
    articulation().action_scale_table(ACTION_SCALE_FACTOR)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_knee_reflects_more_inertia() {
        let hip = hip_actuator();
        let knee = knee_actuator();
        assert_relative_eq!(hip.reflected_inertia, ROTOR_INERTIA * 36.0);
        assert_relative_eq!(knee.reflected_inertia / hip.reflected_inertia, 2.25);
    }

    #[test]
    fn test_articulation_is_valid() {
        assert!(articulation().validate().is_ok());
        assert_eq!(action_scale().len(), 3);
    }
}
