//! Unitree G1, 23 actuated joints.

use nalgebra::Vector3;
use sim_actuator::{ActuatorGroup, Articulation, ElectricActuator, GainSchedule, MotorSpec};
use sim_pattern::{NamePattern, ValueMap};

use super::ACTION_SCALE_FACTOR;
use crate::scene::{CollisionCfg, EntityCfg, InitialState};

/// Rotor inertias of the 5020 motor stages (kg·m²).
pub const ROTOR_INERTIAS_5020: [f64; 3] = [0.139e-4, 0.017e-4, 0.169e-4];
/// Gear ratios of the 5020 reduction stages.
pub const GEARS_5020: [f64; 3] = [1.0, 1.0 + 46.0 / 18.0, 1.0 + 56.0 / 16.0];

/// Rotor inertias of the 7520-14 motor stages (kg·m²).
pub const ROTOR_INERTIAS_7520_14: [f64; 3] = [0.489e-4, 0.098e-4, 0.533e-4];
/// Gear ratios of the 7520-14 reduction stages.
pub const GEARS_7520_14: [f64; 3] = [1.0, 4.5, 1.0 + 48.0 / 22.0];

/// Rotor inertias of the 7520-22 motor stages (kg·m²).
pub const ROTOR_INERTIAS_7520_22: [f64; 3] = [0.489e-4, 0.109e-4, 0.738e-4];
/// Gear ratios of the 7520-22 reduction stages.
pub const GEARS_7520_22: [f64; 3] = [1.0, 4.5, 5.0];

/// Rotor inertias of the 4010 motor stages (kg·m²).
pub const ROTOR_INERTIAS_4010: [f64; 3] = [0.068e-4, 0.0, 0.0];
/// Gear ratios of the 4010 reduction stages.
pub const GEARS_4010: [f64; 3] = [1.0, 5.0, 5.0];

/// Foot collision geoms, seven spheres per sole.
pub const FOOT_GEOMS: &str = r"^(left|right)_foot[1-7]_collision$";

/// 5020: arms and wrists.
#[must_use]
pub fn actuator_5020() -> ElectricActuator {
    ElectricActuator::from_motor(&MotorSpec::new(ROTOR_INERTIAS_5020, GEARS_5020), 37.0, 25.0)
}

/// 7520-14: hip pitch, hip yaw, waist.
#[must_use]
pub fn actuator_7520_14() -> ElectricActuator {
    ElectricActuator::from_motor(
        &MotorSpec::new(ROTOR_INERTIAS_7520_14, GEARS_7520_14),
        32.0,
        88.0,
    )
}

/// 7520-22: hip roll and knees.
#[must_use]
pub fn actuator_7520_22() -> ElectricActuator {
    ElectricActuator::from_motor(
        &MotorSpec::new(ROTOR_INERTIAS_7520_22, GEARS_7520_22),
        20.0,
        139.0,
    )
}

/// 4010: small wrist motor.
#[must_use]
pub fn actuator_4010() -> ElectricActuator {
    ElectricActuator::from_motor(&MotorSpec::new(ROTOR_INERTIAS_4010, GEARS_4010), 22.0, 5.0)
}

/// Actuator groups and joint limit softening.
///
/// Each ankle is a four-bar linkage driven by two 5020 motors; it is
/// modelled with [`ActuatorGroup::parallel_linkage`].
#[must_use]
pub fn articulation() -> Articulation {
    let schedule = GainSchedule::default();
    let arm = actuator_5020();
    Articulation::new(vec![
        ActuatorGroup::from_actuator(
            NamePattern::any_of([
                ".*_elbow_joint",
                ".*_shoulder_pitch_joint",
                ".*_shoulder_roll_joint",
                ".*_shoulder_yaw_joint",
                ".*_wrist_roll_joint",
            ]),
            &arm,
            &schedule,
        ),
        ActuatorGroup::from_actuator(
            NamePattern::any_of([".*_hip_pitch_joint", ".*_hip_yaw_joint", "waist_yaw_joint"]),
            &actuator_7520_14(),
            &schedule,
        ),
        ActuatorGroup::from_actuator(
            NamePattern::any_of([".*_hip_roll_joint", ".*_knee_joint"]),
            &actuator_7520_22(),
            &schedule,
        ),
        ActuatorGroup::parallel_linkage(
            NamePattern::any_of([".*_ankle_pitch_joint", ".*_ankle_roll_joint"]),
            &[arm, arm],
            &schedule,
        ),
    ])
    .with_soft_limit_factor(0.9)
}

/// Standing pose.
#[must_use]
pub fn home_keyframe() -> InitialState {
    InitialState {
        pos: Vector3::new(0.0, 0.0, 0.78),
        joint_pos: ValueMap::new()
            .with(".*_hip_pitch_joint", -0.1)
            .with(".*_knee_joint", 0.3)
            .with(".*_ankle_pitch_joint", -0.2)
            .with(".*_shoulder_pitch_joint", 0.35)
            .with(".*_elbow_joint", 0.87)
            .with("left_shoulder_roll_joint", 0.18)
            .with("right_shoulder_roll_joint", -0.18),
        joint_vel: ValueMap::new().with(".*", 0.0),
    }
}

/// Crouched pose.
#[must_use]
pub fn knees_bent_keyframe() -> InitialState {
    InitialState {
        pos: Vector3::new(0.0, 0.0, 0.76),
        joint_pos: ValueMap::new()
            .with(".*_hip_pitch_joint", -0.312)
            .with(".*_knee_joint", 0.669)
            .with(".*_ankle_pitch_joint", -0.363)
            .with(".*_elbow_joint", 0.6)
            .with("left_shoulder_roll_joint", 0.2)
            .with("left_shoulder_pitch_joint", 0.2)
            .with("right_shoulder_roll_joint", -0.2)
            .with("right_shoulder_pitch_joint", 0.2),
        joint_vel: ValueMap::new().with(".*", 0.0),
    }
}

fn foot_condim() -> ValueMap<u32> {
    ValueMap::new().with(FOOT_GEOMS, 3).with(".*_collision", 1)
}

fn foot_contact(collision: CollisionCfg) -> CollisionCfg {
    collision
        .with_priority(ValueMap::new().with(FOOT_GEOMS, 1))
        .with_friction(ValueMap::new().with(FOOT_GEOMS, vec![0.6]))
}

/// All collisions including self collisions; feet get `condim = 3`,
/// everything else `condim = 1`.
#[must_use]
pub fn full_collision() -> CollisionCfg {
    foot_contact(CollisionCfg::new(".*_collision").with_condim(foot_condim()))
}

/// All geoms collide with the world but not with each other.
#[must_use]
pub fn full_collision_without_self() -> CollisionCfg {
    foot_contact(
        CollisionCfg::new(".*_collision")
            .with_masks(0, 1)
            .with_condim(foot_condim()),
    )
}

/// Only the feet collide.
#[must_use]
pub fn feet_only_collision() -> CollisionCfg {
    foot_contact(
        CollisionCfg::new(FOOT_GEOMS)
            .with_masks(0, 1)
            .with_condim(ValueMap::new().with(".*", 3)),
    )
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
