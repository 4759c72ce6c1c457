//! G1 task configuration bound to a G1-shaped model.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_actuator::derive_armature;
use sim_pattern::ResolveOptions;
use sim_sensor::SensorState;
use sim_task::robots::g1_23dof;
use sim_task::velocity::g1_23dof::unitree_g1_23dof_rough_env_cfg;
use sim_task::{ActionScale, ParamValue, TaskConfig};
use sim_types::{ContactRecord, ElementKind, ModelNamespace};

use crate::fixtures::g1_namespace;

const DT: f64 = 0.02;

fn env() -> TaskConfig {
    unitree_g1_23dof_rough_env_cfg().expect("G1 rough task should build")
}

fn geom(ns: &ModelNamespace, name: &str) -> usize {
    ns.lookup(ElementKind::Geom, name)
        .unwrap_or_else(|| panic!("no geom {name}"))
        .index()
}

fn contact(ns: &ModelNamespace, a: &str, b: &str, fz: f64) -> ContactRecord {
    ContactRecord::new(geom(ns, a), geom(ns, b), Vector3::new(0.0, 0.0, fz))
}

// ============================================================================
// Entity binding
// ============================================================================

#[test]
fn every_actuated_joint_claimed_once() {
    let ns = g1_namespace();
    let robot = env().bind_entity("robot", &ns).unwrap();

    assert_eq!(ns.len(ElementKind::Joint), 24);
    assert_eq!(robot.actuators.len(), 23);
    let names: Vec<&str> = robot
        .actuators
        .iter()
        .map(|a| ns.name(a.joint).unwrap())
        .collect();
    assert!(!names.contains(&"floating_base_joint"));

    let mut per_group = [0usize; 4];
    for a in &robot.actuators {
        per_group[a.group] += 1;
    }
    assert_eq!(per_group, [10, 5, 4, 4]);
}

#[test]
fn ankle_reflects_two_arm_motors() {
    let ns = g1_namespace();
    let robot = env().bind_entity("robot", &ns).unwrap();
    let by_name = |name: &str| {
        robot
            .actuators
            .iter()
            .find(|a| ns.name(a.joint).unwrap() == name)
            .copied()
            .unwrap()
    };

    let elbow = by_name("left_elbow_joint");
    let ankle = by_name("right_ankle_roll_joint");
    let knee = by_name("left_knee_joint");

    let arm = derive_armature(&g1_23dof::ROTOR_INERTIAS_5020, &g1_23dof::GEARS_5020);
    assert_relative_eq!(elbow.armature, arm);
    assert_relative_eq!(ankle.armature, 2.0 * arm);
    assert_relative_eq!(ankle.effort_limit, 50.0);

    let omega = 2.0 * std::f64::consts::PI * 10.0;
    assert_relative_eq!(knee.stiffness, knee.armature * omega * omega, max_relative = 1e-12);
    assert_relative_eq!(knee.damping, 2.0 * 2.0 * knee.armature * omega, max_relative = 1e-12);
    assert_relative_eq!(knee.effort_limit, 139.0);
}

#[test]
fn home_keyframe_and_collisions() {
    let ns = g1_namespace();
    let robot = env().bind_entity("robot", &ns).unwrap();

    assert_relative_eq!(robot.keyframe.pos.z, 0.78);
    assert_eq!(robot.keyframe.joint_pos.len(), 12);
    assert_eq!(robot.keyframe.joint_vel.len(), 24);
    let roll: Vec<f64> = robot
        .keyframe
        .joint_pos
        .iter()
        .filter(|(h, _)| ns.name(*h).unwrap().ends_with("shoulder_roll_joint"))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(roll, [0.18, -0.18]);

    // Every geom of the robot has a `_collision` suffix.
    assert_eq!(robot.collisions.len(), ns.len(ElementKind::Geom) - 1);
    for c in &robot.collisions {
        let name = ns.name(c.geom).unwrap();
        let is_foot = name.contains("_foot");
        assert_eq!(c.condim, Some(if is_foot { 3 } else { 1 }), "{name}");
        assert_eq!(c.priority.is_some(), is_foot, "{name}");
        assert_eq!(c.friction.is_some(), is_foot, "{name}");
        assert!(c.contype.is_none());
    }
}

#[test]
fn action_scale_resolves_per_joint() {
    let ns = g1_namespace();
    let cfg = env();
    let robot = cfg.bind_entity("robot", &ns).unwrap();
    let ActionScale::PerJoint(table) = &cfg.actions.require("joint_pos").unwrap().scale else {
        panic!("G1 action scale should be per joint");
    };

    let scales = table
        .resolve_with(
            ElementKind::Joint,
            &ns,
            &ResolveOptions::required().in_entity("robot"),
        )
        .unwrap();
    assert_eq!(scales.len(), 23);
    for ((joint, scale), actuator) in scales.iter().zip(&robot.actuators) {
        assert_eq!(*joint, actuator.joint);
        assert_relative_eq!(
            *scale,
            0.25 * actuator.effort_limit / actuator.stiffness,
            max_relative = 1e-12
        );
    }
}

#[test]
fn pose_tolerances_cover_every_actuated_joint() {
    let ns = g1_namespace();
    let cfg = env();
    let pose = cfg.rewards.require("pose").unwrap();
    let Some(ParamValue::Values(walking)) = pose.params.get("std_walking") else {
        panic!("std_walking should be a value table");
    };
    let resolved = walking.resolve(ElementKind::Joint, &ns).unwrap();
    assert_eq!(resolved.len(), 23);
    let hip_pitch = ns.lookup(ElementKind::Joint, "left_hip_pitch_joint").unwrap();
    let value = resolved.iter().find(|(h, _)| *h == hip_pitch).unwrap().1;
    assert_relative_eq!(value, 0.5);
}

#[test]
fn every_asset_selector_resolves() {
    let ns = g1_namespace();
    let cfg = env();
    let mut resolved = 0;
    for (kind, term, asset) in cfg.asset_selectors() {
        for element in [ElementKind::Joint, ElementKind::Body, ElementKind::Site, ElementKind::Geom] {
            if asset.pattern(element).is_some() {
                let handles = asset
                    .resolve(element, &ns)
                    .unwrap_or_else(|e| panic!("{kind} term {term}: {e}"));
                assert!(!handles.is_empty());
                resolved += 1;
            }
        }
    }
    assert!(resolved >= 8);
}

// ============================================================================
// Contact sensors
// ============================================================================

#[test]
fn feet_sensor_net_force_and_air_time() {
    let ns = g1_namespace();
    let mut sensors = env().bind_sensors(&ns).unwrap();
    let names: Vec<&str> = sensors.names().collect();
    assert_eq!(names, ["feet_ground_contact", "self_collision"]);

    let feet = sensors.get("feet_ground_contact").unwrap();
    assert_eq!(feet.state(), SensorState::Bound);
    let elements: Vec<&str> = feet.elements().map(|e| ns.name(e).unwrap()).collect();
    assert_eq!(elements, ["left_ankle_roll_link", "right_ankle_roll_link"]);

    for _ in 0..5 {
        sensors.update(&[], DT);
    }

    // Either geom order; the record carries the force on geom1.
    let step = [
        contact(&ns, "left_foot1_collision", "terrain_collision", 100.0),
        contact(&ns, "terrain_collision", "left_foot2_collision", -50.0),
        // Shin against terrain is outside the ankle subtree.
        contact(&ns, "right_shin_collision", "terrain_collision", 30.0),
    ];
    sensors.update(&step, DT);

    let feet = sensors.get("feet_ground_contact").unwrap();
    assert_eq!(feet.state(), SensorState::Active);
    assert_eq!(feet.found(), [true, false]);
    assert_eq!(feet.first_contact(DT), [true, false]);

    let left = &feet.aggregates()[0];
    assert_eq!(left.contact_count, 2);
    assert_relative_eq!(left.net_force().unwrap(), Vector3::new(0.0, 0.0, 150.0));
    let tracker = left.air_time.unwrap();
    assert_relative_eq!(tracker.last_air_time, 5.0 * DT, epsilon = 1e-12);
    assert_relative_eq!(tracker.current_contact_time, DT);

    let right = &feet.aggregates()[1];
    assert_relative_eq!(right.air_time.unwrap().current_air_time, 6.0 * DT, epsilon = 1e-12);

    sensors.reset();
    let feet = sensors.get("feet_ground_contact").unwrap();
    assert_eq!(feet.found(), [false, false]);
    assert_eq!(feet.aggregates()[0].air_time.unwrap().last_air_time, 0.0);
}

#[test]
fn self_collision_sensor() {
    let ns = g1_namespace();
    let mut sensors = env().bind_sensors(&ns).unwrap();

    sensors.update(&[contact(&ns, "left_foot1_collision", "terrain_collision", 10.0)], DT);
    assert_eq!(sensors.get("self_collision").unwrap().found(), [false]);

    let step = [
        contact(&ns, "left_hand_collision", "torso_collision", 5.0),
        contact(&ns, "left_shin_collision", "right_shin_collision", 5.0),
    ];
    sensors.update(&step, DT);
    let self_collision = &sensors.aggregate("self_collision").unwrap()[0];
    assert!(self_collision.in_contact);
    // One count per contact even though both geoms are in the pelvis subtree.
    assert_eq!(self_collision.contact_count, 2);
    assert_eq!(self_collision.slots.len(), 1);
    assert_eq!(self_collision.slots[0].found, Some(true));
}
