//! Go2 task configuration bound to a Go2-shaped model.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_task::robots::go2;
use sim_task::velocity::go2::unitree_go2_flat_env_cfg;
use sim_types::{ContactRecord, ElementKind, ModelNamespace};

use crate::fixtures::go2_namespace;

const DT: f64 = 0.02;

fn touch(ns: &ModelNamespace, a: &str, fz: f64) -> ContactRecord {
    let geom = |name: &str| ns.lookup(ElementKind::Geom, name).unwrap().index();
    ContactRecord::new(geom(a), geom("terrain_collision"), Vector3::new(0.0, 0.0, fz))
}

#[test]
fn go2_entity_binding() {
    let ns = go2_namespace();
    let cfg = unitree_go2_flat_env_cfg().unwrap();
    let robot = cfg.bind_entity("robot", &ns).unwrap();

    assert_eq!(robot.actuators.len(), 12);
    for a in &robot.actuators {
        let name = ns.name(a.joint).unwrap();
        let expected = if name.ends_with("_calf_joint") {
            go2::knee_actuator()
        } else {
            go2::hip_actuator()
        };
        assert_relative_eq!(a.armature, expected.reflected_inertia);
        assert_relative_eq!(a.effort_limit, expected.effort_limit);
    }

    let hips: Vec<(&str, f64)> = robot
        .keyframe
        .joint_pos
        .iter()
        .map(|(h, v)| (ns.name(*h).unwrap(), *v))
        .filter(|(n, _)| n.ends_with("_hip_joint"))
        .collect();
    assert_eq!(
        hips,
        [
            ("FL_hip_joint", -0.1),
            ("FR_hip_joint", 0.1),
            ("RL_hip_joint", -0.1),
            ("RR_hip_joint", 0.1),
        ]
    );
}

#[test]
fn foot_and_nonfoot_sensors() {
    let ns = go2_namespace();
    let cfg = unitree_go2_flat_env_cfg().unwrap();
    let mut sensors = cfg.bind_sensors(&ns).unwrap();

    let feet = sensors.get("feet_ground_contact").unwrap();
    let elements: Vec<&str> = feet.elements().map(|e| ns.name(e).unwrap()).collect();
    assert_eq!(
        elements,
        [
            "FL_foot_collision",
            "FR_foot_collision",
            "RL_foot_collision",
            "RR_foot_collision",
        ]
    );
    // Two base geoms plus three per leg; feet excluded.
    assert_eq!(sensors.get("nonfoot_ground_touch").unwrap().aggregates().len(), 14);

    sensors.update(
        &[
            touch(&ns, "FR_foot_collision", 40.0),
            touch(&ns, "RL_foot_collision", 35.0),
        ],
        DT,
    );
    assert_eq!(
        sensors.get("feet_ground_contact").unwrap().found(),
        [false, true, true, false]
    );
    assert!(
        !sensors
            .get("nonfoot_ground_touch")
            .unwrap()
            .found()
            .contains(&true)
    );

    sensors.update(&[touch(&ns, "base_collision2", 200.0)], DT);
    let illegal = sensors.get("nonfoot_ground_touch").unwrap();
    let touching: Vec<&str> = illegal
        .aggregates()
        .iter()
        .filter(|a| a.in_contact)
        .map(|a| ns.name(a.element).unwrap())
        .collect();
    assert_eq!(touching, ["base_collision2"]);
    assert_eq!(
        sensors.get("feet_ground_contact").unwrap().first_air(DT),
        [false, true, true, false]
    );
}
