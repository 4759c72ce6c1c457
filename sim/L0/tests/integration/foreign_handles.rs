//! Handles are tied to the model they were resolved against.

use sim_pattern::{NamePattern, PatternResolver};
use sim_task::velocity::g1_23dof::unitree_g1_23dof_rough_env_cfg;
use sim_types::{ElementKind, ResolutionError};

use crate::fixtures::g1_namespace;

#[test]
fn same_shape_models_have_distinct_identity() {
    let a = g1_namespace();
    let b = g1_namespace();
    assert_ne!(a.id(), b.id());

    let knees = PatternResolver::new(&a)
        .resolve(&NamePattern::new(".*_knee_joint"), ElementKind::Joint)
        .unwrap();
    assert!(a.name(knees[0]).is_ok());
    assert_eq!(
        b.name(knees[0]).unwrap_err(),
        ResolutionError::ForeignHandle {
            handle: knees[0],
            model: b.id(),
        }
    );
}

#[test]
fn one_config_binds_to_many_models() {
    let cfg = unitree_g1_23dof_rough_env_cfg().unwrap();
    let a = g1_namespace();
    let b = g1_namespace();

    let on_a = cfg.bind_entity("robot", &a).unwrap();
    let on_b = cfg.bind_entity("robot", &b).unwrap();
    assert_eq!(on_a.actuators.len(), on_b.actuators.len());
    assert!(on_a.actuators.iter().all(|j| a.owns(j.joint) && !b.owns(j.joint)));
    assert!(on_b.actuators.iter().all(|j| b.owns(j.joint)));

    let sensors = cfg.bind_sensors(&b).unwrap();
    assert!(sensors.get("feet_ground_contact").unwrap().model() == b.id());
}

#[test]
fn sensor_bound_to_wrong_robot_fails() {
    // The G1 feet sensor names links a quadruped does not have.
    let cfg = unitree_g1_23dof_rough_env_cfg().unwrap();
    let err = cfg.bind_sensors(&crate::fixtures::go2_namespace()).unwrap_err();
    assert!(err.is_resolution());
}
