//! Every built-in velocity task, in every variant, against its robot.

use sim_task::velocity::{g1_23dof, go2};
use sim_task::{PLAY_EPISODE_LENGTH_S, TaskConfig, TaskVariant, flat_variant};
use sim_types::{ModelNamespace, Result};

use crate::fixtures::{g1_namespace, go2_namespace};

struct RobotTask {
    name: &'static str,
    rough: fn() -> Result<TaskConfig>,
    play: fn() -> TaskVariant,
    namespace: fn() -> ModelNamespace,
}

const TASKS: [RobotTask; 2] = [
    RobotTask {
        name: "g1_23dof",
        rough: g1_23dof::unitree_g1_23dof_rough_env_cfg,
        play: g1_23dof::play_variant,
        namespace: g1_namespace,
    },
    RobotTask {
        name: "go2",
        rough: go2::unitree_go2_rough_env_cfg,
        play: go2::play_variant,
        namespace: go2_namespace,
    },
];

#[test]
fn every_variant_binds() {
    for task in &TASKS {
        let ns = (task.namespace)();
        let rough = (task.rough)().unwrap();
        let flat = rough.apply(&flat_variant()).unwrap();
        let play = (task.play)();

        for (variant, cfg) in [
            ("rough", rough.clone()),
            ("rough/play", rough.apply(&play).unwrap()),
            ("flat", flat.clone()),
            ("flat/play", flat.apply(&play).unwrap()),
        ] {
            let label = format!("{}/{variant}", task.name);
            cfg.bind_entity("robot", &ns)
                .unwrap_or_else(|e| panic!("{label}: {e}"));
            cfg.bind_sensors(&ns)
                .unwrap_or_else(|e| panic!("{label}: {e}"));
            if variant.ends_with("play") {
                assert_eq!(cfg.episode_length_s, PLAY_EPISODE_LENGTH_S, "{label}");
                assert!(!cfg.events.contains("push_robot"), "{label}");
            } else {
                assert!(cfg.events.contains("push_robot"), "{label}");
            }
        }
    }
}

#[test]
fn variants_compose_in_either_order() {
    for task in &TASKS {
        let rough = (task.rough)().unwrap();
        let play = (task.play)();
        let a = rough.apply(&flat_variant()).unwrap().apply(&play).unwrap();
        let b = rough.apply(&play).unwrap().apply(&flat_variant()).unwrap();
        assert_eq!(a, b, "{}", task.name);
    }
}

#[test]
fn robot_builders_do_not_share_state() {
    let g1 = g1_23dof::unitree_g1_23dof_rough_env_cfg().unwrap();
    let go2 = go2::unitree_go2_rough_env_cfg().unwrap();
    assert!(g1.rewards.contains("self_collisions"));
    assert!(!go2.rewards.contains("self_collisions"));
    assert!(go2.terminations.contains("illegal_contact"));
    assert!(!g1.terminations.contains("illegal_contact"));
}
