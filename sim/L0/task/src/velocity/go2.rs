//! Unitree Go2 velocity tasks.

use indexmap::IndexMap;
use sim_pattern::{NamePattern, ValueMap};
use sim_sensor::{ContactField, ContactMatch, ContactSensorConfig, Reduce};
use sim_types::Result;
use tracing::info;

use super::{FEET_GROUND_CONTACT, ROBOT, make_velocity_env_cfg};
use crate::config::TaskConfig;
use crate::params::{Params, SENSOR_NAME};
use crate::robots::go2;
use crate::term_map::TermMap;
use crate::terms::{TermKind, TerminationTermCfg};
use crate::variant::{TaskVariant, flat_variant, play_variant as base_play_variant};

/// Non-foot geoms touching the terrain.
pub const NONFOOT_GROUND_TOUCH: &str = "nonfoot_ground_touch";

const FOOT_GEOMS: [&str; 4] = [
    "FR_foot_collision",
    "FL_foot_collision",
    "RR_foot_collision",
    "RL_foot_collision",
];

const FEET: [&str; 4] = ["FR", "FL", "RR", "RL"];

/// The four foot geoms against the terrain, with air time.
#[must_use]
pub fn feet_ground_contact() -> ContactSensorConfig {
    ContactSensorConfig::new(
        FEET_GROUND_CONTACT,
        ContactMatch::geom(NamePattern::any_of(FOOT_GEOMS)).in_entity(ROBOT),
    )
    .with_secondary(ContactMatch::body("terrain"))
    .with_fields([ContactField::Found, ContactField::Force])
    .with_reduce(Reduce::NetForce)
    .with_num_slots(1)
    .with_air_time(true)
}

/// Every other collision geom against the terrain.
#[must_use]
pub fn nonfoot_ground_touch() -> ContactSensorConfig {
    ContactSensorConfig::new(
        NONFOOT_GROUND_TOUCH,
        ContactMatch::geom(NamePattern::new(r".*_collision\d*").excluding(FOOT_GEOMS))
            .in_entity(ROBOT),
    )
    .with_secondary(ContactMatch::body("terrain"))
    .with_fields([ContactField::Found])
    .with_reduce(Reduce::None)
}

fn leg_std(hip: f64, thigh: f64, calf: f64) -> ValueMap<f64> {
    ValueMap::new()
        .with(".*(FR|FL|RR|RL)_hip_joint.*", hip)
        .with(".*(FR|FL|RR|RL)_thigh_joint.*", thigh)
        .with(".*(FR|FL|RR|RL)_calf_joint.*", calf)
}

/// Go2 on generated rough terrain with a terrain curriculum.
///
/// Actions keep the base uniform scale.
///
/// # Errors
///
/// Fails only if the catalogue and the base configuration disagree.
pub fn unitree_go2_rough_env_cfg() -> Result<TaskConfig> {
    let mut cfg = make_velocity_env_cfg()?;

    cfg.scene.entities = IndexMap::from([(ROBOT.to_owned(), go2::robot_cfg())]);
    cfg.scene.sensors = TermMap::new(TermKind::Sensor)
        .with(FEET_GROUND_CONTACT, feet_ground_contact())?
        .with(NONFOOT_GROUND_TOUCH, nonfoot_ground_touch())?;
    if let Some(generator) = cfg.scene.terrain.as_mut().and_then(|t| t.generator.as_mut()) {
        generator.curriculum = true;
    }

    cfg.viewer.body_name = Some("base_link".to_owned());
    cfg.viewer.distance = 1.5;
    cfg.viewer.elevation = -10.0;

    cfg.events.edit("base_com", |e| {
        e.params.asset_mut("asset_cfg")?.body_names = Some(NamePattern::new("base_link"));
        Ok(())
    })?;

    cfg.rewards.edit("pose", |r| {
        r.params.set("std_standing", leg_std(0.05, 0.1, 0.15));
        r.params.set("std_walking", leg_std(0.15, 0.35, 0.5));
        r.params.set("std_running", leg_std(0.15, 0.35, 0.5));
        Ok(())
    })?;
    cfg.rewards.edit("body_ang_vel", |r| {
        r.params.asset_mut("asset_cfg")?.body_names = Some(NamePattern::new("base_link"));
        Ok(())
    })?;
    for term in ["foot_clearance", "foot_slip"] {
        cfg.rewards.edit(term, |r| {
            r.params.asset_mut("asset_cfg")?.site_names = Some(NamePattern::any_of(FEET));
            Ok(())
        })?;
    }

    cfg.terminations.insert(
        "illegal_contact",
        TerminationTermCfg::new(
            "illegal_contact",
            Params::new().with(SENSOR_NAME, NONFOOT_GROUND_TOUCH),
        ),
    )?;

    let cfg = cfg.build()?;
    info!(task = "unitree_go2_rough", rewards = cfg.rewards.len(), "built velocity task");
    Ok(cfg)
}

/// Go2 on a flat plane.
///
/// # Errors
///
/// See [`unitree_go2_rough_env_cfg`].
pub fn unitree_go2_flat_env_cfg() -> Result<TaskConfig> {
    unitree_go2_rough_env_cfg()?.apply(&flat_variant())
}

/// Playback edits.
#[must_use]
pub fn play_variant() -> TaskVariant {
    base_play_variant()
}
