//! Unitree G1 velocity tasks.

use indexmap::IndexMap;
use sim_pattern::{NamePattern, ValueMap};
use sim_sensor::{ContactField, ContactMatch, ContactSensorConfig, Reduce};
use sim_types::{ConfigError, Result};
use tracing::info;

use super::{FEET_GROUND_CONTACT, ROBOT, TWIST, make_velocity_env_cfg};
use crate::config::TaskConfig;
use crate::params::{Params, SENSOR_NAME};
use crate::robots::g1_23dof;
use crate::term_map::TermMap;
use crate::terms::{ActionScale, EventMode, EventTermCfg, RewardTermCfg, Term, TermKind};
use crate::variant::{ConfigEdit, TaskVariant, flat_variant, play_variant as base_play_variant};

/// Pelvis-subtree self contact sensor.
pub const SELF_COLLISION: &str = "self_collision";

/// Both ankle-roll subtrees against the terrain, with air time.
#[must_use]
pub fn feet_ground_contact() -> ContactSensorConfig {
    ContactSensorConfig::new(
        FEET_GROUND_CONTACT,
        ContactMatch::subtree(r"^(left_ankle_roll_link|right_ankle_roll_link)$").in_entity(ROBOT),
    )
    .with_secondary(ContactMatch::body("terrain"))
    .with_fields([ContactField::Found, ContactField::Force])
    .with_reduce(Reduce::NetForce)
    .with_num_slots(1)
    .with_air_time(true)
}

/// Any robot geom touching another robot geom.
#[must_use]
pub fn self_collision() -> ContactSensorConfig {
    ContactSensorConfig::new(SELF_COLLISION, ContactMatch::subtree("pelvis").in_entity(ROBOT))
        .with_secondary(ContactMatch::subtree("pelvis").in_entity(ROBOT))
        .with_fields([ContactField::Found])
        .with_reduce(Reduce::None)
}

// Hip pitch and knees are loosest for stride; ankle roll is tight for
// balance. Running roughly doubles the lateral tolerances.
fn std_walking() -> ValueMap<f64> {
    ValueMap::new()
        .with(".*hip_pitch.*", 0.5)
        .with(".*hip_roll.*", 0.15)
        .with(".*hip_yaw.*", 0.15)
        .with(".*knee.*", 0.5)
        .with(".*ankle_pitch.*", 0.15)
        .with(".*ankle_roll.*", 0.1)
        .with(".*waist_yaw.*", 0.15)
        .with(".*shoulder_pitch.*", 0.15)
        .with(".*shoulder_roll.*", 0.1)
        .with(".*shoulder_yaw.*", 0.1)
        .with(".*elbow.*", 0.1)
        .with(".*wrist.*", 0.1)
}

fn std_running() -> ValueMap<f64> {
    ValueMap::new()
        .with(".*hip_pitch.*", 0.5)
        .with(".*hip_roll.*", 0.25)
        .with(".*hip_yaw.*", 0.25)
        .with(".*knee.*", 0.5)
        .with(".*ankle_pitch.*", 0.25)
        .with(".*ankle_roll.*", 0.1)
        .with(".*waist_yaw.*", 0.25)
        .with(".*shoulder_pitch.*", 0.25)
        .with(".*shoulder_roll.*", 0.1)
        .with(".*shoulder_yaw.*", 0.1)
        .with(".*elbow.*", 0.1)
        .with(".*wrist.*", 0.1)
}

/// G1 on generated rough terrain with a terrain curriculum.
///
/// # Errors
///
/// Fails only if the catalogue and the base configuration disagree.
pub fn unitree_g1_23dof_rough_env_cfg() -> Result<TaskConfig> {
    let mut cfg = make_velocity_env_cfg()?;

    cfg.scene.entities = IndexMap::from([(ROBOT.to_owned(), g1_23dof::robot_cfg())]);
    cfg.scene.sensors = TermMap::new(TermKind::Sensor)
        .with(FEET_GROUND_CONTACT, feet_ground_contact())?
        .with(SELF_COLLISION, self_collision())?;
    if let Some(generator) = cfg.scene.terrain.as_mut().and_then(|t| t.generator.as_mut()) {
        generator.curriculum = true;
    }

    cfg.actions.edit("joint_pos", |a| {
        a.scale = ActionScale::PerJoint(g1_23dof::action_scale());
        Ok(())
    })?;
    cfg.viewer.body_name = Some("torso_link".to_owned());
    cfg.commands.edit(TWIST, |c| {
        c.params.set("viz_z_offset", 1.15);
        Ok(())
    })?;
    cfg.events.edit("base_com", |e| {
        e.params.asset_mut("asset_cfg")?.body_names = Some(NamePattern::new("torso_link"));
        Ok(())
    })?;

    cfg.rewards.edit("pose", |r| {
        r.params.set("std_standing", ValueMap::new().with(".*", 0.05));
        r.params.set("std_walking", std_walking());
        r.params.set("std_running", std_running());
        Ok(())
    })?;
    cfg.rewards.edit("body_ang_vel", |r| {
        r.params.asset_mut("asset_cfg")?.body_names = Some(NamePattern::new("torso_link"));
        Ok(())
    })?;
    for term in ["foot_clearance", "foot_slip"] {
        cfg.rewards.edit(term, set_foot_sites)?;
    }
    cfg.rewards.insert(
        "self_collisions",
        RewardTermCfg::new(
            "self_collision_cost",
            -1.0,
            Params::new().with(SENSOR_NAME, SELF_COLLISION),
        ),
    )?;

    let cfg = cfg.build()?;
    info!(task = "unitree_g1_23dof_rough", rewards = cfg.rewards.len(), "built velocity task");
    Ok(cfg)
}

fn set_foot_sites(reward: &mut RewardTermCfg) -> std::result::Result<(), ConfigError> {
    reward.params.asset_mut("asset_cfg")?.site_names =
        Some(NamePattern::any_of(["left_foot", "right_foot"]));
    Ok(())
}

/// G1 on a flat plane.
///
/// # Errors
///
/// See [`unitree_g1_23dof_rough_env_cfg`].
pub fn unitree_g1_23dof_flat_env_cfg() -> Result<TaskConfig> {
    unitree_g1_23dof_rough_env_cfg()?.apply(&flat_variant())
}

/// Playback edits; also re-randomizes the terrain patch on every reset.
#[must_use]
pub fn play_variant() -> TaskVariant {
    base_play_variant().with(ConfigEdit::Insert {
        name: "randomize_terrain".to_owned(),
        term: Term::Event(EventTermCfg::new(
            "randomize_terrain",
            EventMode::Reset,
            Params::new(),
        )),
    })
}
