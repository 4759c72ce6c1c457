//! Velocity-tracking locomotion tasks.
//!
//! [`make_velocity_env_cfg`] builds the robot-agnostic base. Each robot
//! module starts from it, installs its entity and sensors, and rewrites
//! the handful of terms that name robot-specific bodies, sites, or
//! tolerances.

pub mod g1_23dof;
pub mod go2;

use std::f64::consts::PI;

use sim_types::ConfigError;

use crate::config::TaskConfigBuilder;
use crate::params::{AssetSelector, Params};
use crate::scene::TerrainCfg;
use crate::term_map::TermMap;
use crate::terms::{
    ActionTermCfg, CommandTermCfg, CurriculumTermCfg, EventMode, EventTermCfg,
    ObservationGroupCfg, ObservationTermCfg, RewardTermCfg, TermKind, TerminationTermCfg,
};

/// Entity every velocity term acts on.
pub const ROBOT: &str = "robot";
/// Command every velocity term tracks.
pub const TWIST: &str = "twist";
/// Foot contact sensor read by the gait rewards.
pub const FEET_GROUND_CONTACT: &str = "feet_ground_contact";

fn robot() -> AssetSelector {
    AssetSelector::new(ROBOT)
}

fn observations(noisy: bool) -> Result<TermMap<ObservationTermCfg>, ConfigError> {
    let term = |func: &str, noise: f64| {
        let t = ObservationTermCfg::new(func);
        if noisy && noise > 0.0 {
            t.with_noise(-noise, noise)
        } else {
            t
        }
    };
    TermMap::new(TermKind::Observation)
        .with("base_lin_vel", term("builtin_sensor_lin_vel", 0.5))?
        .with("base_ang_vel", term("builtin_sensor_ang_vel", 0.2))?
        .with("projected_gravity", term("projected_gravity", 0.05))?
        .with("joint_pos", term("joint_pos_rel", 0.01))?
        .with("joint_vel", term("joint_vel_rel", 1.5))?
        .with("actions", term("last_action", 0.0))?
        .with(
            "command",
            term("generated_commands", 0.0).with_params(Params::new().with("command_name", TWIST)),
        )
}

fn rewards() -> Result<TermMap<RewardTermCfg>, ConfigError> {
    let twist = || Params::new().with("command_name", TWIST);
    TermMap::new(TermKind::Reward)
        .with(
            "track_linear_velocity",
            RewardTermCfg::new("track_linear_velocity", 2.0, twist().with("std", 0.25_f64.sqrt())),
        )?
        .with(
            "track_angular_velocity",
            RewardTermCfg::new("track_angular_velocity", 2.0, twist().with("std", 0.5_f64.sqrt())),
        )?
        .with(
            "upright",
            RewardTermCfg::new("flat_orientation", 1.0, Params::new().with("std", 0.2_f64.sqrt())),
        )?
        .with(
            "pose",
            RewardTermCfg::new(
                "variable_posture",
                1.0,
                twist()
                    .with("asset_cfg", robot().with_joints(".*"))
                    .with("walking_threshold", 0.05)
                    .with("running_threshold", 1.5),
            ),
        )?
        .with(
            "body_ang_vel",
            RewardTermCfg::new(
                "body_angular_velocity_penalty",
                -0.05,
                Params::new().with("asset_cfg", robot()),
            ),
        )?
        .with(
            "angular_momentum",
            RewardTermCfg::new("angular_momentum_penalty", -0.02, Params::new()),
        )?
        .with(
            "dof_pos_limits",
            RewardTermCfg::new(
                "joint_pos_limits",
                -1.0,
                Params::new().with("asset_cfg", robot().with_joints(".*")),
            ),
        )?
        .with(
            "action_rate_l2",
            RewardTermCfg::new("action_rate_l2", -0.1, Params::new()),
        )?
        .with(
            "air_time",
            RewardTermCfg::new(
                "feet_air_time",
                0.0,
                twist()
                    .with("sensor_name", FEET_GROUND_CONTACT)
                    .with("threshold_min", 0.05)
                    .with("threshold_max", 0.5)
                    .with("command_threshold", 0.5),
            ),
        )?
        .with(
            "foot_clearance",
            RewardTermCfg::new(
                "feet_clearance",
                -2.0,
                twist()
                    .with("target_height", 0.1)
                    .with("command_threshold", 0.05)
                    .with("asset_cfg", robot()),
            ),
        )?
        .with(
            "foot_swing_height",
            RewardTermCfg::new(
                "feet_swing_height",
                -0.25,
                twist()
                    .with("sensor_name", FEET_GROUND_CONTACT)
                    .with("target_height", 0.1)
                    .with("command_threshold", 0.05),
            ),
        )?
        .with(
            "foot_slip",
            RewardTermCfg::new(
                "feet_slip",
                -0.1,
                twist()
                    .with("sensor_name", FEET_GROUND_CONTACT)
                    .with("command_threshold", 0.05)
                    .with("asset_cfg", robot()),
            ),
        )?
        .with(
            "soft_landing",
            RewardTermCfg::new(
                "soft_landing",
                -1e-5,
                twist()
                    .with("sensor_name", FEET_GROUND_CONTACT)
                    .with("command_threshold", 0.05),
            ),
        )
}

fn events() -> Result<TermMap<EventTermCfg>, ConfigError> {
    TermMap::new(TermKind::Event)
        .with(
            "reset_base",
            EventTermCfg::new(
                "reset_root_state_uniform",
                EventMode::Reset,
                Params::new()
                    .with("x", (-0.5, 0.5))
                    .with("y", (-0.5, 0.5))
                    .with("yaw", (-PI, PI)),
            ),
        )?
        .with(
            "reset_robot_joints",
            EventTermCfg::new(
                "reset_joints_by_offset",
                EventMode::Reset,
                Params::new()
                    .with("position_range", (0.0, 0.0))
                    .with("velocity_range", (0.0, 0.0))
                    .with("asset_cfg", robot().with_joints(".*")),
            ),
        )?
        .with(
            "push_robot",
            EventTermCfg::new(
                "push_by_setting_velocity",
                EventMode::Interval(1.0, 3.0),
                Params::new()
                    .with("x", (-0.5, 0.5))
                    .with("y", (-0.5, 0.5)),
            ),
        )?
        .with(
            "foot_friction",
            EventTermCfg::new(
                "randomize_field",
                EventMode::Startup,
                Params::new()
                    .with("field", "geom_friction")
                    .with("ranges", (0.3, 1.2))
                    .with("asset_cfg", robot().with_geoms(".*_collision")),
            ),
        )?
        .with(
            "base_com",
            EventTermCfg::new(
                "randomize_field",
                EventMode::Startup,
                Params::new()
                    .with("field", "body_ipos")
                    .with("ranges", (-0.025, 0.025))
                    .with("asset_cfg", robot()),
            ),
        )
}

/// Robot-agnostic velocity-tracking configuration.
///
/// Every term acts on the entity `"robot"`, which the base does not
/// declare; the gait rewards read the `"feet_ground_contact"` sensor,
/// which the base does not declare either. Robot builders supply both
/// before building.
///
/// # Errors
///
/// Only fails if two base terms share a name.
pub fn make_velocity_env_cfg() -> Result<TaskConfigBuilder, ConfigError> {
    let mut cfg = TaskConfigBuilder::new();
    cfg.scene.num_envs = 1;
    cfg.scene.terrain = Some(TerrainCfg::rough());

    cfg.actions.insert("joint_pos", ActionTermCfg::joint_position(ROBOT, 0.5))?;

    cfg.commands.insert(
        TWIST,
        CommandTermCfg {
            func: "uniform_velocity".to_owned(),
            resampling_time_range: (3.0, 8.0),
            params: Params::new()
                .with("asset_cfg", robot())
                .with("rel_standing_envs", 0.1)
                .with("rel_heading_envs", 0.3)
                .with("heading_control_stiffness", 0.5)
                .with("lin_vel_x", (-1.0, 1.0))
                .with("lin_vel_y", (-1.0, 1.0))
                .with("ang_vel_z", (-0.5, 0.5))
                .with("heading", (-PI, PI))
                .with("viz_z_offset", 0.2),
        },
    )?;

    cfg.observations
        .insert("policy", ObservationGroupCfg::new(observations(true)?, true))?;
    cfg.observations
        .insert("critic", ObservationGroupCfg::new(observations(false)?, false))?;

    cfg.rewards = rewards()?;

    cfg.terminations.insert(
        "time_out",
        TerminationTermCfg {
            time_out: true,
            ..TerminationTermCfg::new("time_out", Params::new())
        },
    )?;
    cfg.terminations.insert(
        "fell_over",
        TerminationTermCfg::new(
            "bad_orientation",
            Params::new().with("limit_angle", 70.0_f64.to_radians()),
        ),
    )?;

    cfg.events = events()?;

    cfg.curriculum.insert(
        "terrain_levels",
        CurriculumTermCfg {
            func: "terrain_levels_vel".to_owned(),
            params: Params::new().with("command_name", TWIST),
        },
    )?;
    cfg.curriculum.insert(
        "command_vel",
        CurriculumTermCfg {
            func: "commands_vel".to_owned(),
            params: Params::new().with("command_name", TWIST),
        },
    )?;

    Ok(cfg)
}
