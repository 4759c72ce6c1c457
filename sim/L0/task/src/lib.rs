//! Task configuration composition for velocity-tracking locomotion.
//!
//! A task is a tree of named term fragments (actions, commands,
//! observation groups, rewards, terminations, events, curriculum) plus a
//! scene (terrain, entities, contact sensors):
//!
//! - [`TaskConfigBuilder`] - Mutable staging area; [`TaskConfigBuilder::build`]
//!   validates and freezes it into a [`TaskConfig`]
//! - [`TermMap`] - Ordered, name-keyed fragments of one kind
//! - [`TaskVariant`] - Named list of [`ConfigEdit`]s; applying one yields a
//!   new configuration and never touches the base
//! - [`robots`] - Actuators, keyframes, and collision presets per robot
//! - [`velocity`] - The velocity-tracking base and its robot variants
//!
//! # Example
//!
//! ```
//! use sim_task::{velocity::g1_23dof, flat_variant};
//!
//! let rough = g1_23dof::unitree_g1_23dof_rough_env_cfg().unwrap();
//! let flat = rough.apply(&flat_variant()).unwrap();
//!
//! assert!(rough.curriculum.contains("terrain_levels"));
//! assert!(!flat.curriculum.contains("terrain_levels"));
//! ```
//!
//! # Binding
//!
//! Configurations hold patterns, never handles. [`TaskConfig::bind_entity`]
//! and [`TaskConfig::bind_sensors`] resolve them against one
//! [`sim_types::ModelNamespace`]; bind again for a different model.

#![doc(html_root_url = "https://docs.rs/sim-task/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::missing_errors_doc)]

mod config;
mod params;
mod scene;
mod term_map;
mod terms;
mod variant;

pub mod robots;
pub mod velocity;

pub use config::{TaskConfig, TaskConfigBuilder};
pub use params::{AssetSelector, ParamValue, Params, SENSOR_NAME};
pub use scene::{
    BoundEntity, CollisionCfg, EntityCfg, GeomCollision, InitialState, Keyframe, SceneCfg,
    TerrainCfg, TerrainGeneratorCfg, TerrainType, ViewerCfg,
};
pub use term_map::TermMap;
pub use terms::{
    ActionScale, ActionTermCfg, CommandTermCfg, CurriculumTermCfg, EventMode, EventTermCfg,
    ObservationGroupCfg, ObservationTermCfg, RewardTermCfg, Term, TermKind, TerminationTermCfg,
};
pub use variant::{
    ConfigEdit, PLAY_EPISODE_LENGTH_S, TaskVariant, TerrainEdit, flat_variant, play_variant,
};
