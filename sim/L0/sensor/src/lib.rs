//! Contact sensors for legged locomotion tasks.
//!
//! This crate turns the physics engine's per-step contact list into a few
//! signals that reward and termination terms consume:
//!
//! - [`ContactSensorConfig`] - Primary/secondary [`ContactMatch`] sides,
//!   reported fields, and reduction policy
//! - [`ContactSensor`] - A configuration bound to one model
//! - [`ContactAggregate`] - Per-element result of one step
//! - [`AirTimeTracker`] - Air and contact phase durations
//! - [`ContactSensorRegistry`] - All sensors of an environment, by name
//!
//! # Layer 0
//!
//! No engine dependency. Sensors consume [`sim_types::ContactRecord`]s and
//! a [`sim_types::ModelNamespace`]; whoever owns the physics supplies both.
//!
//! # Concurrency
//!
//! Each environment instance owns its sensors. Nothing here is shared or
//! locked; the update runs inline in the step loop and cannot fail.

#![doc(html_root_url = "https://docs.rs/sim-sensor/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::suboptimal_flops
)]

mod air_time;
mod config;
mod contact;
mod error;
mod registry;

pub use air_time::AirTimeTracker;
pub use config::{ContactField, ContactMatch, ContactSensorConfig, MatchMode, Reduce};
pub use contact::{ContactAggregate, ContactSensor, ContactSlot, SensorState};
pub use error::SensorError;
pub use registry::ContactSensorRegistry;

/// Result type for sensor operations.
pub type Result<T> = std::result::Result<T, SensorError>;
