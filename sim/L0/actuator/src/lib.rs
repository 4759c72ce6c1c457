//! Actuator parameter derivation for legged robots.
//!
//! Converts manufacturer-level motor and gearbox data into the parameters a
//! position-controlled joint needs in simulation:
//!
//! - [`derive_armature`] - Reflected inertia of a multi-stage reduction
//! - [`derive_gains`] - PD stiffness/damping from natural frequency and
//!   damping ratio
//! - [`ActuatorGroup`] - Joints sharing one actuator model
//! - [`Articulation`] - All groups of a robot, bound to a model
//!
//! # Units
//!
//! Inertia in kg·m², stiffness in N·m/rad, damping in N·m·s/rad, effort in
//! N·m, frequency in Hz.
//!
//! # Example
//!
//! ```
//! use sim_actuator::{ActuatorGroup, ElectricActuator, GainSchedule, MotorSpec};
//! use sim_pattern::NamePattern;
//!
//! let motor = MotorSpec::new(vec![0.489e-4, 0.109e-4, 0.738e-4], vec![1.0, 4.5, 5.0]);
//! let actuator = ElectricActuator::from_motor(&motor, 20.0, 139.0);
//! let knees = ActuatorGroup::from_actuator(
//!     NamePattern::new(".*_knee_joint"),
//!     &actuator,
//!     &GainSchedule::default(),
//! );
//! assert!(knees.validate().is_ok());
//! ```

#![doc(html_root_url = "https://docs.rs/sim-actuator/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::suboptimal_flops
)]

mod articulation;
mod gains;
mod group;
mod motor;

pub use articulation::{ActuatedJoint, Articulation, action_scale_table, resolve_actuators};
pub use gains::{GainSchedule, PdGains, derive_gains};
pub use group::ActuatorGroup;
pub use motor::{ElectricActuator, MotorSpec, derive_armature, reflected_inertia};
