//! Robot catalogue.
//!
//! Actuator groups, keyframes, and collision presets for the robots the
//! built-in tasks use. Every accessor returns a fresh value so callers
//! can edit their copy freely.

pub mod g1_23dof;
pub mod go2;

/// Fraction of the saturating joint offset one unit of action maps to.
pub const ACTION_SCALE_FACTOR: f64 = 0.25;
