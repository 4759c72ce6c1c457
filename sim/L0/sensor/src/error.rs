//! Error types for sensor binding and lookup.

use sim_types::{ResolutionError, SimError, ValidationError};
use thiserror::Error;

/// Errors that can occur while binding or querying sensors.
///
/// The per-step update never fails; every variant is raised at
/// construction time or by a lookup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    /// Binding against the model or validating the configuration failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// No sensor with this name is registered.
    #[error("unknown sensor '{0}'")]
    UnknownSensor(String),

    /// Two sensors share a name.
    #[error("sensor '{0}' is already registered")]
    DuplicateSensor(String),
}

impl SensorError {
    /// Create an unknown sensor error.
    pub fn unknown_sensor(name: impl Into<String>) -> Self {
        Self::UnknownSensor(name.into())
    }

    /// Create a duplicate sensor error.
    pub fn duplicate_sensor(name: impl Into<String>) -> Self {
        Self::DuplicateSensor(name.into())
    }

    /// Check if binding failed because a pattern resolved to nothing or a
    /// handle came from another model.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Sim(e) if e.is_resolution())
    }

    /// Check if the configuration itself is invalid.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Sim(e) if e.is_validation())
    }
}

impl From<ResolutionError> for SensorError {
    fn from(e: ResolutionError) -> Self {
        Self::Sim(e.into())
    }
}

impl From<ValidationError> for SensorError {
    fn from(e: ValidationError) -> Self {
        Self::Sim(e.into())
    }
}
