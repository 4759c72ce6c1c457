//! Error taxonomy for configuration and binding.
//!
//! All of these are raised synchronously while a task is being assembled or
//! bound to a model. The per-step sensor path never produces them.

use thiserror::Error;

use crate::{ElementKind, EntityHandle, ModelId};

/// A pattern or handle could not be resolved against a model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Pattern matched zero elements where at least one was required.
    #[error("no {kind} matched {patterns:?} (excluding {exclude:?}) in {model}")]
    NoMatch {
        /// Element kind that was searched.
        kind: ElementKind,
        /// Inclusion expressions.
        patterns: Vec<String>,
        /// Exclusion expressions.
        exclude: Vec<String>,
        /// Model that was searched.
        model: ModelId,
    },

    /// Handle was resolved against a different model instance.
    #[error("handle {handle} does not belong to {model}")]
    ForeignHandle {
        /// The offending handle.
        handle: EntityHandle,
        /// Model it was presented to.
        model: ModelId,
    },

    /// Handle kind does not fit the operation.
    #[error("expected a {expected} handle, got {handle}")]
    WrongKind {
        /// Kind the operation needs.
        expected: ElementKind,
        /// The offending handle.
        handle: EntityHandle,
    },

    /// Named entity scope does not exist in the model.
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),
}

impl ResolutionError {
    /// Create a no-match error.
    #[must_use]
    pub fn no_match(
        kind: ElementKind,
        patterns: Vec<String>,
        exclude: Vec<String>,
        model: ModelId,
    ) -> Self {
        Self::NoMatch {
            kind,
            patterns,
            exclude,
            model,
        }
    }

    /// Check if this is a no-match error.
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }
}

/// A configuration value violates a physical or structural invariant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Physical parameter must be strictly positive and finite.
    #[error("{what} must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the parameter.
        what: String,
        /// The offending value.
        value: f64,
    },

    /// Physical parameter must be non-negative and finite.
    #[error("{what} must be non-negative and finite, got {value}")]
    Negative {
        /// Name of the parameter.
        what: String,
        /// The offending value.
        value: f64,
    },

    /// Regular expression failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Source expression.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Element name declared twice within one kind.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// Element kind.
        kind: ElementKind,
        /// The repeated name.
        name: String,
    },

    /// Referenced parent body does not exist.
    #[error("unknown body '{0}'")]
    UnknownBody(String),

    /// Values that must agree with each other do not.
    #[error("inconsistent configuration: {reason}")]
    Inconsistent {
        /// Description of the inconsistency.
        reason: String,
    },
}

impl ValidationError {
    /// Create a non-positive parameter error.
    #[must_use]
    pub fn non_positive(what: impl Into<String>, value: f64) -> Self {
        Self::NonPositive {
            what: what.into(),
            value,
        }
    }

    /// Create a negative parameter error.
    #[must_use]
    pub fn negative(what: impl Into<String>, value: f64) -> Self {
        Self::Negative {
            what: what.into(),
            value,
        }
    }

    /// Create an inconsistency error.
    #[must_use]
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            reason: reason.into(),
        }
    }

    /// Require `value` to be strictly positive and finite.
    pub fn require_positive(what: &str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::non_positive(what, value))
        }
    }

    /// Require `value` to be non-negative and finite.
    pub fn require_non_negative(what: &str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::negative(what, value))
        }
    }
}

/// A task configuration edit is structurally invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Edit or removal names a term that does not exist.
    #[error("no {kind} term named '{name}'")]
    UnknownTerm {
        /// Term kind.
        kind: &'static str,
        /// Requested term name.
        name: String,
    },

    /// Insertion collides with an existing term.
    #[error("{kind} term '{name}' already exists")]
    DuplicateTerm {
        /// Term kind.
        kind: &'static str,
        /// Colliding term name.
        name: String,
    },

    /// Term parameter refers to a sensor that is not declared.
    #[error("{kind} term '{term}' refers to undeclared sensor '{sensor}'")]
    UnknownSensor {
        /// Kind of the referring term.
        kind: &'static str,
        /// Referring term.
        term: String,
        /// Missing sensor name.
        sensor: String,
    },

    /// Term selects an entity the scene does not declare.
    #[error("{kind} term '{term}' refers to undeclared entity '{entity}'")]
    UnknownEntity {
        /// Kind of the referring term.
        kind: &'static str,
        /// Referring term.
        term: String,
        /// Missing entity name.
        entity: String,
    },

    /// Edit targets a field that the configuration does not have.
    #[error("cannot apply edit: {reason}")]
    InvalidEdit {
        /// What went wrong.
        reason: String,
    },
}

impl ConfigError {
    /// Create an unknown term error.
    #[must_use]
    pub fn unknown_term(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownTerm {
            kind,
            name: name.into(),
        }
    }

    /// Create a duplicate term error.
    #[must_use]
    pub fn duplicate_term(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateTerm {
            kind,
            name: name.into(),
        }
    }

    /// Create an invalid edit error.
    #[must_use]
    pub fn invalid_edit(reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            reason: reason.into(),
        }
    }

    /// Check if this error reports a missing term.
    #[must_use]
    pub fn is_unknown_term(&self) -> bool {
        matches!(self, Self::UnknownTerm { .. })
    }
}

/// Any configuration-time failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Pattern or handle resolution failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Physical or structural validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Task composition failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SimError {
    /// Check if this is a resolution error.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Check if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
