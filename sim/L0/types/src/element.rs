//! Element kinds, model identifiers, and entity handles.
//!
//! An [`EntityHandle`] names one concrete joint, body, geom, or site inside
//! one compiled model. Handles can only be minted by a
//! [`ModelNamespace`](crate::ModelNamespace), and each carries the
//! [`ModelId`] of the namespace that produced it, so a handle resolved
//! against one model is never silently accepted by another.

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of named element in a simulation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementKind {
    /// Articulated joint.
    Joint,
    /// Rigid body in the kinematic tree.
    Body,
    /// Collision/visual geometry attached to a body.
    Geom,
    /// Reference frame attached to a body.
    Site,
}

impl ElementKind {
    /// All element kinds, in a fixed order.
    pub const ALL: [Self; 4] = [Self::Joint, Self::Body, Self::Geom, Self::Site];

    /// Lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Joint => "joint",
            Self::Body => "body",
            Self::Geom => "geom",
            Self::Site => "site",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one compiled model instance.
///
/// Every namespace receives a fresh id when it is built. Recompiling a
/// model produces a new id, invalidating handles resolved earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model({})", self.0)
    }
}

/// Opaque, stable identifier for one element of one model.
///
/// Equality is identity: two handles are equal only if they refer to the
/// same element of the same model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    model: ModelId,
    kind: ElementKind,
    index: usize,
}

impl EntityHandle {
    pub(crate) const fn new(model: ModelId, kind: ElementKind, index: usize) -> Self {
        Self { model, kind, index }
    }

    /// Model instance this handle was resolved against.
    #[must_use]
    pub const fn model(self) -> ModelId {
        self.model
    }

    /// Kind of element this handle refers to.
    #[must_use]
    pub const fn kind(self) -> ElementKind {
        self.kind
    }

    /// Declaration index of the element within its kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]@{}", self.kind, self.index, self.model)
    }
}
