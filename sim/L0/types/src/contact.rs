//! Elementary contact records produced by the physics engine.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One elementary contact between two geoms, as reported for one step.
///
/// Geom ids are declaration indices in the model the contact came from.
/// `force` is the world-frame force exerted on `geom1` by `geom2`; the
/// force on `geom2` is its negation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactRecord {
    /// First geometry index.
    pub geom1: usize,
    /// Second geometry index.
    pub geom2: usize,
    /// Force on `geom1` from `geom2` (N), world frame.
    pub force: Vector3<f64>,
}

impl ContactRecord {
    /// Create a contact record.
    #[must_use]
    pub fn new(geom1: usize, geom2: usize, force: Vector3<f64>) -> Self {
        Self {
            geom1,
            geom2,
            force,
        }
    }

    /// Force exerted on `geom`, if it takes part in this contact.
    #[must_use]
    pub fn force_on(&self, geom: usize) -> Option<Vector3<f64>> {
        if geom == self.geom1 {
            Some(self.force)
        } else if geom == self.geom2 {
            Some(-self.force)
        } else {
            None
        }
    }

    /// Check if the contact involves `geom`.
    #[must_use]
    pub fn involves(&self, geom: usize) -> bool {
        self.geom1 == geom || self.geom2 == geom
    }
}
