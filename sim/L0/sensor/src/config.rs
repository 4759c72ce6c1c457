//! Contact sensor configuration.

use sim_pattern::{NamePattern, PatternResolver, ResolveOptions, Scope};
use sim_types::{ElementKind, EntityHandle, ModelNamespace, ValidationError};

use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a [`ContactMatch`] pattern selects geoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchMode {
    /// Pattern names bodies; each body contributes the geoms it owns.
    #[default]
    Body,
    /// Pattern names bodies; each body contributes every geom in its subtree.
    Subtree,
    /// Pattern names geoms directly.
    Geom,
}

/// One side of a contact sensor.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactMatch {
    /// Selection mode.
    pub mode: MatchMode,
    /// Names to match.
    pub pattern: NamePattern,
    /// Restrict matches to this entity.
    pub entity: Option<String>,
    /// Bind even if nothing matches.
    pub allow_empty: bool,
}

impl ContactMatch {
    /// Match bodies by name.
    #[must_use]
    pub fn body(pattern: impl Into<NamePattern>) -> Self {
        Self::with_mode(MatchMode::Body, pattern)
    }

    /// Match body subtrees by root body name.
    #[must_use]
    pub fn subtree(pattern: impl Into<NamePattern>) -> Self {
        Self::with_mode(MatchMode::Subtree, pattern)
    }

    /// Match geoms by name.
    #[must_use]
    pub fn geom(pattern: impl Into<NamePattern>) -> Self {
        Self::with_mode(MatchMode::Geom, pattern)
    }

    fn with_mode(mode: MatchMode, pattern: impl Into<NamePattern>) -> Self {
        Self {
            mode,
            pattern: pattern.into(),
            entity: None,
            allow_empty: false,
        }
    }

    /// Restrict to one entity.
    #[must_use]
    pub fn in_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Permit an empty match.
    #[must_use]
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Resolve to tracked elements and the geoms each one covers.
    ///
    /// Elements are the matched geoms in [`MatchMode::Geom`] and the matched
    /// bodies otherwise. `geoms[i]` lists the geoms of `elements[i]`.
    pub(crate) fn resolve(&self, namespace: &ModelNamespace) -> Result<MatchedSet> {
        let resolver = PatternResolver::new(namespace);
        let mut options = ResolveOptions::required();
        options.allow_empty = self.allow_empty;
        options.entity.clone_from(&self.entity);

        let kind = match self.mode {
            MatchMode::Geom => ElementKind::Geom,
            MatchMode::Body | MatchMode::Subtree => ElementKind::Body,
        };
        let elements = resolver.resolve_with(&self.pattern, kind, Scope::Direct, &options)?;

        let geoms = elements
            .iter()
            .map(|&element| match self.mode {
                MatchMode::Geom => Ok(vec![element]),
                MatchMode::Body => {
                    let mut mask = vec![false; namespace.len(ElementKind::Body)];
                    mask[element.index()] = true;
                    Ok(namespace.elements_in_bodies(&mask, ElementKind::Geom))
                }
                MatchMode::Subtree => namespace.subtree_elements(element, ElementKind::Geom),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(MatchedSet { elements, geoms })
    }
}

/// Resolved side of a contact sensor.
#[derive(Debug, Clone)]
pub(crate) struct MatchedSet {
    pub elements: Vec<EntityHandle>,
    pub geoms: Vec<Vec<EntityHandle>>,
}

/// Data reported per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactField {
    /// Whether the slot holds at least one contact.
    Found,
    /// Contact force on the primary side, summed within the slot.
    Force,
}

/// How matching contacts are reduced into slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reduce {
    /// One contact per slot; contacts past the last slot are dropped.
    #[default]
    None,
    /// Contacts are summed, the k-th matching contact of an element going
    /// to slot `k % num_slots`.
    NetForce,
}

/// Configuration for a contact sensor.
///
/// # Example
///
/// ```
/// use sim_sensor::{ContactField, ContactMatch, ContactSensorConfig, Reduce};
///
/// let feet = ContactSensorConfig::new(
///     "feet_ground_contact",
///     ContactMatch::subtree("left_ankle_roll_link|right_ankle_roll_link").in_entity("robot"),
/// )
/// .with_secondary(ContactMatch::body("terrain"))
/// .with_fields([ContactField::Found, ContactField::Force])
/// .with_reduce(Reduce::NetForce)
/// .with_air_time(true);
///
/// assert!(feet.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactSensorConfig {
    /// Sensor name, referenced by reward and termination terms.
    pub name: String,
    /// Tracked side.
    pub primary: ContactMatch,
    /// Other side; `None` accepts any geom.
    pub secondary: Option<ContactMatch>,
    /// Data reported per slot.
    pub fields: Vec<ContactField>,
    /// Reduction policy.
    pub reduce: Reduce,
    /// Slots per tracked element.
    pub num_slots: usize,
    /// Maintain air and contact durations per tracked element.
    pub track_air_time: bool,
}

impl ContactSensorConfig {
    /// Create a sensor reporting `found` in one slot against any geom.
    #[must_use]
    pub fn new(name: impl Into<String>, primary: ContactMatch) -> Self {
        Self {
            name: name.into(),
            primary,
            secondary: None,
            fields: vec![ContactField::Found],
            reduce: Reduce::None,
            num_slots: 1,
            track_air_time: false,
        }
    }

    /// Set the secondary side.
    #[must_use]
    pub fn with_secondary(mut self, secondary: ContactMatch) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Set the reported fields.
    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = ContactField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    /// Set the reduction policy.
    #[must_use]
    pub fn with_reduce(mut self, reduce: Reduce) -> Self {
        self.reduce = reduce;
        self
    }

    /// Set the number of slots per element.
    #[must_use]
    pub fn with_num_slots(mut self, num_slots: usize) -> Self {
        self.num_slots = num_slots;
        self
    }

    /// Enable or disable air-time tracking.
    #[must_use]
    pub fn with_air_time(mut self, track: bool) -> Self {
        self.track_air_time = track;
        self
    }

    /// Check if a field is reported.
    #[must_use]
    pub fn has_field(&self, field: ContactField) -> bool {
        self.fields.contains(&field)
    }

    /// Check structural consistency.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, zero slots, an empty field list, or an
    /// expression that does not compile.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::inconsistent("contact sensor name is empty"));
        }
        if self.num_slots == 0 {
            return Err(ValidationError::inconsistent(format!(
                "contact sensor '{}' needs at least one slot",
                self.name
            )));
        }
        if self.fields.is_empty() {
            return Err(ValidationError::inconsistent(format!(
                "contact sensor '{}' reports no fields",
                self.name
            )));
        }
        self.primary.pattern.compile()?;
        if let Some(secondary) = &self.secondary {
            secondary.pattern.compile()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use sim_types::NamespaceBuilder;

    fn leg() -> ModelNamespace {
        let mut b = NamespaceBuilder::new();
        b.add_geom("floor", "world").unwrap();
        b.enter_entity("robot");
        b.add_body("pelvis", "world").unwrap();
        b.add_geom("pelvis_collision", "pelvis").unwrap();
        b.add_body("shin", "pelvis").unwrap();
        b.add_geom("shin_collision", "shin").unwrap();
        b.add_body("foot", "shin").unwrap();
        b.add_geom("foot1_collision", "foot").unwrap();
        b.add_geom("foot2_collision", "foot").unwrap();
        b.build()
    }

    fn geom_names(ns: &ModelNamespace, set: &MatchedSet, i: usize) -> Vec<String> {
        set.geoms[i]
            .iter()
            .map(|&g| ns.name(g).unwrap().to_owned())
            .collect()
    }

    #[test]
    fn test_body_mode_owns_direct_geoms() {
        let ns = leg();
        let set = ContactMatch::body("shin").resolve(&ns).unwrap();
        assert_eq!(set.elements.len(), 1);
        assert_eq!(geom_names(&ns, &set, 0), ["shin_collision"]);
    }

    #[test]
    fn test_subtree_mode_covers_descendants() {
        let ns = leg();
        let set = ContactMatch::subtree("shin").resolve(&ns).unwrap();
        assert_eq!(
            geom_names(&ns, &set, 0),
            ["shin_collision", "foot1_collision", "foot2_collision"]
        );
    }

    #[test]
    fn test_geom_mode_elements_are_geoms() {
        let ns = leg();
        let set = ContactMatch::geom("foot[0-9]_collision").resolve(&ns).unwrap();
        assert_eq!(set.elements.len(), 2);
        assert!(set.elements.iter().all(|e| e.kind() == ElementKind::Geom));
    }

    #[test]
    fn test_entity_restriction() {
        let ns = leg();
        let err = ContactMatch::geom("floor")
            .in_entity("robot")
            .resolve(&ns)
            .unwrap_err();
        assert!(err.is_resolution());

        let set = ContactMatch::geom("floor")
            .in_entity("robot")
            .allow_empty()
            .resolve(&ns)
            .unwrap();
        assert!(set.elements.is_empty());
    }

    #[test]
    fn test_validate() {
        let base = ContactSensorConfig::new("feet", ContactMatch::body("foot"));
        assert!(base.validate().is_ok());
        assert!(base.clone().with_num_slots(0).validate().is_err());
        assert!(base.clone().with_fields([ContactField::Found; 0]).validate().is_err());
        let bad = ContactSensorConfig::new("feet", ContactMatch::body("foot("));
        assert!(bad.validate().is_err());
    }
}
