//! Typed term parameters.

use indexmap::IndexMap;
use sim_pattern::{NamePattern, PatternResolver, ResolveOptions, Scope, ValueMap};
use sim_types::{ConfigError, ElementKind, EntityHandle, ModelNamespace, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key under which terms name the contact sensor they read.
pub const SENSOR_NAME: &str = "sensor_name";

/// Elements of one scene entity that a term operates on.
///
/// Unset name patterns select nothing of that kind; consumers resolve the
/// set patterns through [`AssetSelector::resolve`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetSelector {
    /// Scene entity name.
    pub entity: String,
    /// Joints, if any.
    pub joint_names: Option<NamePattern>,
    /// Bodies, if any.
    pub body_names: Option<NamePattern>,
    /// Sites, if any.
    pub site_names: Option<NamePattern>,
    /// Geoms, if any.
    pub geom_names: Option<NamePattern>,
}

impl AssetSelector {
    /// Select nothing of `entity` yet.
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// Select joints.
    #[must_use]
    pub fn with_joints(mut self, pattern: impl Into<NamePattern>) -> Self {
        self.joint_names = Some(pattern.into());
        self
    }

    /// Select bodies.
    #[must_use]
    pub fn with_bodies(mut self, pattern: impl Into<NamePattern>) -> Self {
        self.body_names = Some(pattern.into());
        self
    }

    /// Select sites.
    #[must_use]
    pub fn with_sites(mut self, pattern: impl Into<NamePattern>) -> Self {
        self.site_names = Some(pattern.into());
        self
    }

    /// Select geoms.
    #[must_use]
    pub fn with_geoms(mut self, pattern: impl Into<NamePattern>) -> Self {
        self.geom_names = Some(pattern.into());
        self
    }

    /// Pattern for `kind`, if set.
    #[must_use]
    pub fn pattern(&self, kind: ElementKind) -> Option<&NamePattern> {
        match kind {
            ElementKind::Joint => self.joint_names.as_ref(),
            ElementKind::Body => self.body_names.as_ref(),
            ElementKind::Site => self.site_names.as_ref(),
            ElementKind::Geom => self.geom_names.as_ref(),
        }
    }

    /// Resolve the `kind` selection within the entity.
    ///
    /// Returns an empty list when no pattern is set for `kind`.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not in the model or the pattern matches
    /// nothing.
    pub fn resolve(&self, kind: ElementKind, namespace: &ModelNamespace) -> Result<Vec<EntityHandle>> {
        let Some(pattern) = self.pattern(kind) else {
            return Ok(Vec::new());
        };
        PatternResolver::new(namespace).resolve_with(
            pattern,
            kind,
            Scope::Direct,
            &ResolveOptions::required().in_entity(self.entity.clone()),
        )
    }
}

/// One parameter value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// Scalar.
    Float(f64),
    /// Integer.
    Int(i64),
    /// Flag.
    Bool(bool),
    /// Free-form string, e.g. a sensor or command name.
    Str(String),
    /// Closed interval `(low, high)`.
    Range(f64, f64),
    /// Fixed-length vector.
    Vector(Vec<f64>),
    /// Per-element values keyed by name pattern.
    Values(ValueMap<f64>),
    /// Element selection.
    Asset(AssetSelector),
}

impl ParamValue {
    /// The scalar, if this is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The range, if this is one.
    #[must_use]
    pub fn as_range(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Range(lo, hi) => Some((lo, hi)),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<(f64, f64)> for ParamValue {
    fn from((lo, hi): (f64, f64)) -> Self {
        Self::Range(lo, hi)
    }
}

impl From<ValueMap<f64>> for ParamValue {
    fn from(v: ValueMap<f64>) -> Self {
        Self::Values(v)
    }
}

impl From<AssetSelector> for ParamValue {
    fn from(v: AssetSelector) -> Self {
        Self::Asset(v)
    }
}

/// Named parameters of a term, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Add or overwrite a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Check if a parameter is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a parameter, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sensor this term reads, if any.
    #[must_use]
    pub fn sensor_name(&self) -> Option<&str> {
        self.get(SENSOR_NAME).and_then(ParamValue::as_str)
    }

    /// Asset selectors among the parameters.
    pub fn assets(&self) -> impl Iterator<Item = (&str, &AssetSelector)> + '_ {
        self.0.iter().filter_map(|(k, v)| match v {
            ParamValue::Asset(a) => Some((k.as_str(), a)),
            _ => None,
        })
    }

    /// Mutable access to an existing asset selector.
    ///
    /// # Errors
    ///
    /// Fails if `key` is absent or not an asset selector.
    pub fn asset_mut(&mut self, key: &str) -> std::result::Result<&mut AssetSelector, ConfigError> {
        match self.0.get_mut(key) {
            Some(ParamValue::Asset(a)) => Ok(a),
            Some(_) => Err(ConfigError::invalid_edit(format!(
                "parameter '{key}' is not an asset selector"
            ))),
            None => Err(ConfigError::invalid_edit(format!("no parameter '{key}'"))),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
