//! Pattern-keyed values.
//!
//! Keyframes, per-joint action scales, and per-joint reward tolerances are
//! authored as `pattern → value` tables. [`ValueMap::resolve`] turns such a
//! table into concrete `(handle, value)` pairs for one model.

use sim_types::{ElementKind, EntityHandle, ModelNamespace, ResolutionError, Result};
use tracing::{debug, warn};

use crate::pattern::NamePattern;
use crate::resolver::{PatternResolver, ResolveOptions};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered table of `pattern → value` entries.
///
/// When several patterns match the same element, the **first** entry in
/// declaration order wins. This lets a specific pattern precede a catch-all:
///
/// ```
/// use sim_pattern::ValueMap;
/// use sim_types::{ElementKind, NamespaceBuilder};
///
/// let mut b = NamespaceBuilder::new();
/// b.add_body("base", "world").unwrap();
/// b.add_geom("left_foot1_collision", "base").unwrap();
/// b.add_geom("torso_collision", "base").unwrap();
/// let ns = b.build();
///
/// let condim = ValueMap::new()
///     .with(r"^(left|right)_foot[1-7]_collision$", 3)
///     .with(".*_collision", 1);
/// let resolved = condim.resolve(ElementKind::Geom, &ns).unwrap();
/// let values: Vec<i32> = resolved.iter().map(|(_, v)| *v).collect();
/// assert_eq!(values, [3, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueMap<T> {
    entries: Vec<(NamePattern, T)>,
}

impl<T> Default for ValueMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> ValueMap<T> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry keyed by a single expression.
    #[must_use]
    pub fn with(mut self, expr: impl Into<String>, value: T) -> Self {
        self.entries.push((NamePattern::new(expr), value));
        self
    }

    /// Append an entry keyed by a full pattern.
    pub fn push(&mut self, pattern: NamePattern, value: T) {
        self.entries.push((pattern, value));
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[(NamePattern, T)] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map every value, keeping patterns and order.
    #[must_use]
    pub fn map_values<U>(&self, mut f: impl FnMut(&T) -> U) -> ValueMap<U> {
        ValueMap {
            entries: self
                .entries
                .iter()
                .map(|(p, v)| (p.clone(), f(v)))
                .collect(),
        }
    }
}

impl<T: Clone> ValueMap<T> {
    /// Build a table from `(expression, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(expr, v)| (NamePattern::new(expr), v))
                .collect(),
        }
    }

    /// Resolve against elements of `kind`, requiring at least one match.
    ///
    /// # Errors
    ///
    /// Fails if an expression does not compile or no element matches.
    pub fn resolve(
        &self,
        kind: ElementKind,
        namespace: &ModelNamespace,
    ) -> Result<Vec<(EntityHandle, T)>> {
        self.resolve_with(kind, namespace, &ResolveOptions::required())
    }

    /// Resolve against elements of `kind`.
    ///
    /// Output follows namespace declaration order. Elements matched by no
    /// entry are absent from the output.
    ///
    /// # Errors
    ///
    /// Fails if an expression does not compile, the entity is unknown, or no
    /// element matches and `options.allow_empty` is not set.
    pub fn resolve_with(
        &self,
        kind: ElementKind,
        namespace: &ModelNamespace,
        options: &ResolveOptions,
    ) -> Result<Vec<(EntityHandle, T)>> {
        let compiled = self
            .entries
            .iter()
            .map(|(p, _)| p.compile())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let resolver = PatternResolver::new(namespace);
        let candidates = resolver.restrict_to_entity(namespace.handles(kind).collect(), options)?;

        let mut used = vec![false; compiled.len()];
        let mut resolved = Vec::new();
        for handle in candidates {
            let name = namespace.name(handle)?;
            if let Some(i) = compiled.iter().position(|c| c.is_match(name)) {
                used[i] = true;
                resolved.push((handle, self.entries[i].1.clone()));
            }
        }

        for ((pattern, _), used) in self.entries.iter().zip(&used) {
            if !used {
                warn!(pattern = %pattern, %kind, "value pattern matched nothing");
            }
        }

        if resolved.is_empty() && !options.allow_empty {
            return Err(ResolutionError::no_match(
                kind,
                self.entries
                    .iter()
                    .flat_map(|(p, _)| p.includes().iter().cloned())
                    .collect(),
                self.entries
                    .iter()
                    .flat_map(|(p, _)| p.excludes().iter().cloned())
                    .collect(),
                namespace.id(),
            )
            .into());
        }

        debug!(%kind, entries = self.entries.len(), count = resolved.len(), "resolved value map");
        Ok(resolved)
    }
}

impl<T, S: Into<String>> FromIterator<(S, T)> for ValueMap<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(expr, v)| (NamePattern::new(expr), v))
                .collect(),
        }
    }
}
