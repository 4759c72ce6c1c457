//! Resolution of name patterns against a model namespace.

use sim_types::{ElementKind, EntityHandle, ModelNamespace, ResolutionError, Result};
use tracing::{debug, warn};

use crate::pattern::{CompiledPattern, NamePattern};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How matched names are expanded before being returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scope {
    /// Match elements of the requested kind by their own names.
    #[default]
    Direct,
    /// Match bodies by name, then return every element of the requested
    /// kind owned by a body in the matched bodies' subtrees.
    Subtree,
}

/// Options controlling a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolveOptions {
    /// Return an empty result instead of failing when nothing matches.
    pub allow_empty: bool,
    /// Restrict matches to elements of this entity.
    pub entity: Option<String>,
}

impl ResolveOptions {
    /// Options requiring at least one match, any entity.
    #[must_use]
    pub fn required() -> Self {
        Self::default()
    }

    /// Allow an empty result.
    #[must_use]
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Restrict matches to one entity.
    #[must_use]
    pub fn in_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

/// Matches a compiled pattern against a namespace snapshot.
///
/// Implementations return matches in namespace declaration order with
/// no duplicates, and do not apply the empty-result check.
pub trait NamespaceMatcher {
    /// Matching elements of `kind`.
    fn match_in(&self, kind: ElementKind, namespace: &ModelNamespace) -> Vec<EntityHandle>;
}

impl NamespaceMatcher for CompiledPattern {
    fn match_in(&self, kind: ElementKind, namespace: &ModelNamespace) -> Vec<EntityHandle> {
        namespace
            .handles(kind)
            .zip(namespace.names(kind))
            .filter(|(_, name)| self.is_match(name))
            .map(|(handle, _)| handle)
            .collect()
    }
}

/// Subtree expansion of a compiled pattern.
///
/// Inclusion expressions select bodies; exclusion expressions are applied
/// to the expanded elements, so an excluded descendant is dropped even when
/// its ancestor matched.
#[derive(Debug, Clone, Copy)]
pub struct Subtree<'p>(pub &'p CompiledPattern);

impl NamespaceMatcher for Subtree<'_> {
    fn match_in(&self, kind: ElementKind, namespace: &ModelNamespace) -> Vec<EntityHandle> {
        let mut mask = vec![false; namespace.len(ElementKind::Body)];
        for (body, name) in namespace
            .handles(ElementKind::Body)
            .zip(namespace.names(ElementKind::Body))
        {
            if mask[body.index()] || !self.0.is_included(name) {
                continue;
            }
            if let Ok(sub) = namespace.subtree_mask(body) {
                for (m, s) in mask.iter_mut().zip(sub) {
                    *m |= s;
                }
            }
        }

        namespace
            .elements_in_bodies(&mask, kind)
            .into_iter()
            .filter(|&h| {
                namespace
                    .name(h)
                    .map(|name| !self.0.is_excluded(name))
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// Resolves [`NamePattern`]s against one model namespace.
///
/// Results follow the namespace's declaration order, never the order of
/// the expressions, so repeated resolutions over the same model return
/// identical sequences.
///
/// # Example
///
/// ```
/// use sim_pattern::{NamePattern, PatternResolver, ResolveOptions};
/// use sim_types::{ElementKind, NamespaceBuilder};
///
/// let mut b = NamespaceBuilder::new();
/// b.add_body("pelvis", "world").unwrap();
/// b.add_joint("right_knee_joint", "pelvis").unwrap();
/// b.add_joint("left_knee_joint", "pelvis").unwrap();
/// let ns = b.build();
///
/// let resolver = PatternResolver::new(&ns);
/// let pattern = NamePattern::any_of(["left_.*", "right_.*"]);
/// let joints = resolver.resolve(&pattern, ElementKind::Joint).unwrap();
///
/// // Declaration order, not pattern order.
/// assert_eq!(resolver.names(&joints).unwrap(), ["right_knee_joint", "left_knee_joint"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PatternResolver<'a> {
    namespace: &'a ModelNamespace,
}

impl<'a> PatternResolver<'a> {
    /// Create a resolver over `namespace`.
    #[must_use]
    pub fn new(namespace: &'a ModelNamespace) -> Self {
        Self { namespace }
    }

    /// The namespace being resolved against.
    #[must_use]
    pub fn namespace(&self) -> &'a ModelNamespace {
        self.namespace
    }

    /// Resolve a pattern requiring at least one match.
    ///
    /// # Errors
    ///
    /// Fails if an expression does not compile or nothing matches.
    pub fn resolve(&self, pattern: &NamePattern, kind: ElementKind) -> Result<Vec<EntityHandle>> {
        self.resolve_with(pattern, kind, Scope::Direct, &ResolveOptions::required())
    }

    /// Resolve a pattern with explicit scope and options.
    ///
    /// # Errors
    ///
    /// Fails if an expression does not compile, the entity is unknown, or
    /// nothing matches and `options.allow_empty` is not set.
    pub fn resolve_with(
        &self,
        pattern: &NamePattern,
        kind: ElementKind,
        scope: Scope,
        options: &ResolveOptions,
    ) -> Result<Vec<EntityHandle>> {
        let compiled = pattern.compile()?;
        let matched = match scope {
            Scope::Direct => compiled.match_in(kind, self.namespace),
            Scope::Subtree => Subtree(&compiled).match_in(kind, self.namespace),
        };
        let handles = self.restrict_to_entity(matched, options)?;

        if handles.is_empty() && options.allow_empty && !pattern.excludes().is_empty() {
            let search = match scope {
                Scope::Direct => kind,
                Scope::Subtree => ElementKind::Body,
            };
            if self.namespace.names(search).any(|name| compiled.is_included(name)) {
                warn!(pattern = %pattern, %kind, "exclusions removed every match");
            }
        }

        if handles.is_empty() && !options.allow_empty {
            return Err(ResolutionError::no_match(
                kind,
                pattern.includes().to_vec(),
                pattern.excludes().to_vec(),
                self.namespace.id(),
            )
            .into());
        }

        debug!(
            pattern = %pattern,
            %kind,
            ?scope,
            count = handles.len(),
            "resolved name pattern"
        );
        Ok(handles)
    }

    /// Drop matches outside the requested entity.
    ///
    /// # Errors
    ///
    /// Fails if the entity was never declared in the namespace.
    pub fn restrict_to_entity(
        &self,
        handles: Vec<EntityHandle>,
        options: &ResolveOptions,
    ) -> Result<Vec<EntityHandle>> {
        let Some(entity) = options.entity.as_deref() else {
            return Ok(handles);
        };
        if !self.namespace.has_entity(entity) {
            return Err(ResolutionError::UnknownEntity(entity.to_owned()).into());
        }
        Ok(handles
            .into_iter()
            .filter(|&h| matches!(self.namespace.entity_of(h), Ok(Some(e)) if e == entity))
            .collect())
    }

    /// Names of resolved handles, in the same order.
    ///
    /// # Errors
    ///
    /// Fails if any handle belongs to another model.
    pub fn names(&self, handles: &[EntityHandle]) -> Result<Vec<&'a str>> {
        handles
            .iter()
            .map(|&h| self.namespace.name(h).map_err(Into::into))
            .collect()
    }
}

/// Resolve `pattern` over elements of `kind`, requiring at least one match.
///
/// # Errors
///
/// Fails if an expression does not compile or nothing matches.
pub fn resolve(
    pattern: &NamePattern,
    kind: ElementKind,
    namespace: &ModelNamespace,
) -> Result<Vec<EntityHandle>> {
    PatternResolver::new(namespace).resolve(pattern, kind)
}
