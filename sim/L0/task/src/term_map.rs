//! Insertion-ordered, name-addressed term storage.

use indexmap::IndexMap;
use sim_types::ConfigError;

use crate::terms::TermKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Terms of one kind, addressed by name, in insertion order.
///
/// Edits are structural: [`TermMap::replace`] swaps a whole fragment and
/// [`TermMap::remove`] deletes it. Both fail with
/// [`ConfigError::UnknownTerm`] when the name is absent, so a misspelt
/// override is never a silent no-op.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TermMap<T> {
    kind: TermKind,
    terms: IndexMap<String, T>,
}

impl<T> TermMap<T> {
    /// Empty mapping of `kind`.
    #[must_use]
    pub fn new(kind: TermKind) -> Self {
        Self {
            kind,
            terms: IndexMap::new(),
        }
    }

    /// Add a term while building a base configuration.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken.
    pub fn with(mut self, name: impl Into<String>, term: T) -> Result<Self, ConfigError> {
        self.insert(name, term)?;
        Ok(self)
    }

    /// Kind of the stored terms.
    #[must_use]
    pub fn kind(&self) -> TermKind {
        self.kind
    }

    /// Add a new term.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::DuplicateTerm`] if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, term: T) -> Result<(), ConfigError> {
        let name = name.into();
        if self.terms.contains_key(&name) {
            return Err(ConfigError::duplicate_term(self.kind.as_str(), name));
        }
        self.terms.insert(name, term);
        Ok(())
    }

    /// Swap an existing term wholesale, keeping its position.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::UnknownTerm`] if the name is absent.
    pub fn replace(&mut self, name: &str, term: T) -> Result<T, ConfigError> {
        let slot = self
            .terms
            .get_mut(name)
            .ok_or_else(|| ConfigError::unknown_term(self.kind.as_str(), name))?;
        Ok(std::mem::replace(slot, term))
    }

    /// Delete a term, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::UnknownTerm`] if the name is absent.
    pub fn remove(&mut self, name: &str) -> Result<T, ConfigError> {
        self.terms
            .shift_remove(name)
            .ok_or_else(|| ConfigError::unknown_term(self.kind.as_str(), name))
    }

    /// Look up a term.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.terms.get(name)
    }

    /// Look up a term that must exist.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::UnknownTerm`] if the name is absent.
    pub fn require(&self, name: &str) -> Result<&T, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::unknown_term(self.kind.as_str(), name))
    }

    /// Check if a term exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.terms.contains_key(name)
    }

    /// Term names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.keys().map(String::as_str)
    }

    /// Terms in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if there are no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<T: Clone> TermMap<T> {
    /// Modify a copy of a term and swap it in.
    ///
    /// If `f` fails the stored term is left untouched.
    ///
    /// # Errors
    ///
    /// Fails if the name is absent or `f` fails.
    pub fn edit<F>(&mut self, name: &str, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut T) -> Result<(), ConfigError>,
    {
        let mut term = self.require(name)?.clone();
        f(&mut term)?;
        self.replace(name, term).map(drop)
    }
}
