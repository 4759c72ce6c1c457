//! Name patterns and their compiled form.

use regex::RegexSet;
use sim_types::ValidationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One or more regular expressions plus optional exclusions.
///
/// A `NamePattern` is a predicate over element names, not a cached result:
/// it is re-evaluated against whichever model it is resolved against.
/// Every expression must match the **whole** name; `"knee"` does not
/// match `"left_knee_joint"`, `".*knee.*"` does.
///
/// # Example
///
/// ```
/// use sim_pattern::NamePattern;
///
/// let pattern = NamePattern::any_of([".*_collision"]).excluding(["FR_foot_collision"]);
/// let compiled = pattern.compile().unwrap();
///
/// assert!(compiled.is_match("base_collision"));
/// assert!(!compiled.is_match("FR_foot_collision"));
/// assert!(!compiled.is_match("base_collision_visual"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamePattern {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl NamePattern {
    /// Create a pattern from a single expression.
    #[must_use]
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            include: vec![expr.into()],
            exclude: Vec::new(),
        }
    }

    /// Create a pattern matching any of several expressions.
    #[must_use]
    pub fn any_of<I, S>(exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: exprs.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    /// Add exclusion expressions. Exclusion always wins over inclusion.
    #[must_use]
    pub fn excluding<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Inclusion expressions.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.include
    }

    /// Exclusion expressions.
    #[must_use]
    pub fn excludes(&self) -> &[String] {
        &self.exclude
    }

    /// Check if the pattern has no inclusion expressions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    /// Compile every expression as a whole-name match.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] for the first expression
    /// that fails to compile.
    pub fn compile(&self) -> Result<CompiledPattern, ValidationError> {
        Ok(CompiledPattern {
            include: compile_set(&self.include)?,
            exclude: compile_set(&self.exclude)?,
            source: self.clone(),
        })
    }
}

impl From<&str> for NamePattern {
    fn from(expr: &str) -> Self {
        Self::new(expr)
    }
}

impl From<String> for NamePattern {
    fn from(expr: String) -> Self {
        Self::new(expr)
    }
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.include.join(" | "))?;
        if !self.exclude.is_empty() {
            write!(f, " except {}", self.exclude.join(" | "))?;
        }
        Ok(())
    }
}

fn anchored(expr: &str) -> String {
    format!("^(?:{expr})$")
}

fn compile_set(exprs: &[String]) -> Result<RegexSet, ValidationError> {
    // Compile one at a time first so the error names the bad expression.
    for expr in exprs {
        regex::Regex::new(&anchored(expr)).map_err(|e| ValidationError::InvalidPattern {
            pattern: expr.clone(),
            reason: e.to_string(),
        })?;
    }
    RegexSet::new(exprs.iter().map(|e| anchored(e))).map_err(|e| {
        ValidationError::InvalidPattern {
            pattern: exprs.join(" | "),
            reason: e.to_string(),
        }
    })
}

/// A [`NamePattern`] with every expression compiled.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    include: RegexSet,
    exclude: RegexSet,
    source: NamePattern,
}

impl CompiledPattern {
    /// Check if `name` matches an inclusion and no exclusion.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.is_included(name) && !self.is_excluded(name)
    }

    /// Check if `name` matches any inclusion expression.
    #[must_use]
    pub fn is_included(&self, name: &str) -> bool {
        self.include.is_match(name)
    }

    /// Check if `name` matches any exclusion expression.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.is_match(name)
    }

    /// The pattern this was compiled from.
    #[must_use]
    pub fn source(&self) -> &NamePattern {
        &self.source
    }
}
