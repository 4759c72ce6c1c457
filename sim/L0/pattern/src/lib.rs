//! Name-pattern resolution for model elements.
//!
//! Task configuration names joints, bodies, geoms, and sites with regular
//! expressions rather than indices. This crate binds those expressions to a
//! concrete [`ModelNamespace`](sim_types::ModelNamespace):
//!
//! - [`NamePattern`] - Inclusion expressions plus exclusions
//! - [`PatternResolver`] - Whole-name matching with optional subtree expansion
//! - [`ValueMap`] - `pattern → value` tables with first-match-wins semantics
//! - [`NamespaceMatcher`] - Seam for alternative matching strategies
//!
//! # Guarantees
//!
//! - Whole-name matching: every expression is anchored at both ends.
//! - Exclusion always wins over inclusion.
//! - Results follow namespace declaration order and contain no duplicates.
//! - Zero matches is an error unless the caller opts in to empty results.

#![doc(html_root_url = "https://docs.rs/sim-pattern/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::missing_errors_doc)]

mod pattern;
mod resolver;
mod value_map;

pub use pattern::{CompiledPattern, NamePattern};
pub use resolver::{NamespaceMatcher, PatternResolver, ResolveOptions, Scope, Subtree, resolve};
pub use value_map::ValueMap;
