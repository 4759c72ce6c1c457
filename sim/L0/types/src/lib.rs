//! Core types for binding locomotion task configuration to a model.
//!
//! This crate provides the vocabulary shared by the configuration layer:
//!
//! - [`ModelNamespace`] - Named joints, bodies, geoms, and sites of one model,
//!   with body-tree topology
//! - [`EntityHandle`] - Opaque identifier of one element of one model
//! - [`ContactRecord`] - Elementary contact reported by the physics engine
//! - [`SimulationConfig`] - Physics timestep and control decimation
//! - [`ResolutionError`], [`ValidationError`], [`ConfigError`] - Error taxonomy
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no physics and no integration.
//! The physics engine owns the compiled model; this crate only mirrors the
//! names and topology the configuration layer needs to resolve patterns.
//!
//! # Handle Scoping
//!
//! Handles cannot be constructed directly. They are minted by a namespace
//! and stamped with its [`ModelId`]; presenting a handle to a different
//! namespace yields [`ResolutionError::ForeignHandle`].
//!
//! # Example
//!
//! ```
//! use sim_types::{ElementKind, NamespaceBuilder};
//!
//! let mut builder = NamespaceBuilder::new();
//! builder.add_body("pelvis", "world").unwrap();
//! builder.add_geom("pelvis_collision", "pelvis").unwrap();
//! let ns = builder.build();
//!
//! let geom = ns.lookup(ElementKind::Geom, "pelvis_collision").unwrap();
//! let body = ns.body_of(geom).unwrap();
//! assert_eq!(ns.name(body).unwrap(), "pelvis");
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc
)]

mod config;
mod contact;
mod element;
mod error;
mod namespace;

pub use config::SimulationConfig;
pub use contact::ContactRecord;
pub use element::{ElementKind, EntityHandle, ModelId};
pub use error::{ConfigError, ResolutionError, SimError, ValidationError};
pub use namespace::{ModelNamespace, NamespaceBuilder, WORLD_BODY};

// Re-export math types for convenience
pub use nalgebra::Vector3;

/// Result type for configuration-time operations.
pub type Result<T> = std::result::Result<T, SimError>;
