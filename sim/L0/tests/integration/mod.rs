//! Integration tests for the sim-* crate ecosystem.
//!
//! These tests run the configuration pipeline end to end against model
//! namespaces shaped like the real robots:
//! - Task builder → entity binding (keyframes, collisions, actuators)
//! - Task builder → contact sensor binding → per-step aggregation
//! - Handles and model identity across separately built models
//! - Every built-in task and variant against its robot

pub mod fixtures;
pub mod foreign_handles;
pub mod g1_pipeline;
pub mod go2_pipeline;
pub mod task_variants;
