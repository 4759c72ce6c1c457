//! A robot's full set of actuator groups, bound to a model.

use sim_pattern::{PatternResolver, ResolveOptions, Scope, ValueMap};
use sim_types::{ElementKind, EntityHandle, ModelNamespace, Result, ValidationError};
use tracing::debug;

use crate::group::ActuatorGroup;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Actuator groups of one robot plus joint-limit softening.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Articulation {
    /// Actuator groups; a joint may belong to at most one.
    pub groups: Vec<ActuatorGroup>,
    /// Fraction of the hard joint range used as the soft limit.
    pub soft_joint_pos_limit_factor: f64,
}

impl Default for Articulation {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            soft_joint_pos_limit_factor: 1.0,
        }
    }
}

impl Articulation {
    /// Create an articulation from its groups.
    #[must_use]
    pub fn new(groups: Vec<ActuatorGroup>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    /// Set the soft joint limit factor.
    #[must_use]
    pub fn with_soft_limit_factor(mut self, factor: f64) -> Self {
        self.soft_joint_pos_limit_factor = factor;
        self
    }

    /// Validate every group and the limit factor.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let factor = self.soft_joint_pos_limit_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ValidationError::inconsistent(format!(
                "soft joint limit factor must be in (0, 1], got {factor}"
            )));
        }
        self.groups.iter().try_for_each(ActuatorGroup::validate)
    }

    /// Per-joint action scales, keyed by each group's target patterns.
    ///
    /// Every group contributes its patterns with value
    /// `factor · effort_limit / stiffness`, in group order.
    #[must_use]
    pub fn action_scale_table(&self, factor: f64) -> ValueMap<f64> {
        action_scale_table(&self.groups, factor)
    }

    /// Resolve every group's targets against `namespace`.
    ///
    /// Returns one entry per actuated joint, in namespace order.
    ///
    /// # Errors
    ///
    /// Fails if validation fails, a group matches no joint, or two groups
    /// claim the same joint.
    pub fn bind(&self, namespace: &ModelNamespace) -> Result<Vec<ActuatedJoint>> {
        self.bind_with(namespace, &ResolveOptions::required())
    }

    /// Like [`Articulation::bind`], but only joints of `entity` are
    /// candidates.
    ///
    /// # Errors
    ///
    /// As [`Articulation::bind`], or if the entity is unknown.
    pub fn bind_in_entity(
        &self,
        namespace: &ModelNamespace,
        entity: &str,
    ) -> Result<Vec<ActuatedJoint>> {
        self.bind_with(namespace, &ResolveOptions::required().in_entity(entity))
    }

    fn bind_with(
        &self,
        namespace: &ModelNamespace,
        options: &ResolveOptions,
    ) -> Result<Vec<ActuatedJoint>> {
        self.validate()?;
        let resolver = PatternResolver::new(namespace);
        let mut owner: Vec<Option<usize>> = vec![None; namespace.len(ElementKind::Joint)];

        for (g, group) in self.groups.iter().enumerate() {
            for joint in
                resolver.resolve_with(&group.targets, ElementKind::Joint, Scope::Direct, options)?
            {
                if let Some(previous) = owner[joint.index()].replace(g) {
                    return Err(ValidationError::inconsistent(format!(
                        "joint '{}' is claimed by actuator groups {previous} and {g}",
                        namespace.name(joint)?
                    ))
                    .into());
                }
            }
        }

        let bound: Vec<ActuatedJoint> = namespace
            .handles(ElementKind::Joint)
            .zip(owner)
            .filter_map(|(joint, g)| {
                g.map(|group| ActuatedJoint {
                    joint,
                    group,
                    stiffness: self.groups[group].stiffness,
                    damping: self.groups[group].damping,
                    effort_limit: self.groups[group].effort_limit,
                    armature: self.groups[group].armature,
                })
            })
            .collect();

        debug!(
            groups = self.groups.len(),
            joints = bound.len(),
            "bound actuator groups"
        );
        Ok(bound)
    }
}

/// Bind `articulation` against `namespace`; see [`Articulation::bind`].
///
/// # Errors
///
/// Same as [`Articulation::bind`].
pub fn resolve_actuators(
    articulation: &Articulation,
    namespace: &ModelNamespace,
) -> Result<Vec<ActuatedJoint>> {
    articulation.bind(namespace)
}

/// Action-scale table for a list of groups.
///
/// Computed once at configuration-build time from the groups passed in;
/// there is no global table.
#[must_use]
pub fn action_scale_table(groups: &[ActuatorGroup], factor: f64) -> ValueMap<f64> {
    let mut table = ValueMap::new();
    for group in groups {
        let scale = group.action_scale(factor);
        for expr in group.targets.includes() {
            let pattern = sim_pattern::NamePattern::new(expr.clone())
                .excluding(group.targets.excludes().iter().cloned());
            table.push(pattern, scale);
        }
    }
    table
}

/// Control parameters of one actuated joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatedJoint {
    /// The joint.
    pub joint: EntityHandle,
    /// Index of the owning group in [`Articulation::groups`].
    pub group: usize,
    /// Position-loop proportional gain.
    pub stiffness: f64,
    /// Position-loop derivative gain.
    pub damping: f64,
    /// Maximum output torque.
    pub effort_limit: f64,
    /// Reflected rotor inertia.
    pub armature: f64,
}
