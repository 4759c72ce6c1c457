//! Task configuration: staging builder and immutable result.

use sim_sensor::{ContactSensorRegistry, SensorError};
use sim_types::{
    ConfigError, ModelNamespace, ResolutionError, Result, SimulationConfig, ValidationError,
};
use tracing::debug;

use crate::params::{AssetSelector, Params};
use crate::scene::{BoundEntity, SceneCfg, ViewerCfg};
use crate::term_map::TermMap;
use crate::terms::{
    ActionTermCfg, CommandTermCfg, CurriculumTermCfg, EventTermCfg, ObservationGroupCfg,
    RewardTermCfg, Term, TermKind, TerminationTermCfg,
};
use crate::variant::TaskVariant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mutable staging area for a [`TaskConfig`].
///
/// Robot task builders start from a shared base builder, edit it, and
/// call [`TaskConfigBuilder::build`]. Each builder owns all of its nested
/// fragments, so edits never leak between tasks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfigBuilder {
    /// Physics timing.
    pub sim: SimulationConfig,
    /// Episode length (s).
    pub episode_length_s: f64,
    /// Terrain, entities, and sensors.
    pub scene: SceneCfg,
    /// Playback camera.
    pub viewer: ViewerCfg,
    /// Action terms.
    pub actions: TermMap<ActionTermCfg>,
    /// Command terms.
    pub commands: TermMap<CommandTermCfg>,
    /// Observation groups.
    pub observations: TermMap<ObservationGroupCfg>,
    /// Reward terms.
    pub rewards: TermMap<RewardTermCfg>,
    /// Termination terms.
    pub terminations: TermMap<TerminationTermCfg>,
    /// Event terms.
    pub events: TermMap<EventTermCfg>,
    /// Curriculum terms.
    pub curriculum: TermMap<CurriculumTermCfg>,
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self {
            sim: SimulationConfig::default(),
            episode_length_s: 20.0,
            scene: SceneCfg::default(),
            viewer: ViewerCfg::default(),
            actions: TermMap::new(TermKind::Action),
            commands: TermMap::new(TermKind::Command),
            observations: TermMap::new(TermKind::Observation),
            rewards: TermMap::new(TermKind::Reward),
            terminations: TermMap::new(TermKind::Termination),
            events: TermMap::new(TermKind::Event),
            curriculum: TermMap::new(TermKind::Curriculum),
        }
    }
}

impl TaskConfigBuilder {
    /// Empty configuration with default timing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new fragment.
    ///
    /// # Errors
    ///
    /// Fails if a fragment of the same kind and name exists.
    pub fn insert(&mut self, name: impl Into<String>, term: Term) -> std::result::Result<(), ConfigError> {
        match term {
            Term::Action(t) => self.actions.insert(name, t),
            Term::Command(t) => self.commands.insert(name, t),
            Term::Observation(t) => self.observations.insert(name, t),
            Term::Reward(t) => self.rewards.insert(name, t),
            Term::Termination(t) => self.terminations.insert(name, t),
            Term::Event(t) => self.events.insert(name, t),
            Term::Curriculum(t) => self.curriculum.insert(name, t),
            Term::Sensor(t) => self.scene.sensors.insert(name, t),
        }
    }

    /// Swap an existing fragment wholesale.
    ///
    /// # Errors
    ///
    /// Fails if no fragment of that kind has this name.
    pub fn replace(&mut self, name: &str, term: Term) -> std::result::Result<(), ConfigError> {
        match term {
            Term::Action(t) => self.actions.replace(name, t).map(drop),
            Term::Command(t) => self.commands.replace(name, t).map(drop),
            Term::Observation(t) => self.observations.replace(name, t).map(drop),
            Term::Reward(t) => self.rewards.replace(name, t).map(drop),
            Term::Termination(t) => self.terminations.replace(name, t).map(drop),
            Term::Event(t) => self.events.replace(name, t).map(drop),
            Term::Curriculum(t) => self.curriculum.replace(name, t).map(drop),
            Term::Sensor(t) => self.scene.sensors.replace(name, t).map(drop),
        }
    }

    /// Delete a fragment.
    ///
    /// # Errors
    ///
    /// Fails if no fragment of that kind has this name.
    pub fn remove(&mut self, kind: TermKind, name: &str) -> std::result::Result<(), ConfigError> {
        match kind {
            TermKind::Action => self.actions.remove(name).map(drop),
            TermKind::Command => self.commands.remove(name).map(drop),
            TermKind::Observation => self.observations.remove(name).map(drop),
            TermKind::Reward => self.rewards.remove(name).map(drop),
            TermKind::Termination => self.terminations.remove(name).map(drop),
            TermKind::Event => self.events.remove(name).map(drop),
            TermKind::Curriculum => self.curriculum.remove(name).map(drop),
            TermKind::Sensor => self.scene.sensors.remove(name).map(drop),
        }
    }

    /// Check that the configuration is self-consistent and freeze it.
    ///
    /// # Errors
    ///
    /// See [`TaskConfig::validate`].
    pub fn build(self) -> Result<TaskConfig> {
        let config = TaskConfig { inner: self };
        config.validate()?;
        debug!(
            rewards = config.inner.rewards.len(),
            sensors = config.inner.scene.sensors.len(),
            "built task configuration"
        );
        Ok(config)
    }
}

fn push_assets<'a>(
    out: &mut Vec<(TermKind, &'a str, &'a AssetSelector)>,
    kind: TermKind,
    term: &'a str,
    params: &'a Params,
) {
    out.extend(params.assets().map(|(_, asset)| (kind, term, asset)));
}

/// An assembled, immutable task configuration.
///
/// Derived configurations are produced with [`TaskConfig::apply`] or via
/// [`TaskConfig::to_builder`]; the receiver is never modified.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfig {
    inner: TaskConfigBuilder,
}

impl std::ops::Deref for TaskConfig {
    type Target = TaskConfigBuilder;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl TaskConfig {
    /// Independent mutable copy.
    #[must_use]
    pub fn to_builder(&self) -> TaskConfigBuilder {
        self.inner.clone()
    }

    /// New configuration with `variant`'s edits applied in order.
    ///
    /// # Errors
    ///
    /// Fails on the first edit that references an absent term or that
    /// leaves the configuration inconsistent.
    pub fn apply(&self, variant: &TaskVariant) -> Result<Self> {
        let mut builder = self.to_builder();
        variant.apply_to(&mut builder)?;
        builder.build()
    }

    /// Control steps per episode.
    #[must_use]
    pub fn max_episode_steps(&self) -> u64 {
        self.inner.sim.max_episode_steps(self.inner.episode_length_s)
    }

    /// Check self-consistency.
    ///
    /// - timing, terrain, articulations and sensors pass their own checks
    /// - every sensor is stored under its own name
    /// - every `sensor_name` parameter of a reward or termination names a
    ///   declared sensor
    /// - every asset selector names a declared entity
    pub fn validate(&self) -> Result<()> {
        let cfg = &self.inner;
        cfg.sim.validate()?;
        ValidationError::require_positive("episode length", cfg.episode_length_s)?;
        if let Some(terrain) = &cfg.scene.terrain {
            terrain.validate()?;
        }
        for entity in cfg.scene.entities.values() {
            entity.articulation.validate()?;
        }
        for (name, sensor) in cfg.scene.sensors.iter() {
            sensor.validate()?;
            if sensor.name != name {
                return Err(ValidationError::inconsistent(format!(
                    "sensor '{}' is declared under the name '{name}'",
                    sensor.name
                ))
                .into());
            }
        }

        let sensor_refs = cfg
            .rewards
            .iter()
            .map(|(n, t)| (TermKind::Reward, n, &t.params))
            .chain(
                cfg.terminations
                    .iter()
                    .map(|(n, t)| (TermKind::Termination, n, &t.params)),
            );
        for (kind, term, params) in sensor_refs {
            if let Some(sensor) = params.sensor_name() {
                if !cfg.scene.sensors.contains(sensor) {
                    return Err(ConfigError::UnknownSensor {
                        kind: kind.as_str(),
                        term: term.to_owned(),
                        sensor: sensor.to_owned(),
                    }
                    .into());
                }
            }
        }

        for (kind, term, asset) in self.asset_selectors() {
            if !cfg.scene.entities.contains_key(&asset.entity) {
                return Err(ConfigError::UnknownEntity {
                    kind: kind.as_str(),
                    term: term.to_owned(),
                    entity: asset.entity.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Every asset selector in the configuration, with its owning term.
    #[must_use]
    pub fn asset_selectors(&self) -> Vec<(TermKind, &str, &AssetSelector)> {
        let cfg = &self.inner;
        let mut out: Vec<(TermKind, &str, &AssetSelector)> = cfg
            .actions
            .iter()
            .map(|(n, t)| (TermKind::Action, n, &t.asset))
            .collect();

        for (n, t) in cfg.commands.iter() {
            push_assets(&mut out, TermKind::Command, n, &t.params);
        }
        for (_, group) in cfg.observations.iter() {
            for (n, t) in group.terms.iter() {
                push_assets(&mut out, TermKind::Observation, n, &t.params);
            }
        }
        for (n, t) in cfg.rewards.iter() {
            push_assets(&mut out, TermKind::Reward, n, &t.params);
        }
        for (n, t) in cfg.terminations.iter() {
            push_assets(&mut out, TermKind::Termination, n, &t.params);
        }
        for (n, t) in cfg.events.iter() {
            push_assets(&mut out, TermKind::Event, n, &t.params);
        }
        for (n, t) in cfg.curriculum.iter() {
            push_assets(&mut out, TermKind::Curriculum, n, &t.params);
        }
        out
    }

    /// Resolve one scene entity against `namespace`.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not in the scene or any of its patterns fail
    /// to resolve.
    pub fn bind_entity(&self, name: &str, namespace: &ModelNamespace) -> Result<BoundEntity> {
        let entity = self
            .inner
            .scene
            .entities
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownEntity(name.to_owned()))?;
        entity.bind(name, namespace)
    }

    /// Bind every scene sensor against `namespace`.
    ///
    /// # Errors
    ///
    /// Fails if any sensor fails to bind.
    pub fn bind_sensors(
        &self,
        namespace: &ModelNamespace,
    ) -> std::result::Result<ContactSensorRegistry, SensorError> {
        ContactSensorRegistry::bind_all(self.inner.scene.sensors.iter().map(|(_, s)| s), namespace)
    }
}
