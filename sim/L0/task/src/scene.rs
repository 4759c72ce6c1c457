//! Scene description: terrain, entities, and sensors.

use indexmap::IndexMap;
use nalgebra::Vector3;
use sim_actuator::{ActuatedJoint, Articulation};
use sim_pattern::{NamePattern, PatternResolver, ResolveOptions, Scope, ValueMap};
use sim_sensor::ContactSensorConfig;
use sim_types::{ElementKind, EntityHandle, ModelNamespace, Result, ValidationError};
use tracing::debug;

use crate::term_map::TermMap;
use crate::terms::TermKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ground surface kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerrainType {
    /// Infinite flat plane.
    Plane,
    /// Tiled procedurally generated patches.
    #[default]
    Generator,
}

/// Procedural terrain grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerrainGeneratorCfg {
    /// Order rows by difficulty and promote robots through them.
    pub curriculum: bool,
    /// Difficulty levels.
    pub num_rows: usize,
    /// Patches per level.
    pub num_cols: usize,
    /// Flat margin around the grid (m).
    pub border_width: f64,
    /// Patch size (m).
    pub size: (f64, f64),
    /// Sub-terrain proportions by name.
    pub sub_terrains: IndexMap<String, f64>,
}

impl Default for TerrainGeneratorCfg {
    fn default() -> Self {
        Self {
            curriculum: false,
            num_rows: 10,
            num_cols: 20,
            border_width: 20.0,
            size: (8.0, 8.0),
            sub_terrains: [
                ("flat", 0.2),
                ("pyramid_stairs", 0.2),
                ("pyramid_stairs_inv", 0.2),
                ("hf_pyramid_slope", 0.1),
                ("hf_pyramid_slope_inv", 0.1),
                ("random_rough", 0.2),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
        }
    }
}

impl TerrainGeneratorCfg {
    /// Validate grid dimensions and proportions.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.num_rows == 0 || self.num_cols == 0 {
            return Err(ValidationError::inconsistent(format!(
                "terrain grid must be at least 1x1, got {}x{}",
                self.num_rows, self.num_cols
            )));
        }
        ValidationError::require_non_negative("terrain border width", self.border_width)?;
        ValidationError::require_positive("terrain patch length", self.size.0)?;
        ValidationError::require_positive("terrain patch width", self.size.1)?;
        for (name, &p) in &self.sub_terrains {
            ValidationError::require_non_negative(&format!("proportion of '{name}'"), p)?;
        }
        let total: f64 = self.sub_terrains.values().sum();
        ValidationError::require_positive("total sub-terrain proportion", total)
    }
}

/// Terrain of a scene.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerrainCfg {
    /// Surface kind.
    pub terrain_type: TerrainType,
    /// Generator settings; required for [`TerrainType::Generator`].
    pub generator: Option<TerrainGeneratorCfg>,
    /// Highest difficulty row a robot may start on.
    pub max_init_terrain_level: usize,
}

impl TerrainCfg {
    /// Flat plane.
    #[must_use]
    pub fn plane() -> Self {
        Self {
            terrain_type: TerrainType::Plane,
            generator: None,
            max_init_terrain_level: 0,
        }
    }

    /// Default rough terrain grid.
    #[must_use]
    pub fn rough() -> Self {
        Self {
            terrain_type: TerrainType::Generator,
            generator: Some(TerrainGeneratorCfg::default()),
            max_init_terrain_level: 5,
        }
    }

    /// Check that the surface kind and generator agree.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        match (self.terrain_type, &self.generator) {
            (TerrainType::Generator, None) => Err(ValidationError::inconsistent(
                "generator terrain has no generator settings",
            )),
            (TerrainType::Plane, Some(_)) => Err(ValidationError::inconsistent(
                "plane terrain carries generator settings",
            )),
            (_, Some(generator)) => generator.validate(),
            (TerrainType::Plane, None) => Ok(()),
        }
    }
}

/// Keyframe an entity is reset to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitialState {
    /// Root position (m).
    pub pos: Vector3<f64>,
    /// Joint positions by joint-name pattern (rad).
    pub joint_pos: ValueMap<f64>,
    /// Joint velocities by joint-name pattern (rad/s).
    pub joint_vel: ValueMap<f64>,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            pos: Vector3::zeros(),
            joint_pos: ValueMap::new().with(".*", 0.0),
            joint_vel: ValueMap::new().with(".*", 0.0),
        }
    }
}

/// An [`InitialState`] resolved against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Root position (m).
    pub pos: Vector3<f64>,
    /// Joint positions, namespace order.
    pub joint_pos: Vec<(EntityHandle, f64)>,
    /// Joint velocities, namespace order.
    pub joint_vel: Vec<(EntityHandle, f64)>,
}

impl InitialState {
    /// Resolve joint values within `entity`.
    ///
    /// Joints matched by no pattern keep the model's own default and are
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// Fails if a non-empty table matches no joint of the entity.
    pub fn resolve(&self, entity: &str, namespace: &ModelNamespace) -> Result<Keyframe> {
        Ok(Keyframe {
            pos: self.pos,
            joint_pos: resolve_in_entity(&self.joint_pos, ElementKind::Joint, entity, namespace)?,
            joint_vel: resolve_in_entity(&self.joint_vel, ElementKind::Joint, entity, namespace)?,
        })
    }
}

fn resolve_in_entity<T: Clone>(
    map: &ValueMap<T>,
    kind: ElementKind,
    entity: &str,
    namespace: &ModelNamespace,
) -> Result<Vec<(EntityHandle, T)>> {
    let mut options = ResolveOptions::required().in_entity(entity);
    options.allow_empty = map.is_empty();
    map.resolve_with(kind, namespace, &options)
}

/// Collision properties applied to a set of geoms.
///
/// Per-geom properties are pattern tables; the first matching pattern
/// gives a geom its value. Geoms outside `geom_names` are left alone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionCfg {
    /// Geoms this preset applies to.
    pub geom_names: NamePattern,
    /// Contact type bitmask.
    pub contype: Option<u32>,
    /// Contact affinity bitmask.
    pub conaffinity: Option<u32>,
    /// Contact dimensionality.
    pub condim: ValueMap<u32>,
    /// Contact priority.
    pub priority: ValueMap<i32>,
    /// Friction coefficients.
    pub friction: ValueMap<Vec<f64>>,
}

impl CollisionCfg {
    /// Preset touching only `geom_names`, with no property overrides.
    #[must_use]
    pub fn new(geom_names: impl Into<NamePattern>) -> Self {
        Self {
            geom_names: geom_names.into(),
            contype: None,
            conaffinity: None,
            condim: ValueMap::new(),
            priority: ValueMap::new(),
            friction: ValueMap::new(),
        }
    }

    /// Set the contact bitmasks.
    #[must_use]
    pub fn with_masks(mut self, contype: u32, conaffinity: u32) -> Self {
        self.contype = Some(contype);
        self.conaffinity = Some(conaffinity);
        self
    }

    /// Set contact dimensionality.
    #[must_use]
    pub fn with_condim(mut self, condim: ValueMap<u32>) -> Self {
        self.condim = condim;
        self
    }

    /// Set contact priority.
    #[must_use]
    pub fn with_priority(mut self, priority: ValueMap<i32>) -> Self {
        self.priority = priority;
        self
    }

    /// Set friction.
    #[must_use]
    pub fn with_friction(mut self, friction: ValueMap<Vec<f64>>) -> Self {
        self.friction = friction;
        self
    }

    /// Per-geom properties for the selected geoms of `entity`.
    ///
    /// # Errors
    ///
    /// Fails if `geom_names` matches no geom of the entity.
    pub fn resolve(&self, entity: &str, namespace: &ModelNamespace) -> Result<Vec<GeomCollision>> {
        let options = ResolveOptions::required().in_entity(entity);
        let geoms = PatternResolver::new(namespace).resolve_with(
            &self.geom_names,
            ElementKind::Geom,
            Scope::Direct,
            &options,
        )?;

        let condim = per_geom(&self.condim, entity, namespace)?;
        let priority = per_geom(&self.priority, entity, namespace)?;
        let mut friction = per_geom(&self.friction, entity, namespace)?;

        Ok(geoms
            .into_iter()
            .map(|geom| GeomCollision {
                geom,
                contype: self.contype,
                conaffinity: self.conaffinity,
                condim: condim[geom.index()],
                priority: priority[geom.index()],
                friction: friction[geom.index()].take(),
            })
            .collect())
    }
}

fn per_geom<T: Clone>(
    map: &ValueMap<T>,
    entity: &str,
    namespace: &ModelNamespace,
) -> Result<Vec<Option<T>>> {
    let options = ResolveOptions::required().in_entity(entity).allow_empty();
    let mut out = vec![None; namespace.len(ElementKind::Geom)];
    for (geom, value) in map.resolve_with(ElementKind::Geom, namespace, &options)? {
        out[geom.index()] = Some(value);
    }
    Ok(out)
}

/// Collision properties of one geom; `None` keeps the model's value.
#[derive(Debug, Clone, PartialEq)]
pub struct GeomCollision {
    /// The geom.
    pub geom: EntityHandle,
    /// Contact type bitmask.
    pub contype: Option<u32>,
    /// Contact affinity bitmask.
    pub conaffinity: Option<u32>,
    /// Contact dimensionality.
    pub condim: Option<u32>,
    /// Contact priority.
    pub priority: Option<i32>,
    /// Friction coefficients.
    pub friction: Option<Vec<f64>>,
}

/// An articulated entity placed in the scene.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityCfg {
    /// Reset keyframe.
    pub init_state: InitialState,
    /// Collision presets, applied in order.
    pub collisions: Vec<CollisionCfg>,
    /// Actuators.
    pub articulation: Articulation,
}

/// An [`EntityCfg`] resolved against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEntity {
    /// Resolved keyframe.
    pub keyframe: Keyframe,
    /// Collision overrides, in preset order.
    pub collisions: Vec<GeomCollision>,
    /// Actuated joints, namespace order.
    pub actuators: Vec<ActuatedJoint>,
}

impl EntityCfg {
    /// Resolve keyframe, collisions, and actuators.
    ///
    /// # Errors
    ///
    /// Fails on any resolution or validation failure.
    pub fn bind(&self, name: &str, namespace: &ModelNamespace) -> Result<BoundEntity> {
        let keyframe = self.init_state.resolve(name, namespace)?;
        let mut collisions = Vec::new();
        for preset in &self.collisions {
            collisions.extend(preset.resolve(name, namespace)?);
        }
        let actuators = self.articulation.bind_in_entity(namespace, name)?;
        debug!(
            entity = name,
            joints = keyframe.joint_pos.len(),
            geoms = collisions.len(),
            actuators = actuators.len(),
            "bound entity"
        );
        Ok(BoundEntity {
            keyframe,
            collisions,
            actuators,
        })
    }
}

/// Camera placement for interactive playback.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewerCfg {
    /// Body the camera tracks.
    pub body_name: Option<String>,
    /// Distance from the tracked body (m).
    pub distance: f64,
    /// Elevation angle (deg).
    pub elevation: f64,
    /// Azimuth angle (deg).
    pub azimuth: f64,
}

impl Default for ViewerCfg {
    fn default() -> Self {
        Self {
            body_name: None,
            distance: 3.0,
            elevation: -5.0,
            azimuth: 90.0,
        }
    }
}

/// Everything placed in the world.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneCfg {
    /// Parallel environment instances.
    pub num_envs: usize,
    /// Distance between instances on flat terrain (m).
    pub env_spacing: f64,
    /// Ground.
    pub terrain: Option<TerrainCfg>,
    /// Entities by name.
    pub entities: IndexMap<String, EntityCfg>,
    /// Contact sensors by name.
    pub sensors: TermMap<ContactSensorConfig>,
}

impl Default for SceneCfg {
    fn default() -> Self {
        Self {
            num_envs: 1,
            env_spacing: 2.5,
            terrain: None,
            entities: IndexMap::new(),
            sensors: TermMap::new(TermKind::Sensor),
        }
    }
}
