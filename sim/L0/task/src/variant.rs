//! Named sets of structural edits applied to a base configuration.

use sim_types::ConfigError;
use tracing::debug;

use crate::config::TaskConfigBuilder;
use crate::scene::{TerrainCfg, TerrainType};
use crate::terms::{Term, TermKind};

/// Episode length used for interactive playback (s).
pub const PLAY_EPISODE_LENGTH_S: f64 = 1e9;

/// Edit to the scene terrain.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainEdit {
    /// Replace the terrain with a flat plane.
    Flat,
    /// Turn the generator curriculum on or off.
    Curriculum(bool),
    /// Resize the generator grid.
    Grid {
        /// Difficulty levels.
        num_rows: usize,
        /// Patches per level.
        num_cols: usize,
        /// Flat margin (m).
        border_width: f64,
    },
}

/// One structural edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEdit {
    /// Add a fragment; its name must be free.
    Insert {
        /// Fragment name.
        name: String,
        /// The fragment.
        term: Term,
    },
    /// Swap a fragment wholesale; its name must exist.
    Replace {
        /// Fragment name.
        name: String,
        /// The replacement.
        term: Term,
    },
    /// Delete a fragment; its name must exist.
    Remove {
        /// Fragment kind.
        kind: TermKind,
        /// Fragment name.
        name: String,
    },
    /// Set the episode length (s).
    EpisodeLength(f64),
    /// Enable or disable noise on an observation group.
    SetCorruption {
        /// Observation group name.
        group: String,
        /// Apply noise.
        enabled: bool,
    },
    /// Edit the terrain.
    Terrain(TerrainEdit),
}

impl ConfigEdit {
    /// Apply to a staging configuration.
    ///
    /// Generator edits on a terrain without a generator leave it unchanged;
    /// every other edit fails rather than silently doing nothing.
    ///
    /// # Errors
    ///
    /// Fails on an absent or duplicate term, an unknown observation group,
    /// or a terrain edit on a scene without terrain.
    pub fn apply_to(&self, builder: &mut TaskConfigBuilder) -> Result<(), ConfigError> {
        match self {
            Self::Insert { name, term } => builder.insert(name.clone(), term.clone()),
            Self::Replace { name, term } => builder.replace(name, term.clone()),
            Self::Remove { kind, name } => builder.remove(*kind, name),
            Self::EpisodeLength(seconds) => {
                builder.episode_length_s = *seconds;
                Ok(())
            }
            Self::SetCorruption { group, enabled } => {
                builder.observations.edit(group, |g| {
                    g.enable_corruption = *enabled;
                    Ok(())
                })
            }
            Self::Terrain(edit) => {
                let terrain = builder
                    .scene
                    .terrain
                    .as_mut()
                    .ok_or_else(|| ConfigError::invalid_edit("scene has no terrain"))?;
                apply_terrain_edit(terrain, edit);
                Ok(())
            }
        }
    }
}

fn apply_terrain_edit(terrain: &mut TerrainCfg, edit: &TerrainEdit) {
    match edit {
        TerrainEdit::Flat => {
            terrain.terrain_type = TerrainType::Plane;
            terrain.generator = None;
        }
        TerrainEdit::Curriculum(on) => {
            if let Some(generator) = &mut terrain.generator {
                generator.curriculum = *on;
            }
        }
        TerrainEdit::Grid {
            num_rows,
            num_cols,
            border_width,
        } => {
            if let Some(generator) = &mut terrain.generator {
                generator.num_rows = *num_rows;
                generator.num_cols = *num_cols;
                generator.border_width = *border_width;
            }
        }
    }
}

/// An ordered list of edits with a name.
///
/// # Example
///
/// ```
/// use sim_task::{ConfigEdit, TaskVariant, TermKind};
///
/// let eval = TaskVariant::new("eval")
///     .with(ConfigEdit::EpisodeLength(60.0))
///     .with(ConfigEdit::Remove { kind: TermKind::Event, name: "push_robot".into() });
/// assert_eq!(eval.edits().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TaskVariant {
    name: String,
    edits: Vec<ConfigEdit>,
}

impl TaskVariant {
    /// Variant with no edits.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edits: Vec::new(),
        }
    }

    /// Append an edit.
    #[must_use]
    pub fn with(mut self, edit: ConfigEdit) -> Self {
        self.edits.push(edit);
        self
    }

    /// Append all edits of another variant.
    #[must_use]
    pub fn then(mut self, other: &Self) -> Self {
        self.edits.extend(other.edits.iter().cloned());
        self
    }

    /// Variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Edits in application order.
    #[must_use]
    pub fn edits(&self) -> &[ConfigEdit] {
        &self.edits
    }

    /// Apply every edit in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing edit; `builder` may be partially edited.
    pub fn apply_to(&self, builder: &mut TaskConfigBuilder) -> Result<(), ConfigError> {
        for edit in &self.edits {
            edit.apply_to(builder)?;
        }
        debug!(variant = %self.name, edits = self.edits.len(), "applied task variant");
        Ok(())
    }
}

/// Evaluation playback: effectively endless episodes, clean observations,
/// no pushes, and a small fixed terrain grid without curriculum.
#[must_use]
pub fn play_variant() -> TaskVariant {
    TaskVariant::new("play")
        .with(ConfigEdit::EpisodeLength(PLAY_EPISODE_LENGTH_S))
        .with(ConfigEdit::SetCorruption {
            group: "policy".to_owned(),
            enabled: false,
        })
        .with(ConfigEdit::Remove {
            kind: TermKind::Event,
            name: "push_robot".to_owned(),
        })
        .with(ConfigEdit::Terrain(TerrainEdit::Curriculum(false)))
        .with(ConfigEdit::Terrain(TerrainEdit::Grid {
            num_rows: 5,
            num_cols: 5,
            border_width: 10.0,
        }))
}

/// Flat ground: plane terrain and no terrain curriculum.
#[must_use]
pub fn flat_variant() -> TaskVariant {
    TaskVariant::new("flat")
        .with(ConfigEdit::Terrain(TerrainEdit::Flat))
        .with(ConfigEdit::Remove {
            kind: TermKind::Curriculum,
            name: "terrain_levels".to_owned(),
        })
}
