//! Term fragments.
//!
//! Every term names the function that implements it (an identifier the
//! runtime looks up) and carries typed [`Params`]. Term functions
//! themselves live outside this crate.

use sim_pattern::ValueMap;
use sim_sensor::ContactSensorConfig;

use crate::params::{AssetSelector, Params};
use crate::term_map::TermMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of a term mapping in a task configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TermKind {
    /// Policy outputs to actuator targets.
    Action,
    /// Sampled goals.
    Command,
    /// Observation groups.
    Observation,
    /// Weighted reward terms.
    Reward,
    /// Episode termination conditions.
    Termination,
    /// Randomization and reset events.
    Event,
    /// Difficulty schedules.
    Curriculum,
    /// Scene contact sensors.
    Sensor,
}

impl TermKind {
    /// Lowercase name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Command => "command",
            Self::Observation => "observation",
            Self::Reward => "reward",
            Self::Termination => "termination",
            Self::Event => "event",
            Self::Curriculum => "curriculum",
            Self::Sensor => "sensor",
        }
    }
}

impl std::fmt::Display for TermKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scale applied to raw policy actions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionScale {
    /// Same scale for every joint.
    Uniform(f64),
    /// Per-joint scale keyed by joint-name pattern.
    PerJoint(ValueMap<f64>),
}

/// Action term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionTermCfg {
    /// Action function identifier.
    pub func: String,
    /// Driven joints.
    pub asset: AssetSelector,
    /// Output scale.
    pub scale: ActionScale,
    /// Offset actions by the keyframe joint positions.
    pub use_default_offset: bool,
}

impl ActionTermCfg {
    /// Joint position targets for every joint of `entity`.
    #[must_use]
    pub fn joint_position(entity: impl Into<String>, scale: f64) -> Self {
        Self {
            func: "joint_position".to_owned(),
            asset: AssetSelector::new(entity).with_joints(".*"),
            scale: ActionScale::Uniform(scale),
            use_default_offset: true,
        }
    }
}

/// Command term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandTermCfg {
    /// Command generator identifier.
    pub func: String,
    /// Seconds between resamples, `(min, max)`.
    pub resampling_time_range: (f64, f64),
    /// Generator parameters.
    pub params: Params,
}

/// One observation term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationTermCfg {
    /// Observation function identifier.
    pub func: String,
    /// Function parameters.
    pub params: Params,
    /// Uniform additive noise `(low, high)` applied when corruption is on.
    pub noise: Option<(f64, f64)>,
}

impl ObservationTermCfg {
    /// Term without noise or parameters.
    #[must_use]
    pub fn new(func: impl Into<String>) -> Self {
        Self {
            func: func.into(),
            params: Params::new(),
            noise: None,
        }
    }

    /// Add uniform noise.
    #[must_use]
    pub fn with_noise(mut self, low: f64, high: f64) -> Self {
        self.noise = Some((low, high));
        self
    }

    /// Set the parameters.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// Group of observation terms fed to one network.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationGroupCfg {
    /// Terms in concatenation order.
    pub terms: TermMap<ObservationTermCfg>,
    /// Apply term noise.
    pub enable_corruption: bool,
    /// Concatenate terms into one vector.
    pub concatenate_terms: bool,
}

impl ObservationGroupCfg {
    /// Concatenated group from `terms`.
    #[must_use]
    pub fn new(terms: TermMap<ObservationTermCfg>, enable_corruption: bool) -> Self {
        Self {
            terms,
            enable_corruption,
            concatenate_terms: true,
        }
    }
}

/// Weighted reward term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardTermCfg {
    /// Reward function identifier.
    pub func: String,
    /// Weight; negative for penalties.
    pub weight: f64,
    /// Function parameters.
    pub params: Params,
}

impl RewardTermCfg {
    /// Create a reward term.
    #[must_use]
    pub fn new(func: impl Into<String>, weight: f64, params: Params) -> Self {
        Self {
            func: func.into(),
            weight,
            params,
        }
    }
}

/// Termination condition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerminationTermCfg {
    /// Condition function identifier.
    pub func: String,
    /// Function parameters.
    pub params: Params,
    /// A time-out rather than a failure.
    pub time_out: bool,
}

impl TerminationTermCfg {
    /// Failure condition.
    #[must_use]
    pub fn new(func: impl Into<String>, params: Params) -> Self {
        Self {
            func: func.into(),
            params,
            time_out: false,
        }
    }
}

/// When an event fires.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventMode {
    /// Once, when the environment is created.
    Startup,
    /// On every episode reset.
    Reset,
    /// Periodically, every `(min, max)` seconds.
    Interval(f64, f64),
}

/// Randomization or reset event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventTermCfg {
    /// Event function identifier.
    pub func: String,
    /// Firing schedule.
    pub mode: EventMode,
    /// Function parameters.
    pub params: Params,
}

impl EventTermCfg {
    /// Create an event term.
    #[must_use]
    pub fn new(func: impl Into<String>, mode: EventMode, params: Params) -> Self {
        Self {
            func: func.into(),
            mode,
            params,
        }
    }
}

/// Curriculum term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurriculumTermCfg {
    /// Curriculum function identifier.
    pub func: String,
    /// Function parameters.
    pub params: Params,
}

/// A term fragment of any kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Term {
    /// Action term.
    Action(ActionTermCfg),
    /// Command term.
    Command(CommandTermCfg),
    /// Observation group.
    Observation(ObservationGroupCfg),
    /// Reward term.
    Reward(RewardTermCfg),
    /// Termination term.
    Termination(TerminationTermCfg),
    /// Event term.
    Event(EventTermCfg),
    /// Curriculum term.
    Curriculum(CurriculumTermCfg),
    /// Contact sensor.
    Sensor(ContactSensorConfig),
}

impl Term {
    /// Kind of mapping this fragment belongs to.
    #[must_use]
    pub fn kind(&self) -> TermKind {
        match self {
            Self::Action(_) => TermKind::Action,
            Self::Command(_) => TermKind::Command,
            Self::Observation(_) => TermKind::Observation,
            Self::Reward(_) => TermKind::Reward,
            Self::Termination(_) => TermKind::Termination,
            Self::Event(_) => TermKind::Event,
            Self::Curriculum(_) => TermKind::Curriculum,
            Self::Sensor(_) => TermKind::Sensor,
        }
    }
}
