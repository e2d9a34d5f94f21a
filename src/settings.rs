//! Run settings: one section per randomizer plus logging.
//!
//! Every field has a default, so an empty document is a valid settings file
//! that leaves the dataset untouched.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub species: SpeciesSettings,
    #[serde(default)]
    pub evolutions: EvolutionSettings,
    #[serde(default)]
    pub starters: StarterSettings,
    #[serde(default)]
    pub trainers: TrainerSettings,
    #[serde(default)]
    pub encounters: EncounterSettings,
    #[serde(default)]
    pub moves: MoveSettings,
    #[serde(default)]
    pub movesets: MovesetSettings,
    #[serde(default)]
    pub compatibility: CompatibilitySettings,
    #[serde(default)]
    pub statics: StaticSettings,
    #[serde(default)]
    pub trades: TradeSettings,
    #[serde(default)]
    pub items: ItemSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsMode {
    #[default]
    Unchanged,
    Shuffle,
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypesMode {
    #[default]
    Unchanged,
    FollowEvolutions,
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilitiesMode {
    #[default]
    Unchanged,
    Random,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesSettings {
    pub stats: StatsMode,
    pub types: TypesMode,
    pub abilities: AbilitiesMode,
    pub abilities_follow_evolutions: bool,
    pub banned_abilities: Vec<u16>,
    pub allow_alternate_formes: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionMode {
    #[default]
    Unchanged,
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSettings {
    #[serde(default)]
    pub mode: EvolutionMode,
    #[serde(default)]
    pub similar_strength: bool,
    #[serde(default)]
    pub same_typing: bool,
    /// Longest chain of pre-evolutions any species may end up with.
    #[serde(default = "default_max_pre_evolutions")]
    pub max_pre_evolutions: usize,
    #[serde(default)]
    pub force_change: bool,
    #[serde(default)]
    pub same_stage: bool,
    #[serde(default)]
    pub no_power_decrease: bool,
    #[serde(default)]
    pub change_methods: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_pre_evolutions() -> usize {
    2
}

fn default_max_attempts() -> u32 {
    1000
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            mode: EvolutionMode::Unchanged,
            similar_strength: false,
            same_typing: false,
            max_pre_evolutions: default_max_pre_evolutions(),
            force_change: false,
            same_stage: false,
            no_power_decrease: false,
            change_methods: false,
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarterMode {
    #[default]
    Unchanged,
    Random,
    BasicThreeStage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarterSettings {
    pub mode: StarterMode,
    pub no_legendaries: bool,
    /// Starters whose base stat total exceeds this are never offered.
    pub max_bst: Option<u32>,
    /// Only offer species that evolve into a single species.
    pub no_split_evolutions: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainerMode {
    #[default]
    Unchanged,
    Random,
    TypeThemed,
    TypeThemedElite,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub mode: TrainerMode,
    pub similar_strength: bool,
    pub global_swap: bool,
    pub weight_types_by_frequency: bool,
    pub rival_carries_starter: bool,
    pub rival_carries_team: bool,
    pub no_legendaries: bool,
    /// Party members at or above this level are evolved to a final form.
    pub force_fully_evolved_at: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterMode {
    #[default]
    Unchanged,
    Random,
    CatchEmAll,
    TypeThemed,
    SimilarStrength,
    AreaMapping,
    GlobalMapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSettings {
    #[serde(default)]
    pub mode: EncounterMode,
    #[serde(default)]
    pub no_legendaries: bool,
    #[serde(default = "default_level_modifier")]
    pub level_modifier_percent: u16,
}

fn default_level_modifier() -> u16 {
    100
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            mode: EncounterMode::Unchanged,
            no_legendaries: false,
            level_modifier_percent: default_level_modifier(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSettings {
    pub power: bool,
    pub pp: bool,
    pub accuracy: bool,
    pub types: bool,
    pub categories: bool,
}

impl MoveSettings {
    pub fn any(&self) -> bool {
        self.power || self.pp || self.accuracy || self.types || self.categories
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovesetMode {
    #[default]
    Unchanged,
    Random,
    MetronomeOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovesetSettings {
    pub mode: MovesetMode,
    pub prefer_same_type: bool,
    /// Minimum number of moves known at level 1.
    pub guaranteed_level1_moves: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityMode {
    #[default]
    Unchanged,
    Random,
    PreferSameType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilitySettings {
    pub tm: CompatibilityMode,
    pub tutor: CompatibilityMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticMode {
    #[default]
    Unchanged,
    SwapLegendaries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSettings {
    pub mode: StaticMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeSettings {
    pub randomize_given: bool,
    pub randomize_requested: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMode {
    #[default]
    Unchanged,
    Shuffle,
    Random,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSettings {
    pub mode: ItemMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse settings")
    }

    /// Load settings from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// Save settings to a YAML file
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write settings file {}", path.display()))
    }
}
