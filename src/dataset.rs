//! Data access: the `RomData` trait consumed by the engine and a serde-backed
//! implementation read from and written to JSON or YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{
    EncounterArea, Evolution, FieldItem, Generation, InGameTrade, LearntMove, Move, Species,
    SpeciesId, StaticEncounter, Trainer,
};

/// Feature switches of the game a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub abilities_per_species: u8,
    pub physical_special_split: bool,
    pub move_tutors: bool,
    pub alternate_formes: bool,
}

impl Capabilities {
    pub fn for_generation(gen: Generation) -> Self {
        let number = gen.number();
        Self {
            abilities_per_species: match number {
                1 | 2 => 0,
                3 | 4 => 2,
                _ => 3,
            },
            physical_special_split: number >= 4,
            move_tutors: number >= 3,
            alternate_formes: number >= 4,
        }
    }
}

/// Read and write access to every collection a run touches.
///
/// Species are handed out with their outgoing edges in `evolutions_from`;
/// `evolutions_to` is rebuilt by the [`Dex`](crate::model::Dex).
pub trait RomData {
    fn generation(&self) -> Generation;
    fn capabilities(&self) -> Capabilities;

    fn species(&self) -> Vec<Species>;
    fn set_species(&mut self, species: Vec<Species>);

    /// Ability ids that may be assigned to species.
    fn abilities(&self) -> Vec<u16>;

    fn moves(&self) -> Vec<Move>;
    fn set_moves(&mut self, moves: Vec<Move>);
    fn learnsets(&self) -> BTreeMap<SpeciesId, Vec<LearntMove>>;
    fn set_learnsets(&mut self, learnsets: BTreeMap<SpeciesId, Vec<LearntMove>>);

    fn tm_moves(&self) -> Vec<u16>;
    fn tm_compatibility(&self) -> BTreeMap<SpeciesId, Vec<bool>>;
    fn set_tm_compatibility(&mut self, compatibility: BTreeMap<SpeciesId, Vec<bool>>);
    fn tutor_moves(&self) -> Vec<u16>;
    fn tutor_compatibility(&self) -> BTreeMap<SpeciesId, Vec<bool>>;
    fn set_tutor_compatibility(&mut self, compatibility: BTreeMap<SpeciesId, Vec<bool>>);

    fn starters(&self) -> Vec<SpeciesId>;
    fn set_starters(&mut self, starters: Vec<SpeciesId>);

    fn trainers(&self) -> Vec<Trainer>;
    fn set_trainers(&mut self, trainers: Vec<Trainer>);

    fn encounter_areas(&self) -> Vec<EncounterArea>;
    fn set_encounter_areas(&mut self, areas: Vec<EncounterArea>);

    fn static_encounters(&self) -> Vec<StaticEncounter>;
    fn set_static_encounters(&mut self, statics: Vec<StaticEncounter>);

    fn trades(&self) -> Vec<InGameTrade>;
    fn set_trades(&mut self, trades: Vec<InGameTrade>);

    fn field_items(&self) -> Vec<FieldItem>;
    fn set_field_items(&mut self, items: Vec<FieldItem>);

    /// Items usable as evolution stones.
    fn evolution_items(&self) -> Vec<u16>;
    /// Items that may be placed in the field.
    fn regular_items(&self) -> Vec<u16>;
}

/// A complete game dataset. Evolution edges are stored once, at top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub name: String,
    pub generation: Generation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    pub species: Vec<Species>,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
    #[serde(default)]
    pub abilities: Vec<u16>,
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub learnsets: BTreeMap<SpeciesId, Vec<LearntMove>>,
    #[serde(default)]
    pub tm_moves: Vec<u16>,
    #[serde(default)]
    pub tm_compatibility: BTreeMap<SpeciesId, Vec<bool>>,
    #[serde(default)]
    pub tutor_moves: Vec<u16>,
    #[serde(default)]
    pub tutor_compatibility: BTreeMap<SpeciesId, Vec<bool>>,
    #[serde(default)]
    pub starters: Vec<SpeciesId>,
    #[serde(default)]
    pub trainers: Vec<Trainer>,
    #[serde(default)]
    pub encounter_areas: Vec<EncounterArea>,
    #[serde(default)]
    pub static_encounters: Vec<StaticEncounter>,
    #[serde(default)]
    pub trades: Vec<InGameTrade>,
    #[serde(default)]
    pub field_items: Vec<FieldItem>,
    #[serde(default)]
    pub evolution_items: Vec<u16>,
    #[serde(default)]
    pub regular_items: Vec<u16>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, generation: Generation) -> Self {
        Self {
            name: name.into(),
            generation,
            capabilities: None,
            species: Vec::new(),
            evolutions: Vec::new(),
            abilities: Vec::new(),
            moves: Vec::new(),
            learnsets: BTreeMap::new(),
            tm_moves: Vec::new(),
            tm_compatibility: BTreeMap::new(),
            tutor_moves: Vec::new(),
            tutor_compatibility: BTreeMap::new(),
            starters: Vec::new(),
            trainers: Vec::new(),
            encounter_areas: Vec::new(),
            static_encounters: Vec::new(),
            trades: Vec::new(),
            field_items: Vec::new(),
            evolution_items: Vec::new(),
            regular_items: Vec::new(),
        }
    }
}

impl RomData for Dataset {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
            .unwrap_or_else(|| Capabilities::for_generation(self.generation))
    }

    fn species(&self) -> Vec<Species> {
        let mut species = self.species.clone();
        for entry in &mut species {
            entry.evolutions_to.clear();
            entry.evolutions_from = self
                .evolutions
                .iter()
                .filter(|evo| evo.from == entry.id)
                .copied()
                .collect();
        }
        species
    }

    fn set_species(&mut self, mut species: Vec<Species>) {
        self.evolutions.clear();
        for entry in &mut species {
            self.evolutions.append(&mut entry.evolutions_from);
            entry.evolutions_to.clear();
        }
        self.species = species;
    }

    fn abilities(&self) -> Vec<u16> {
        self.abilities.clone()
    }

    fn moves(&self) -> Vec<Move> {
        self.moves.clone()
    }

    fn set_moves(&mut self, moves: Vec<Move>) {
        self.moves = moves;
    }

    fn learnsets(&self) -> BTreeMap<SpeciesId, Vec<LearntMove>> {
        self.learnsets.clone()
    }

    fn set_learnsets(&mut self, learnsets: BTreeMap<SpeciesId, Vec<LearntMove>>) {
        self.learnsets = learnsets;
    }

    fn tm_moves(&self) -> Vec<u16> {
        self.tm_moves.clone()
    }

    fn tm_compatibility(&self) -> BTreeMap<SpeciesId, Vec<bool>> {
        self.tm_compatibility.clone()
    }

    fn set_tm_compatibility(&mut self, compatibility: BTreeMap<SpeciesId, Vec<bool>>) {
        self.tm_compatibility = compatibility;
    }

    fn tutor_moves(&self) -> Vec<u16> {
        self.tutor_moves.clone()
    }

    fn tutor_compatibility(&self) -> BTreeMap<SpeciesId, Vec<bool>> {
        self.tutor_compatibility.clone()
    }

    fn set_tutor_compatibility(&mut self, compatibility: BTreeMap<SpeciesId, Vec<bool>>) {
        self.tutor_compatibility = compatibility;
    }

    fn starters(&self) -> Vec<SpeciesId> {
        self.starters.clone()
    }

    fn set_starters(&mut self, starters: Vec<SpeciesId>) {
        self.starters = starters;
    }

    fn trainers(&self) -> Vec<Trainer> {
        self.trainers.clone()
    }

    fn set_trainers(&mut self, trainers: Vec<Trainer>) {
        self.trainers = trainers;
    }

    fn encounter_areas(&self) -> Vec<EncounterArea> {
        self.encounter_areas.clone()
    }

    fn set_encounter_areas(&mut self, areas: Vec<EncounterArea>) {
        self.encounter_areas = areas;
    }

    fn static_encounters(&self) -> Vec<StaticEncounter> {
        self.static_encounters.clone()
    }

    fn set_static_encounters(&mut self, statics: Vec<StaticEncounter>) {
        self.static_encounters = statics;
    }

    fn trades(&self) -> Vec<InGameTrade> {
        self.trades.clone()
    }

    fn set_trades(&mut self, trades: Vec<InGameTrade>) {
        self.trades = trades;
    }

    fn field_items(&self) -> Vec<FieldItem> {
        self.field_items.clone()
    }

    fn set_field_items(&mut self, items: Vec<FieldItem>) {
        self.field_items = items;
    }

    fn evolution_items(&self) -> Vec<u16> {
        self.evolution_items.clone()
    }

    fn regular_items(&self) -> Vec<u16> {
        self.regular_items.clone()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub struct DatasetLoader {
    base_dir: PathBuf,
}

impl DatasetLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Reads a dataset; `.yaml`/`.yml` files are parsed as YAML, anything
    /// else as JSON.
    pub fn load(&self, file: impl AsRef<Path>) -> Result<Dataset> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
        let dataset: Dataset = if is_yaml(&path) {
            serde_yaml::from_str(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };
        Ok(dataset)
    }
}

/// Writes the dataset as YAML or pretty-printed JSON, chosen by extension.
pub fn write_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = if is_yaml(path) {
        serde_yaml::to_string(dataset).context("Failed to serialize dataset")?
    } else {
        serde_json::to_string_pretty(dataset).context("Failed to serialize dataset")?
    };
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
