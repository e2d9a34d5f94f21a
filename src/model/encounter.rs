use serde::{Deserialize, Serialize};

use crate::model::SpeciesId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub species: SpeciesId,
    pub level: u8,
    /// Upper bound of the level range; 0 when the slot has a fixed level.
    #[serde(default)]
    pub max_level: u8,
}

impl Encounter {
    pub fn new(species: SpeciesId, level: u8) -> Self {
        Self {
            species,
            level,
            max_level: 0,
        }
    }

    pub fn top_level(&self) -> u8 {
        self.level.max(self.max_level)
    }
}

/// One wild-encounter table (grass, surfing, fishing rod, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncounterArea {
    pub name: String,
    #[serde(default)]
    pub rate: u8,
    pub encounters: Vec<Encounter>,
}

impl EncounterArea {
    /// Distinct species of the area, in first-seen order.
    pub fn distinct_species(&self) -> Vec<SpeciesId> {
        let mut seen = Vec::new();
        for encounter in &self.encounters {
            if !seen.contains(&encounter.species) {
                seen.push(encounter.species);
            }
        }
        seen
    }
}
