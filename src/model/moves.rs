use serde::{Deserialize, Serialize};

use crate::model::Type;

/// Move id of Struggle, which every randomizer leaves alone.
pub const STRUGGLE: u16 = 165;
pub const METRONOME: u16 = 118;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Move {
    pub id: u16,
    pub name: String,
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u8,
    pub pp: u8,
    /// Hit chance in percent; 0 means the move never misses.
    #[serde(default)]
    pub accuracy: u8,
    #[serde(default = "default_hit_count")]
    pub hit_count: u8,
}

fn default_hit_count() -> u8 {
    1
}

impl Move {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power > 0
    }

    /// Moves with power 1 deal fixed or formula damage (Seismic Toss, Low Kick).
    pub fn has_fixed_damage(&self) -> bool {
        self.power == 1
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearntMove {
    pub move_id: u16,
    pub level: u8,
}

impl LearntMove {
    pub fn new(move_id: u16, level: u8) -> Self {
        Self { move_id, level }
    }

    pub fn is_starting_move(&self) -> bool {
        self.level <= 1
    }
}
