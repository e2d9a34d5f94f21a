use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Evolution, Type};

/// Stable index of a species in the [`Dex`](crate::model::Dex) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

impl SpeciesId {
    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthRate {
    Slow,
    MediumSlow,
    MediumFast,
    Fast,
    Erratic,
    Fluctuating,
}

/// Base stats. Generation 1 data carries a single `special` stat in place of
/// the split special attack/defense pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_atk: u16,
    pub sp_def: u16,
    pub speed: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<u16>,
}

impl Stats {
    pub fn new(hp: u16, attack: u16, defense: u16, sp_atk: u16, sp_def: u16, speed: u16) -> Self {
        Self {
            hp,
            attack,
            defense,
            sp_atk,
            sp_def,
            speed,
            special: None,
        }
    }

    /// The independent stat slots, HP first.
    pub fn slots(&self) -> Vec<u16> {
        match self.special {
            Some(special) => vec![self.hp, self.attack, self.defense, self.speed, special],
            None => vec![
                self.hp,
                self.attack,
                self.defense,
                self.sp_atk,
                self.sp_def,
                self.speed,
            ],
        }
    }

    /// Writes back values in the order produced by [`Stats::slots`].
    pub fn set_slots(&mut self, values: &[u16]) {
        match self.special {
            Some(_) => {
                self.hp = values[0];
                self.attack = values[1];
                self.defense = values[2];
                self.speed = values[3];
                self.special = Some(values[4]);
                self.sp_atk = values[4];
                self.sp_def = values[4];
            }
            None => {
                self.hp = values[0];
                self.attack = values[1];
                self.defense = values[2];
                self.sp_atk = values[3];
                self.sp_def = values[4];
                self.speed = values[5];
            }
        }
    }

    /// Base stat total, the power-level metric used for similar-strength
    /// sampling.
    pub fn total(&self) -> u32 {
        self.slots().iter().map(|&v| v as u32).sum()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub stats: Stats,
    pub primary_type: Type,
    #[serde(default)]
    pub secondary_type: Option<Type>,
    /// Ability ids per slot; 0 marks an empty slot.
    #[serde(default)]
    pub abilities: [u16; 3],
    #[serde(default)]
    pub catch_rate: u8,
    pub growth_rate: GrowthRate,
    #[serde(default)]
    pub legendary: bool,
    /// Base species when this entry is an alternate forme.
    #[serde(default)]
    pub forme_of: Option<SpeciesId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evolutions_from: Vec<Evolution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evolutions_to: Vec<Evolution>,
    #[serde(skip)]
    pub(crate) processed: bool,
}

impl Species {
    pub fn new(
        id: SpeciesId,
        name: impl Into<String>,
        primary_type: Type,
        secondary_type: Option<Type>,
        stats: Stats,
        growth_rate: GrowthRate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            stats,
            primary_type,
            secondary_type,
            abilities: [0; 3],
            catch_rate: 45,
            growth_rate,
            legendary: false,
            forme_of: None,
            evolutions_from: Vec::new(),
            evolutions_to: Vec::new(),
            processed: false,
        }
    }

    pub fn types(&self) -> (Type, Option<Type>) {
        (self.primary_type, self.secondary_type)
    }

    pub fn has_type(&self, ty: Type) -> bool {
        self.primary_type == ty || self.secondary_type == Some(ty)
    }

    pub fn shares_type_with(&self, other: &Species) -> bool {
        self.has_type(other.primary_type)
            || other.secondary_type.map_or(false, |ty| self.has_type(ty))
    }

    /// Sets both types, collapsing a secondary equal to the primary.
    pub fn set_types(&mut self, primary: Type, secondary: Option<Type>) {
        self.primary_type = primary;
        self.secondary_type = secondary.filter(|&ty| ty != primary);
    }

    pub fn bst(&self) -> u32 {
        self.stats.total()
    }

    pub fn is_forme(&self) -> bool {
        self.forme_of.is_some()
    }

    pub fn ability_count(&self) -> usize {
        self.abilities.iter().filter(|&&a| a != 0).count()
    }
}
