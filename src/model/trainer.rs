use serde::{Deserialize, Serialize};

use crate::model::SpeciesId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerPokemon {
    pub species: SpeciesId,
    pub level: u8,
    #[serde(default)]
    pub held_item: u16,
}

impl TrainerPokemon {
    pub fn new(species: SpeciesId, level: u8) -> Self {
        Self {
            species,
            level,
            held_item: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trainer {
    pub index: usize,
    pub name: String,
    /// Grouping tag such as `GYM1-LEADER`, `ELITE2` or `RIVAL3-0`.
    #[serde(default)]
    pub tag: Option<String>,
    pub pokemon: Vec<TrainerPokemon>,
}

impl Trainer {
    pub fn parsed_tag(&self) -> Option<TrainerTag> {
        self.tag.as_deref().map(TrainerTag::parse)
    }

    /// Position of the party member treated as the trainer's ace: highest
    /// level, last one on ties.
    pub fn ace_slot(&self) -> Option<usize> {
        self.pokemon
            .iter()
            .enumerate()
            .max_by_key(|(slot, member)| (member.level, *slot))
            .map(|(slot, _)| slot)
    }

    pub fn max_level(&self) -> u8 {
        self.pokemon.iter().map(|p| p.level).max().unwrap_or(0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrainerCategory {
    Gym,
    Elite,
    Champion,
    Uber,
    Themed,
    Rival,
    Friend,
    Other,
}

/// Bookkeeping pool inside which themed types must not repeat.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UniquenessPool {
    Gym,
    Elite,
}

impl TrainerCategory {
    pub fn uniqueness_pool(self) -> Option<UniquenessPool> {
        match self {
            TrainerCategory::Gym => Some(UniquenessPool::Gym),
            TrainerCategory::Elite | TrainerCategory::Champion | TrainerCategory::Uber => {
                Some(UniquenessPool::Elite)
            }
            _ => None,
        }
    }

    pub fn is_themed_group(self) -> bool {
        matches!(
            self,
            TrainerCategory::Gym
                | TrainerCategory::Elite
                | TrainerCategory::Champion
                | TrainerCategory::Uber
                | TrainerCategory::Themed
        )
    }
}

/// A trainer tag split into its parts. `GYM1-LEADER` belongs to group `GYM1`
/// of category [`TrainerCategory::Gym`]; `RIVAL3-1` is battle 3, variant 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainerTag {
    pub group: String,
    pub category: TrainerCategory,
    pub battle: Option<u32>,
    pub variant: Option<u32>,
}

impl TrainerTag {
    pub fn parse(tag: &str) -> Self {
        let (head, tail) = match tag.split_once('-') {
            Some((head, tail)) => (head, Some(tail)),
            None => (tag, None),
        };
        let prefix: String = head
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        let digits: String = head[prefix.len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let category = match prefix.to_ascii_uppercase().as_str() {
            "GYM" => TrainerCategory::Gym,
            "ELITE" => TrainerCategory::Elite,
            "CHAMPION" => TrainerCategory::Champion,
            "UBER" => TrainerCategory::Uber,
            "THEMED" => TrainerCategory::Themed,
            "RIVAL" => TrainerCategory::Rival,
            "FRIEND" => TrainerCategory::Friend,
            _ => TrainerCategory::Other,
        };
        Self {
            group: head.to_string(),
            category,
            battle: digits.parse().ok(),
            variant: tail.and_then(|t| t.parse().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_prefixes() {
        let tag = TrainerTag::parse("GYM1-LEADER");
        assert_eq!(tag.group, "GYM1");
        assert_eq!(tag.category, TrainerCategory::Gym);
        assert_eq!(tag.battle, Some(1));
        assert_eq!(tag.variant, None);

        let rival = TrainerTag::parse("RIVAL3-2");
        assert_eq!(rival.category, TrainerCategory::Rival);
        assert_eq!((rival.battle, rival.variant), (Some(3), Some(2)));

        let themed = TrainerTag::parse("THEMED:ARIANA");
        assert_eq!(themed.category, TrainerCategory::Themed);
        assert_eq!(themed.group, "THEMED:ARIANA");

        assert_eq!(
            TrainerTag::parse("CHAMPION").category.uniqueness_pool(),
            Some(UniquenessPool::Elite)
        );
        assert_eq!(TrainerTag::parse("NOTSTRONG").category, TrainerCategory::Other);
    }

    #[test]
    fn ace_is_highest_level_last_on_ties() {
        let trainer = Trainer {
            index: 0,
            name: "Blue".into(),
            tag: None,
            pokemon: vec![
                TrainerPokemon::new(SpeciesId(1), 9),
                TrainerPokemon::new(SpeciesId(2), 9),
                TrainerPokemon::new(SpeciesId(3), 5),
            ],
        };
        assert_eq!(trainer.ace_slot(), Some(1));
        assert_eq!(trainer.max_level(), 9);
    }
}
