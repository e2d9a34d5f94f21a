//! Elemental types and the type-effectiveness chart.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RandomizerError, Result};
use crate::model::Generation;

/// An elemental type.
///
/// The trailing variants only exist in ROM hacks; they are never usable in a
/// retail generation and are ignored by every randomizer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Normal,
    Fighting,
    Flying,
    Grass,
    Water,
    Fire,
    Rock,
    Ground,
    Psychic,
    Bug,
    Dragon,
    Electric,
    Ghost,
    Poison,
    Ice,
    Steel,
    Dark,
    Fairy,
    Gas,
    Wood,
    Abnormal,
    Wind,
    Sound,
    Light,
    Tri,
}

impl Type {
    pub const ALL: [Type; 25] = [
        Type::Normal,
        Type::Fighting,
        Type::Flying,
        Type::Grass,
        Type::Water,
        Type::Fire,
        Type::Rock,
        Type::Ground,
        Type::Psychic,
        Type::Bug,
        Type::Dragon,
        Type::Electric,
        Type::Ghost,
        Type::Poison,
        Type::Ice,
        Type::Steel,
        Type::Dark,
        Type::Fairy,
        Type::Gas,
        Type::Wood,
        Type::Abnormal,
        Type::Wind,
        Type::Sound,
        Type::Light,
        Type::Tri,
    ];

    pub fn is_hack_only(self) -> bool {
        matches!(
            self,
            Type::Gas
                | Type::Wood
                | Type::Abnormal
                | Type::Wind
                | Type::Sound
                | Type::Light
                | Type::Tri
        )
    }

    pub fn is_usable_in(self, gen: Generation) -> bool {
        if self.is_hack_only() {
            return false;
        }
        match self {
            Type::Dark | Type::Steel => gen >= Generation::Gen2,
            Type::Fairy => gen >= Generation::Gen6,
            _ => true,
        }
    }

    /// Types that exist in `gen`, in declaration order.
    pub fn usable(gen: Generation) -> Vec<Type> {
        Type::ALL
            .iter()
            .copied()
            .filter(|ty| ty.is_usable_in(gen))
            .collect()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of one attacking type hitting one defending type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Effectiveness {
    Immune,
    Resistant,
    Neutral,
    Strong,
}

impl Effectiveness {
    /// Damage multiplier in quarters, so dual-type products stay integral.
    pub fn quarters(self) -> u32 {
        match self {
            Effectiveness::Immune => 0,
            Effectiveness::Resistant => 2,
            Effectiveness::Neutral => 4,
            Effectiveness::Strong => 8,
        }
    }
}

/// The type chart of one generation, stored as three adjacency maps keyed by
/// the attacking type.
///
/// Every real type has an entry in each map, so a lookup for any real pair
/// resolves; pairs absent from all three maps are neutral.
#[derive(Clone, Debug)]
pub struct TypeTable {
    generation: Generation,
    strong: BTreeMap<Type, BTreeSet<Type>>,
    resistant: BTreeMap<Type, BTreeSet<Type>>,
    immune: BTreeMap<Type, BTreeSet<Type>>,
}

impl TypeTable {
    pub fn for_generation(gen: Generation) -> Self {
        let mut table = Self {
            generation: gen,
            strong: BTreeMap::new(),
            resistant: BTreeMap::new(),
            immune: BTreeMap::new(),
        };
        for ty in Type::ALL {
            table.strong.insert(ty, BTreeSet::new());
            table.resistant.insert(ty, BTreeSet::new());
            table.immune.insert(ty, BTreeSet::new());
        }
        for (attacker, strong, resistant, immune) in MODERN_CHART {
            for &def in *strong {
                table.set(*attacker, def, Effectiveness::Strong);
            }
            for &def in *resistant {
                table.set(*attacker, def, Effectiveness::Resistant);
            }
            for &def in *immune {
                table.set(*attacker, def, Effectiveness::Immune);
            }
        }

        if gen == Generation::Gen1 {
            table.set(Type::Bug, Type::Poison, Effectiveness::Strong);
            table.set(Type::Poison, Type::Bug, Effectiveness::Strong);
            table.set(Type::Ghost, Type::Psychic, Effectiveness::Immune);
            table.set(Type::Ice, Type::Fire, Effectiveness::Neutral);
        }
        if gen <= Generation::Gen5 {
            table.set(Type::Ghost, Type::Steel, Effectiveness::Resistant);
            table.set(Type::Dark, Type::Steel, Effectiveness::Resistant);
        }

        // Drop rows and columns for types the generation does not have.
        for ty in Type::ALL {
            if !ty.is_usable_in(gen) {
                for map in [&mut table.strong, &mut table.resistant, &mut table.immune] {
                    map.insert(ty, BTreeSet::new());
                    for defenders in map.values_mut() {
                        defenders.remove(&ty);
                    }
                }
            }
        }
        table
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Overrides a single chart entry. Only meant for generation-specific
    /// adjustments made once before any randomizer runs.
    pub fn set(&mut self, attacker: Type, defender: Type, effectiveness: Effectiveness) {
        for map in [&mut self.strong, &mut self.resistant, &mut self.immune] {
            map.entry(attacker).or_default().remove(&defender);
        }
        let target = match effectiveness {
            Effectiveness::Strong => &mut self.strong,
            Effectiveness::Resistant => &mut self.resistant,
            Effectiveness::Immune => &mut self.immune,
            Effectiveness::Neutral => return,
        };
        target.entry(attacker).or_default().insert(defender);
    }

    pub fn effectiveness(&self, attacker: Type, defender: Type) -> Effectiveness {
        if contains(&self.immune, attacker, defender) {
            Effectiveness::Immune
        } else if contains(&self.resistant, attacker, defender) {
            Effectiveness::Resistant
        } else if contains(&self.strong, attacker, defender) {
            Effectiveness::Strong
        } else {
            Effectiveness::Neutral
        }
    }

    pub fn strong_against(&self, attacker: Type) -> &BTreeSet<Type> {
        &self.strong[&attacker]
    }

    pub fn resisted_by(&self, attacker: Type) -> &BTreeSet<Type> {
        &self.resistant[&attacker]
    }

    pub fn immune(&self, attacker: Type) -> &BTreeSet<Type> {
        &self.immune[&attacker]
    }

    pub fn resisted_or_immune(&self, attacker: Type) -> BTreeSet<Type> {
        self.resisted_by(attacker)
            .union(self.immune(attacker))
            .copied()
            .collect()
    }

    /// Combined multiplier (in quarters per defending type) of `attacker`
    /// against a one- or two-type defender.
    fn multiplier(&self, attacker: Type, defenders: &[Type]) -> u32 {
        defenders
            .iter()
            .map(|&def| self.effectiveness(attacker, def).quarters())
            .product()
    }

    /// Attacking types that hit the given defender types super effectively.
    pub fn weaknesses(&self, defenders: &[Type]) -> Result<Vec<Type>> {
        if defenders.is_empty() {
            return Err(RandomizerError::InvalidInput(
                "weakness lookup needs at least one defending type".into(),
            ));
        }
        let neutral = 4u32.pow(defenders.len() as u32);
        Ok(Type::usable(self.generation)
            .into_iter()
            .filter(|&att| self.multiplier(att, defenders) > neutral)
            .collect())
    }

    /// Defending types that at least one of `attackers` hits super effectively.
    pub fn strengths(&self, attackers: &[Type]) -> Result<Vec<Type>> {
        if attackers.is_empty() {
            return Err(RandomizerError::InvalidInput(
                "strength lookup needs at least one attacking type".into(),
            ));
        }
        Ok(Type::usable(self.generation)
            .into_iter()
            .filter(|&def| {
                attackers
                    .iter()
                    .any(|&att| self.effectiveness(att, def) == Effectiveness::Strong)
            })
            .collect())
    }
}

fn contains(map: &BTreeMap<Type, BTreeSet<Type>>, attacker: Type, defender: Type) -> bool {
    map.get(&attacker)
        .map(|set| set.contains(&defender))
        .unwrap_or(false)
}

type ChartRow = (Type, &'static [Type], &'static [Type], &'static [Type]);

// attacker, strong against, resisted by, no effect on
const MODERN_CHART: &[ChartRow] = &[
    (Type::Normal, &[], &[Type::Rock, Type::Steel], &[Type::Ghost]),
    (
        Type::Fighting,
        &[Type::Normal, Type::Rock, Type::Steel, Type::Ice, Type::Dark],
        &[Type::Flying, Type::Poison, Type::Bug, Type::Psychic, Type::Fairy],
        &[Type::Ghost],
    ),
    (
        Type::Flying,
        &[Type::Fighting, Type::Bug, Type::Grass],
        &[Type::Rock, Type::Steel, Type::Electric],
        &[],
    ),
    (
        Type::Poison,
        &[Type::Grass, Type::Fairy],
        &[Type::Poison, Type::Ground, Type::Rock, Type::Ghost],
        &[Type::Steel],
    ),
    (
        Type::Ground,
        &[Type::Poison, Type::Rock, Type::Steel, Type::Fire, Type::Electric],
        &[Type::Bug, Type::Grass],
        &[Type::Flying],
    ),
    (
        Type::Rock,
        &[Type::Flying, Type::Bug, Type::Fire, Type::Ice],
        &[Type::Fighting, Type::Ground, Type::Steel],
        &[],
    ),
    (
        Type::Bug,
        &[Type::Grass, Type::Psychic, Type::Dark],
        &[
            Type::Fighting,
            Type::Flying,
            Type::Poison,
            Type::Ghost,
            Type::Steel,
            Type::Fire,
            Type::Fairy,
        ],
        &[],
    ),
    (
        Type::Ghost,
        &[Type::Ghost, Type::Psychic],
        &[Type::Dark],
        &[Type::Normal],
    ),
    (
        Type::Steel,
        &[Type::Rock, Type::Ice, Type::Fairy],
        &[Type::Steel, Type::Fire, Type::Water, Type::Electric],
        &[],
    ),
    (
        Type::Fire,
        &[Type::Bug, Type::Steel, Type::Grass, Type::Ice],
        &[Type::Rock, Type::Fire, Type::Water, Type::Dragon],
        &[],
    ),
    (
        Type::Water,
        &[Type::Ground, Type::Rock, Type::Fire],
        &[Type::Water, Type::Grass, Type::Dragon],
        &[],
    ),
    (
        Type::Grass,
        &[Type::Ground, Type::Rock, Type::Water],
        &[
            Type::Flying,
            Type::Poison,
            Type::Bug,
            Type::Steel,
            Type::Fire,
            Type::Grass,
            Type::Dragon,
        ],
        &[],
    ),
    (
        Type::Electric,
        &[Type::Flying, Type::Water],
        &[Type::Grass, Type::Electric, Type::Dragon],
        &[Type::Ground],
    ),
    (
        Type::Psychic,
        &[Type::Fighting, Type::Poison],
        &[Type::Steel, Type::Psychic],
        &[Type::Dark],
    ),
    (
        Type::Ice,
        &[Type::Flying, Type::Ground, Type::Grass, Type::Dragon],
        &[Type::Steel, Type::Fire, Type::Water, Type::Ice],
        &[],
    ),
    (Type::Dragon, &[Type::Dragon], &[Type::Steel], &[Type::Fairy]),
    (
        Type::Dark,
        &[Type::Ghost, Type::Psychic],
        &[Type::Fighting, Type::Dark, Type::Fairy],
        &[],
    ),
    (
        Type::Fairy,
        &[Type::Fighting, Type::Dragon, Type::Dark],
        &[Type::Poison, Type::Steel, Type::Fire],
        &[],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_real_pair_resolves() {
        let table = TypeTable::for_generation(Generation::Gen6);
        let usable = Type::usable(Generation::Gen6);
        assert_eq!(usable.len(), 18);
        for &att in &usable {
            for &def in &usable {
                let _ = table.effectiveness(att, def);
            }
        }
        assert_eq!(
            table.effectiveness(Type::Water, Type::Fire),
            Effectiveness::Strong
        );
        assert_eq!(
            table.effectiveness(Type::Normal, Type::Ghost),
            Effectiveness::Immune
        );
        assert_eq!(
            table.effectiveness(Type::Fire, Type::Water),
            Effectiveness::Resistant
        );
    }

    #[test]
    fn older_generations_apply_overrides() {
        let gen1 = TypeTable::for_generation(Generation::Gen1);
        assert_eq!(
            gen1.effectiveness(Type::Ghost, Type::Psychic),
            Effectiveness::Immune
        );
        assert_eq!(
            gen1.effectiveness(Type::Bug, Type::Poison),
            Effectiveness::Strong
        );
        assert_eq!(gen1.effectiveness(Type::Ice, Type::Fire), Effectiveness::Neutral);
        assert!(gen1.strong_against(Type::Fighting).contains(&Type::Normal));
        assert!(!gen1.strong_against(Type::Fighting).contains(&Type::Dark));

        let gen4 = TypeTable::for_generation(Generation::Gen4);
        assert_eq!(
            gen4.effectiveness(Type::Dark, Type::Steel),
            Effectiveness::Resistant
        );
        assert!(!Type::usable(Generation::Gen4).contains(&Type::Fairy));
    }

    #[test]
    fn weaknesses_combine_dual_types() {
        let table = TypeTable::for_generation(Generation::Gen6);
        let weak = table.weaknesses(&[Type::Water, Type::Ground]).unwrap();
        assert_eq!(weak, vec![Type::Grass]);
        assert!(table.resisted_or_immune(Type::Normal).contains(&Type::Ghost));
        assert!(table.resisted_or_immune(Type::Normal).contains(&Type::Rock));
    }

    #[test]
    fn empty_type_queries_are_rejected() {
        let table = TypeTable::for_generation(Generation::Gen3);
        assert!(matches!(
            table.weaknesses(&[]),
            Err(RandomizerError::InvalidInput(_))
        ));
        assert!(table.strengths(&[]).is_err());
    }
}
