//! Evolution edges and the taxonomy of evolution methods.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Generation, SpeciesId, Type};

/// How one species turns into another.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionType {
    Level,
    Stone,
    Trade,
    TradeItem,
    TradeSpecial,
    Happiness,
    HappinessDay,
    HappinessNight,
    LevelAttackHigher,
    LevelDefenseHigher,
    LevelAtkDefSame,
    LevelLowPv,
    LevelHighPv,
    LevelCreateExtra,
    LevelIsExtra,
    LevelHighBeauty,
    StoneMaleOnly,
    StoneFemaleOnly,
    LevelItemDay,
    LevelItemNight,
    LevelWithMove,
    LevelWithOther,
    LevelMaleOnly,
    LevelFemaleOnly,
    LevelElectrifiedArea,
    LevelMossRock,
    LevelIcyRock,
    FairyAffection,
    LevelWithDark,
    LevelUpsideDown,
    LevelRain,
    LevelDay,
    LevelNight,
    LevelFemaleEspurr,
    LevelGame,
    LevelDayGame,
    LevelNightGame,
    LevelSnowy,
    LevelDusk,
    LevelNightUltra,
    StoneUltra,
}

/// What an evolution's `extra_info` field holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Level,
    Item,
    Move,
    Species,
    None,
}

impl EvolutionType {
    pub const ALL: [EvolutionType; 41] = [
        EvolutionType::Level,
        EvolutionType::Stone,
        EvolutionType::Trade,
        EvolutionType::TradeItem,
        EvolutionType::TradeSpecial,
        EvolutionType::Happiness,
        EvolutionType::HappinessDay,
        EvolutionType::HappinessNight,
        EvolutionType::LevelAttackHigher,
        EvolutionType::LevelDefenseHigher,
        EvolutionType::LevelAtkDefSame,
        EvolutionType::LevelLowPv,
        EvolutionType::LevelHighPv,
        EvolutionType::LevelCreateExtra,
        EvolutionType::LevelIsExtra,
        EvolutionType::LevelHighBeauty,
        EvolutionType::StoneMaleOnly,
        EvolutionType::StoneFemaleOnly,
        EvolutionType::LevelItemDay,
        EvolutionType::LevelItemNight,
        EvolutionType::LevelWithMove,
        EvolutionType::LevelWithOther,
        EvolutionType::LevelMaleOnly,
        EvolutionType::LevelFemaleOnly,
        EvolutionType::LevelElectrifiedArea,
        EvolutionType::LevelMossRock,
        EvolutionType::LevelIcyRock,
        EvolutionType::FairyAffection,
        EvolutionType::LevelWithDark,
        EvolutionType::LevelUpsideDown,
        EvolutionType::LevelRain,
        EvolutionType::LevelDay,
        EvolutionType::LevelNight,
        EvolutionType::LevelFemaleEspurr,
        EvolutionType::LevelGame,
        EvolutionType::LevelDayGame,
        EvolutionType::LevelNightGame,
        EvolutionType::LevelSnowy,
        EvolutionType::LevelDusk,
        EvolutionType::LevelNightUltra,
        EvolutionType::StoneUltra,
    ];

    /// Default method code in each generation, `None` where the method does
    /// not exist.
    pub fn code(self, gen: Generation) -> Option<u16> {
        let code = default_codes(self)[gen.index()];
        if code == 0 {
            None
        } else {
            Some(code)
        }
    }

    pub fn exists_in(self, gen: Generation) -> bool {
        self.code(gen).is_some()
    }

    pub fn param_kind(self) -> ParamKind {
        use EvolutionType::*;
        match self {
            Stone | TradeItem | StoneMaleOnly | StoneFemaleOnly | LevelItemDay
            | LevelItemNight | StoneUltra => ParamKind::Item,
            LevelWithMove | FairyAffection => ParamKind::Move,
            LevelWithOther | TradeSpecial => ParamKind::Species,
            _ if self.uses_level() => ParamKind::Level,
            _ => ParamKind::None,
        }
    }

    pub fn uses_level(self) -> bool {
        use EvolutionType::*;
        matches!(
            self,
            Level
                | LevelAttackHigher
                | LevelDefenseHigher
                | LevelAtkDefSame
                | LevelLowPv
                | LevelHighPv
                | LevelCreateExtra
                | LevelIsExtra
                | LevelMaleOnly
                | LevelFemaleOnly
                | LevelWithDark
                | LevelUpsideDown
                | LevelRain
                | LevelDay
                | LevelNight
                | LevelFemaleEspurr
                | LevelGame
                | LevelDayGame
                | LevelNightGame
                | LevelSnowy
                | LevelDusk
                | LevelNightUltra
        )
    }

    pub fn is_happiness(self) -> bool {
        matches!(
            self,
            EvolutionType::Happiness | EvolutionType::HappinessDay | EvolutionType::HappinessNight
        )
    }

    pub fn is_trade(self) -> bool {
        matches!(
            self,
            EvolutionType::Trade | EvolutionType::TradeItem | EvolutionType::TradeSpecial
        )
    }

    /// Level variants whose outcome the player cannot steer (personality
    /// value based splits).
    pub fn is_uncontrolled_level(self) -> bool {
        matches!(self, EvolutionType::LevelLowPv | EvolutionType::LevelHighPv)
    }

    /// Methods whose parameter or side effects are tied to specific data and
    /// that are therefore never assigned by method randomization.
    pub fn is_banned(self) -> bool {
        use EvolutionType::*;
        matches!(
            self,
            LevelCreateExtra
                | LevelIsExtra
                | LevelWithOther
                | TradeSpecial
                | LevelWithMove
                | FairyAffection
                | LevelGame
                | LevelDayGame
                | LevelNightGame
        )
    }

    pub fn uses_nonstandard_layout(self) -> bool {
        matches!(self.param_kind(), ParamKind::Move | ParamKind::Species)
            || matches!(
                self,
                EvolutionType::LevelCreateExtra | EvolutionType::LevelIsExtra
            )
    }
}

fn default_codes(method: EvolutionType) -> [u16; 7] {
    use EvolutionType::*;
    match method {
        Level => [1, 1, 4, 4, 4, 4, 4],
        Stone => [2, 2, 7, 7, 8, 8, 8],
        Trade => [3, 3, 5, 5, 5, 5, 5],
        TradeItem => [0, 0, 6, 6, 6, 6, 6],
        TradeSpecial => [0, 0, 0, 0, 7, 7, 7],
        Happiness => [0, 4, 1, 1, 1, 1, 1],
        HappinessDay => [0, 0, 2, 2, 2, 2, 2],
        HappinessNight => [0, 0, 3, 3, 3, 3, 3],
        LevelAttackHigher => [0, 5, 8, 8, 9, 9, 9],
        LevelAtkDefSame => [0, 0, 9, 9, 10, 10, 10],
        LevelDefenseHigher => [0, 0, 10, 10, 11, 11, 11],
        LevelLowPv => [0, 0, 11, 11, 12, 12, 12],
        LevelHighPv => [0, 0, 12, 12, 13, 13, 13],
        LevelCreateExtra => [0, 0, 13, 13, 14, 14, 14],
        LevelIsExtra => [0, 0, 14, 14, 15, 15, 15],
        LevelHighBeauty => [0, 0, 15, 15, 16, 16, 16],
        StoneMaleOnly => [0, 0, 0, 16, 17, 17, 17],
        StoneFemaleOnly => [0, 0, 0, 17, 18, 18, 18],
        LevelItemDay => [0, 0, 0, 18, 19, 19, 19],
        LevelItemNight => [0, 0, 0, 19, 20, 20, 20],
        LevelWithMove => [0, 0, 0, 20, 21, 21, 21],
        LevelWithOther => [0, 0, 0, 21, 22, 22, 22],
        LevelMaleOnly => [0, 0, 0, 22, 23, 23, 23],
        LevelFemaleOnly => [0, 0, 0, 23, 24, 24, 24],
        LevelElectrifiedArea => [0, 0, 0, 24, 25, 25, 25],
        LevelMossRock => [0, 0, 0, 25, 26, 26, 26],
        LevelIcyRock => [0, 0, 0, 26, 27, 27, 27],
        FairyAffection => [0, 0, 0, 0, 0, 28, 28],
        LevelWithDark => [0, 0, 0, 0, 0, 29, 29],
        LevelUpsideDown => [0, 0, 0, 0, 0, 30, 30],
        LevelRain => [0, 0, 0, 0, 0, 31, 31],
        LevelDay => [0, 0, 0, 0, 0, 32, 32],
        LevelNight => [0, 0, 0, 0, 0, 33, 33],
        LevelFemaleEspurr => [0, 0, 0, 0, 0, 34, 34],
        LevelGame => [0, 0, 0, 0, 0, 0, 35],
        LevelDayGame => [0, 0, 0, 0, 0, 0, 36],
        LevelNightGame => [0, 0, 0, 0, 0, 0, 37],
        LevelSnowy => [0, 0, 0, 0, 0, 0, 38],
        LevelDusk => [0, 0, 0, 0, 0, 0, 39],
        LevelNightUltra => [0, 0, 0, 0, 0, 0, 40],
        StoneUltra => [0, 0, 0, 0, 0, 0, 41],
    }
}

/// Code <-> method lookup for one generation.
///
/// Starts from the built-in table; loaders for unusual data may `register`
/// extra codes once before randomization begins.
#[derive(Clone, Debug)]
pub struct EvolutionMethods {
    generation: Generation,
    by_code: BTreeMap<u16, EvolutionType>,
    by_method: BTreeMap<EvolutionType, u16>,
}

impl EvolutionMethods {
    pub fn for_generation(gen: Generation) -> Self {
        let mut methods = Self {
            generation: gen,
            by_code: BTreeMap::new(),
            by_method: BTreeMap::new(),
        };
        for method in EvolutionType::ALL {
            if let Some(code) = method.code(gen) {
                methods.register(method, code);
            }
        }
        methods
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn register(&mut self, method: EvolutionType, code: u16) {
        if let Some(old) = self.by_method.insert(method, code) {
            self.by_code.remove(&old);
        }
        if let Some(previous) = self.by_code.insert(code, method) {
            if previous != method {
                self.by_method.remove(&previous);
            }
        }
    }

    pub fn method_for(&self, code: u16) -> Option<EvolutionType> {
        self.by_code.get(&code).copied()
    }

    pub fn code_for(&self, method: EvolutionType) -> Option<u16> {
        self.by_method.get(&method).copied()
    }

    /// Methods that method randomization may hand out in this generation.
    pub fn assignable(&self) -> Vec<EvolutionType> {
        self.by_method
            .keys()
            .copied()
            .filter(|method| !method.is_banned())
            .collect()
    }
}

/// Which type slots an evolution changed relative to its pre-evolution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeChange {
    #[default]
    None,
    Primary,
    Secondary,
    Both,
}

impl TypeChange {
    pub fn between(from: (Type, Option<Type>), to: (Type, Option<Type>)) -> Self {
        match (from.0 != to.0, from.1 != to.1) {
            (false, false) => TypeChange::None,
            (true, false) => TypeChange::Primary,
            (false, true) => TypeChange::Secondary,
            (true, true) => TypeChange::Both,
        }
    }
}

/// A directed evolution edge. A copy lives on both endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    pub from: SpeciesId,
    pub to: SpeciesId,
    pub method: EvolutionType,
    #[serde(default)]
    pub extra_info: u16,
    #[serde(default = "default_carry_stats")]
    pub carry_stats: bool,
    #[serde(default)]
    pub types_differ: TypeChange,
}

fn default_carry_stats() -> bool {
    true
}

impl Evolution {
    pub fn new(from: SpeciesId, to: SpeciesId, method: EvolutionType, extra_info: u16) -> Self {
        Self {
            from,
            to,
            method,
            extra_info,
            carry_stats: true,
            types_differ: TypeChange::None,
        }
    }

    pub fn level(&self) -> Option<u16> {
        if self.method.uses_level() {
            Some(self.extra_info)
        } else {
            None
        }
    }

    pub fn connects(&self, from: SpeciesId, to: SpeciesId) -> bool {
        self.from == from && self.to == to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_differ_between_generations() {
        assert_eq!(EvolutionType::Stone.code(Generation::Gen3), Some(7));
        assert_eq!(EvolutionType::Stone.code(Generation::Gen5), Some(8));
        assert_eq!(EvolutionType::TradeSpecial.code(Generation::Gen4), None);
        assert!(!EvolutionType::HappinessDay.exists_in(Generation::Gen1));
    }

    #[test]
    fn reverse_lookup_matches_forward_lookup() {
        for gen in Generation::ALL {
            let methods = EvolutionMethods::for_generation(gen);
            for method in EvolutionType::ALL {
                if let Some(code) = method.code(gen) {
                    assert_eq!(methods.method_for(code), Some(method), "{gen} {method:?}");
                    assert_eq!(methods.code_for(method), Some(code));
                }
            }
        }
    }

    #[test]
    fn register_replaces_previous_mapping() {
        let mut methods = EvolutionMethods::for_generation(Generation::Gen3);
        methods.register(EvolutionType::LevelDusk, 40);
        assert_eq!(methods.method_for(40), Some(EvolutionType::LevelDusk));
        methods.register(EvolutionType::LevelDusk, 41);
        assert_eq!(methods.method_for(40), None);
        assert_eq!(methods.code_for(EvolutionType::LevelDusk), Some(41));
    }

    #[test]
    fn groups_are_generation_independent() {
        assert!(EvolutionType::LevelLowPv.uses_level());
        assert!(EvolutionType::LevelLowPv.is_uncontrolled_level());
        assert!(EvolutionType::HappinessNight.is_happiness());
        assert!(EvolutionType::LevelCreateExtra.is_banned());
        assert!(EvolutionType::LevelWithOther.uses_nonstandard_layout());
        assert_eq!(EvolutionType::Stone.param_kind(), ParamKind::Item);
        assert_eq!(EvolutionType::Trade.param_kind(), ParamKind::None);
        let assignable = EvolutionMethods::for_generation(Generation::Gen1).assignable();
        assert_eq!(
            assignable,
            vec![
                EvolutionType::Level,
                EvolutionType::Stone,
                EvolutionType::Trade
            ]
        );
    }
}
