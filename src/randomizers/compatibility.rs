use std::collections::BTreeMap;

use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::Result;
use crate::model::{Dex, Move, SpeciesId, Type};
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{CompatibilityMode, Settings};

const SAME_TYPE_CHANCE: f64 = 0.9;
const NORMAL_TYPE_CHANCE: f64 = 0.5;
const OTHER_TYPE_CHANCE: f64 = 0.25;
const UNIFORM_CHANCE: f64 = 0.5;

/// Re-rolls which species can be taught each TM and tutor move.
pub struct CompatibilityRandomizer;

impl CompatibilityRandomizer {
    pub fn new() -> Self {
        Self
    }

    /// Builds a fresh compatibility matrix for `taught` (one flag per move
    /// per species).
    pub fn matrix<R: Rng + ?Sized>(
        dex: &Dex,
        moves: &[Move],
        taught: &[u16],
        mode: CompatibilityMode,
        rng: &mut R,
    ) -> BTreeMap<SpeciesId, Vec<bool>> {
        let taught_types: Vec<Option<Type>> = taught
            .iter()
            .map(|id| moves.iter().find(|m| m.id == *id).map(|m| m.move_type))
            .collect();
        dex.iter()
            .map(|species| {
                let flags = taught_types
                    .iter()
                    .map(|move_type| {
                        let chance = match (mode, move_type) {
                            (CompatibilityMode::PreferSameType, Some(ty)) if species.has_type(*ty) => {
                                SAME_TYPE_CHANCE
                            }
                            (CompatibilityMode::PreferSameType, Some(Type::Normal)) => {
                                NORMAL_TYPE_CHANCE
                            }
                            (CompatibilityMode::PreferSameType, _) => OTHER_TYPE_CHANCE,
                            _ => UNIFORM_CHANCE,
                        };
                        rng.gen_bool(chance)
                    })
                    .collect();
                (species.id, flags)
            })
            .collect()
    }
}

impl Default for CompatibilityRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer for CompatibilityRandomizer {
    fn name(&self) -> &str {
        "compatibility"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.compatibility.tm != CompatibilityMode::Unchanged
            || settings.compatibility.tutor != CompatibilityMode::Unchanged
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let settings = &ctx.settings.compatibility;
        if settings.tm != CompatibilityMode::Unchanged {
            session.tm_compatibility = Self::matrix(
                &session.dex,
                &session.moves,
                &session.tm_moves,
                settings.tm,
                rng,
            );
        }
        if settings.tutor != CompatibilityMode::Unchanged && session.capabilities.move_tutors {
            session.tutor_compatibility = Self::matrix(
                &session.dex,
                &session.moves,
                &session.tutor_moves,
                settings.tutor,
                rng,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn every_species_gets_one_flag_per_move() {
        let session = testing::session();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let matrix = CompatibilityRandomizer::matrix(
            &session.dex,
            &session.moves,
            &session.tm_moves,
            CompatibilityMode::Random,
            &mut rng,
        );
        assert_eq!(matrix.len(), session.dex.len());
        assert!(matrix.values().all(|flags| flags.len() == session.tm_moves.len()));
    }

    #[test]
    fn same_type_moves_are_favoured() {
        let session = testing::session();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        // Move 1 is Water, move 2 is Fire.
        let taught = vec![1, 2];
        let mut water_hits = 0;
        let mut fire_hits = 0;
        for _ in 0..400 {
            let matrix = CompatibilityRandomizer::matrix(
                &session.dex,
                &session.moves,
                &taught,
                CompatibilityMode::PreferSameType,
                &mut rng,
            );
            let flags = &matrix[&SpeciesId(4)];
            water_hits += flags[0] as u32;
            fire_hits += flags[1] as u32;
        }
        assert!(water_hits > 320, "water {water_hits}");
        assert!(fire_hits < 140, "fire {fire_hits}");
    }
}
